//! Static field layout tables supplied by message implementations.
//!
//! A [`MessageSchema`] tells the [`Decoder`](crate::decoder::Decoder) which
//! field numbers a message understands, the wire type each expects, and which
//! fields or oneofs must be present once decoding finishes.

use crate::wire::WireType;

/// How many values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Implicit presence, default values are not written.
    Singular,
    /// Explicit presence, written whenever set.
    Optional,
    /// Zero or more values, packed or not. Decoding accepts both layouts,
    /// the encoder call decides which one is written.
    Repeated,
    /// A `map<K, V>`, encoded as repeated key/value entries.
    Map,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub number: u32,
    pub name: &'static str,
    /// Wire type of a single element.
    pub wire_type: WireType,
    pub cardinality: Cardinality,
    /// Index into [`MessageSchema::oneofs`] when this field is a oneof member.
    pub oneof: Option<usize>,
    pub non_null: bool,
}

impl FieldInfo {
    const fn new(
        number: u32,
        name: &'static str,
        wire_type: WireType,
        cardinality: Cardinality,
    ) -> Self {
        FieldInfo {
            number,
            name,
            wire_type,
            cardinality,
            oneof: None,
            non_null: false,
        }
    }

    pub const fn singular(number: u32, name: &'static str, wire_type: WireType) -> Self {
        Self::new(number, name, wire_type, Cardinality::Singular)
    }

    pub const fn optional(number: u32, name: &'static str, wire_type: WireType) -> Self {
        Self::new(number, name, wire_type, Cardinality::Optional)
    }

    pub const fn repeated(number: u32, name: &'static str, wire_type: WireType) -> Self {
        Self::new(number, name, wire_type, Cardinality::Repeated)
    }

    pub const fn map(number: u32, name: &'static str) -> Self {
        Self::new(number, name, WireType::Len, Cardinality::Map)
    }

    pub const fn in_oneof(mut self, index: usize) -> Self {
        self.oneof = Some(index);
        self
    }

    /// Marks the field as declared with `(protokt.property).non_null`.
    pub const fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }

    /// Whether a value arriving with `wire_type` can be decoded into this field.
    ///
    /// Anything else is kept as unknown data rather than rejected.
    pub fn accepts(&self, wire_type: WireType) -> bool {
        if wire_type == self.wire_type {
            return true;
        }
        self.cardinality == Cardinality::Repeated
            && wire_type == WireType::Len
            && self.wire_type != WireType::Len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OneofInfo {
    pub name: &'static str,
    pub non_null: bool,
}

impl OneofInfo {
    pub const fn new(name: &'static str) -> Self {
        OneofInfo {
            name,
            non_null: false,
        }
    }

    /// Marks the oneof as declared with `(protokt.oneof).non_null`.
    pub const fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }
}

/// Field layout of one message type, in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct MessageSchema {
    pub full_name: &'static str,
    pub fields: &'static [FieldInfo],
    pub oneofs: &'static [OneofInfo],
}

impl MessageSchema {
    pub const fn new(
        full_name: &'static str,
        fields: &'static [FieldInfo],
        oneofs: &'static [OneofInfo],
    ) -> Self {
        MessageSchema {
            full_name,
            fields,
            oneofs,
        }
    }

    /// Looks up a field by number.
    #[inline]
    pub fn field(&self, number: u32) -> Option<&'static FieldInfo> {
        self.fields.iter().find(|f| f.number == number)
    }

    /// Looks up a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&'static FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields that belong to the oneof at `index`.
    pub fn oneof_members(&self, index: usize) -> impl Iterator<Item = &'static FieldInfo> {
        self.fields.iter().filter(move |f| f.oneof == Some(index))
    }
}
