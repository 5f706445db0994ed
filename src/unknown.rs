//! Storage for fields a message's schema does not recognize.
//!
//! Every record is kept exactly as it appeared on the wire (key bytes and
//! payload) so that re-encoding reproduces it byte for byte.

use std::collections::HashMap;

use bytes::{BufMut, Bytes};
use smallvec::SmallVec;

use crate::leb128::{LebCodec, MAX_VARINT_LEN};
use crate::wire::{split_len_delimited, WireType};

/// One raw record for an unknown field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue {
    wire_type: WireType,
    key_len: u8,
    raw: Bytes,
}

impl UnknownValue {
    /// Wraps a complete record, `raw` must start with a key of `key_len` bytes.
    pub(crate) fn new(wire_type: WireType, key_len: usize, raw: Bytes) -> Self {
        // Keys may be padded past their canonical length, up to a full varint.
        debug_assert!(key_len <= MAX_VARINT_LEN && key_len <= raw.len());
        let key_len = u8::try_from(key_len).unwrap_or(u8::MAX);
        UnknownValue {
            wire_type,
            key_len,
            raw,
        }
    }

    /// Wire type this value was recorded with.
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// The full record: key followed by payload.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The payload with the key stripped.
    ///
    /// For length-delimited values this still includes the length prefix.
    pub fn payload(&self) -> &[u8] {
        &self.raw[usize::from(self.key_len)..]
    }

    /// Interprets the payload as a varint, if it is one.
    pub fn as_varint(&self) -> Option<u64> {
        match self.wire_type {
            WireType::Varint => u64::decode_leb128(self.payload()).ok().map(|(v, _)| v),
            _ => None,
        }
    }

    /// Interprets the payload as length-delimited bytes, if it is.
    pub fn as_len_delimited(&self) -> Option<&[u8]> {
        match self.wire_type {
            WireType::Len => {
                let mut payload = self.payload();
                split_len_delimited(&mut payload).ok()
            }
            _ => None,
        }
    }
}

/// All values seen for a single unknown field number, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField {
    number: u32,
    values: SmallVec<[UnknownValue; 1]>,
}

impl UnknownField {
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn values(&self) -> &[UnknownValue] {
        &self.values
    }
}

/// Unknown fields of a message, grouped by field number.
///
/// Field numbers are kept in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFieldSet {
    fields: Vec<UnknownField>,
    /// Position of each field number in `fields`.
    index: HashMap<u32, usize>,
}

impl UnknownFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw record for `number`.
    pub fn record(&mut self, number: u32, value: UnknownValue) {
        match self.index.get(&number) {
            Some(&pos) => self.fields[pos].values.push(value),
            None => {
                self.index.insert(number, self.fields.len());
                self.fields.push(UnknownField {
                    number,
                    values: smallvec::smallvec![value],
                });
            }
        }
    }

    /// Returns the values stored for `number`.
    pub fn get(&self, number: u32) -> Option<&UnknownField> {
        self.index.get(&number).map(|&pos| &self.fields[pos])
    }

    /// Returns the last varint recorded for `number`.
    ///
    /// Protobuf's last-one-wins rule for singular fields.
    pub fn last_varint(&self, number: u32) -> Option<u64> {
        self.get(number)?
            .values
            .iter()
            .rev()
            .find_map(UnknownValue::as_varint)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnknownField> {
        self.fields.iter()
    }

    /// Number of distinct unknown field numbers.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.index.clear();
    }

    /// Appends every value of `other`, as if its records had been read after ours.
    pub fn merge(&mut self, other: UnknownFieldSet) {
        for field in other.fields {
            for value in field.values {
                self.record(field.number, value);
            }
        }
    }

    /// Total number of bytes [`UnknownFieldSet::write_all`] will produce.
    pub fn encoded_len(&self) -> usize {
        self.fields
            .iter()
            .flat_map(|f| f.values.iter())
            .map(|v| v.raw.len())
            .sum()
    }

    /// Writes every stored record, grouped by field number.
    pub fn write_all<B: BufMut>(&self, buf: &mut B) {
        for value in self.fields.iter().flat_map(|f| f.values.iter()) {
            buf.put_slice(&value.raw);
        }
    }
}
