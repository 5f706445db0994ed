//! Descriptor types for protobuf `FileDescriptorProto`.
//!
//! These types mirror google/protobuf/descriptor.proto and are decoded and
//! encoded with this crate's own runtime. Fields are declared in field-number
//! order, which is the order canonical encoders write them in, so re-encoding
//! a decoded descriptor reproduces the original bytes. Anything newer than
//! the fields listed here is carried through as unknown data.

use bytes::BufMut;

use super::options::{
    EnumOptions, EnumValueOptions, ExtensionRangeOptions, FieldOptions, FileOptions,
    MessageOptions, MethodOptions, OneofOptions, ServiceOptions, SourceCodeInfo,
};
use super::{Label, Type};
use crate::codec::{
    encode_optional, encode_optional_message, encode_repeated, encode_repeated_message,
    merge_optional, merge_repeated, optional_len, optional_message_len, repeated_len,
    repeated_message_len,
};
use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::message::{Message, MessageBuilder};
use crate::schema::{FieldInfo, MessageSchema};
use crate::unknown::UnknownFieldSet;
use crate::wire::WireType;

macro_rules! field_ty {
    (string) => { Option<String> };
    (int32) => { Option<i32> };
    (bool) => { Option<bool> };
    (repeated_string) => { Vec<String> };
    (repeated_int32) => { Vec<i32> };
    (message $m:ty) => { Option<$m> };
    (repeated_message $m:ty) => { Vec<$m> };
}

macro_rules! field_info {
    ($number:literal, $name:expr, string) => { FieldInfo::optional($number, $name, WireType::Len) };
    ($number:literal, $name:expr, int32) => { FieldInfo::optional($number, $name, WireType::Varint) };
    ($number:literal, $name:expr, bool) => { FieldInfo::optional($number, $name, WireType::Varint) };
    ($number:literal, $name:expr, repeated_string) => { FieldInfo::repeated($number, $name, WireType::Len) };
    ($number:literal, $name:expr, repeated_int32) => { FieldInfo::repeated($number, $name, WireType::Varint) };
    ($number:literal, $name:expr, message $m:ty) => { FieldInfo::optional($number, $name, WireType::Len) };
    ($number:literal, $name:expr, repeated_message $m:ty) => { FieldInfo::repeated($number, $name, WireType::Len) };
}

macro_rules! field_encode {
    ($number:literal, $value:expr, $buf:ident, repeated_string) => {
        encode_repeated($number, $value, false, $buf)
    };
    ($number:literal, $value:expr, $buf:ident, repeated_int32) => {
        encode_repeated($number, $value, false, $buf)
    };
    ($number:literal, $value:expr, $buf:ident, message $m:ty) => {
        encode_optional_message($number, $value, $buf)
    };
    ($number:literal, $value:expr, $buf:ident, repeated_message $m:ty) => {
        encode_repeated_message($number, $value, $buf)
    };
    ($number:literal, $value:expr, $buf:ident, $scalar:ident) => {
        encode_optional($number, $value, $buf)
    };
}

macro_rules! field_len {
    ($number:literal, $value:expr, repeated_string) => { repeated_len($number, $value, false) };
    ($number:literal, $value:expr, repeated_int32) => { repeated_len($number, $value, false) };
    ($number:literal, $value:expr, message $m:ty) => { optional_message_len($number, $value) };
    ($number:literal, $value:expr, repeated_message $m:ty) => { repeated_message_len($number, $value) };
    ($number:literal, $value:expr, $scalar:ident) => { optional_len($number, $value) };
}

macro_rules! field_merge {
    ($dst:expr, $wire_type:ident, $buf:ident, $decoder:ident, repeated_string) => {
        merge_repeated($dst, $wire_type, $buf)
    };
    ($dst:expr, $wire_type:ident, $buf:ident, $decoder:ident, repeated_int32) => {
        merge_repeated($dst, $wire_type, $buf)
    };
    ($dst:expr, $wire_type:ident, $buf:ident, $decoder:ident, message $m:ty) => {
        $decoder.merge_message($dst, $buf)
    };
    ($dst:expr, $wire_type:ident, $buf:ident, $decoder:ident, repeated_message $m:ty) => {
        $decoder.merge_repeated_message($dst, $buf)
    };
    ($dst:expr, $wire_type:ident, $buf:ident, $decoder:ident, $scalar:ident) => {
        merge_optional($dst, $buf)
    };
}

macro_rules! proto_name {
    ($field:ident) => { stringify!($field) };
    ($field:ident $name:literal) => { $name };
}

/// Declares a descriptor message: its struct, schema, and codec impls.
macro_rules! descriptor_message {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($full_name:literal) {
            $(
                $(#[$fmeta:meta])*
                $field:ident $(as $pname:literal)?: $kind:ident $(($inner:ty))? = $number:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: field_ty!($kind $($inner)?),
            )*
            pub unknown_fields: UnknownFieldSet,
        }

        impl $name {
            const FIELDS: &'static [FieldInfo] = &[
                $( field_info!($number, proto_name!($field $($pname)?), $kind $($inner)?), )*
            ];
        }

        impl Message for $name {
            type Builder = Self;

            fn schema() -> &'static MessageSchema {
                static SCHEMA: MessageSchema = MessageSchema::new($full_name, $name::FIELDS, &[]);
                &SCHEMA
            }

            fn encode_fields<B: BufMut>(&self, buf: &mut B) {
                $( field_encode!($number, &self.$field, buf, $kind $($inner)?); )*
            }

            fn encoded_fields_len(&self) -> usize {
                0 $( + field_len!($number, &self.$field, $kind $($inner)?) )*
            }

            fn unknown_fields(&self) -> &UnknownFieldSet {
                &self.unknown_fields
            }

            fn into_builder(self) -> Self {
                self
            }
        }

        impl MessageBuilder for $name {
            type Message = Self;

            #[allow(unused_variables)]
            fn merge_field(
                &mut self,
                number: u32,
                wire_type: WireType,
                buf: &mut &[u8],
                decoder: &mut Decoder,
            ) -> Result<(), DecodeError> {
                match number {
                    $( $number => field_merge!(&mut self.$field, wire_type, buf, decoder, $kind $($inner)?), )*
                    _ => Err(DecodeError::unhandled_field($full_name, number)),
                }
            }

            fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet {
                &mut self.unknown_fields
            }

            fn build(self) -> Result<Self, DecodeError> {
                Ok(self)
            }
        }
    };
}

descriptor_message! {
    /// A collection of file descriptors.
    pub struct FileDescriptorSet("google.protobuf.FileDescriptorSet") {
        file: repeated_message(FileDescriptorProto) = 1,
    }
}

descriptor_message! {
    /// Describes a complete .proto file.
    pub struct FileDescriptorProto("google.protobuf.FileDescriptorProto") {
        /// The file name, relative to root of source tree.
        name: string = 1,
        package: string = 2,
        /// Names of files imported by this file.
        dependency: repeated_string = 3,
        message_type: repeated_message(DescriptorProto) = 4,
        enum_type: repeated_message(EnumDescriptorProto) = 5,
        service: repeated_message(ServiceDescriptorProto) = 6,
        extension: repeated_message(FieldDescriptorProto) = 7,
        options: message(FileOptions) = 8,
        source_code_info: message(SourceCodeInfo) = 9,
        /// Indexes of the public imported files in the dependency list.
        public_dependency: repeated_int32 = 10,
        /// Indexes of the weak imported files in the dependency list.
        weak_dependency: repeated_int32 = 11,
        /// The syntax of the proto file, "proto2", "proto3" or "editions".
        syntax: string = 12,
        edition: int32 = 14,
    }
}

descriptor_message! {
    /// Describes a message type.
    pub struct DescriptorProto("google.protobuf.DescriptorProto") {
        name: string = 1,
        field: repeated_message(FieldDescriptorProto) = 2,
        nested_type: repeated_message(DescriptorProto) = 3,
        enum_type: repeated_message(EnumDescriptorProto) = 4,
        extension_range: repeated_message(ExtensionRange) = 5,
        extension: repeated_message(FieldDescriptorProto) = 6,
        options: message(MessageOptions) = 7,
        oneof_decl: repeated_message(OneofDescriptorProto) = 8,
        reserved_range: repeated_message(ReservedRange) = 9,
        reserved_name: repeated_string = 10,
    }
}

descriptor_message! {
    /// A range of field numbers open to extensions, `end` is exclusive.
    pub struct ExtensionRange("google.protobuf.DescriptorProto.ExtensionRange") {
        start: int32 = 1,
        end: int32 = 2,
        options: message(ExtensionRangeOptions) = 3,
    }
}

descriptor_message! {
    /// A range of reserved field numbers, `end` is exclusive.
    pub struct ReservedRange("google.protobuf.DescriptorProto.ReservedRange") {
        start: int32 = 1,
        end: int32 = 2,
    }
}

descriptor_message! {
    /// Describes a field within a message.
    pub struct FieldDescriptorProto("google.protobuf.FieldDescriptorProto") {
        name: string = 1,
        /// For extensions, the type being extended.
        extendee: string = 2,
        number: int32 = 3,
        label: int32 = 4,
        r#type as "type": int32 = 5,
        /// For message and enum types, the fully-qualified type name.
        type_name: string = 6,
        default_value: string = 7,
        options: message(FieldOptions) = 8,
        /// If set, this field is part of the oneof at this index.
        oneof_index: int32 = 9,
        json_name: string = 10,
        proto3_optional: bool = 17,
    }
}

impl FieldDescriptorProto {
    /// The field label, `Optional` when unset.
    pub fn label(&self) -> Label {
        self.label.and_then(Label::from_i32).unwrap_or(Label::Optional)
    }

    /// The field type, `None` when unset or unrecognized.
    pub fn field_type(&self) -> Option<Type> {
        self.r#type.and_then(Type::from_i32)
    }
}

descriptor_message! {
    /// Describes a oneof.
    pub struct OneofDescriptorProto("google.protobuf.OneofDescriptorProto") {
        name: string = 1,
        options: message(OneofOptions) = 2,
    }
}

descriptor_message! {
    /// Describes an enum type.
    pub struct EnumDescriptorProto("google.protobuf.EnumDescriptorProto") {
        name: string = 1,
        value: repeated_message(EnumValueDescriptorProto) = 2,
        options: message(EnumOptions) = 3,
        reserved_range: repeated_message(EnumReservedRange) = 4,
        reserved_name: repeated_string = 5,
    }
}

descriptor_message! {
    /// A range of reserved enum numbers, `end` is inclusive.
    pub struct EnumReservedRange("google.protobuf.EnumDescriptorProto.EnumReservedRange") {
        start: int32 = 1,
        end: int32 = 2,
    }
}

descriptor_message! {
    /// Describes a value within an enum.
    pub struct EnumValueDescriptorProto("google.protobuf.EnumValueDescriptorProto") {
        name: string = 1,
        number: int32 = 2,
        options: message(EnumValueOptions) = 3,
    }
}

descriptor_message! {
    /// Describes a service.
    pub struct ServiceDescriptorProto("google.protobuf.ServiceDescriptorProto") {
        name: string = 1,
        method: repeated_message(MethodDescriptorProto) = 2,
        options: message(ServiceOptions) = 3,
    }
}

descriptor_message! {
    /// Describes a method of a service.
    pub struct MethodDescriptorProto("google.protobuf.MethodDescriptorProto") {
        name: string = 1,
        /// Fully-qualified input type name.
        input_type: string = 2,
        /// Fully-qualified output type name.
        output_type: string = 3,
        options: message(MethodOptions) = 4,
        client_streaming: bool = 5,
        server_streaming: bool = 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_in_number_order() {
        for schema in [
            FileDescriptorProto::schema(),
            DescriptorProto::schema(),
            FieldDescriptorProto::schema(),
            EnumDescriptorProto::schema(),
            MethodDescriptorProto::schema(),
        ] {
            let numbers: Vec<u32> = schema.fields.iter().map(|f| f.number).collect();
            let mut sorted = numbers.clone();
            sorted.sort_unstable();
            assert_eq!(numbers, sorted, "{}", schema.full_name);
        }
    }

    #[test]
    fn test_type_field_name() {
        let schema = FieldDescriptorProto::schema();
        assert_eq!(schema.field(5).map(|f| f.name), Some("type"));
        assert_eq!(schema.field(17).map(|f| f.name), Some("proto3_optional"));
    }

    #[test]
    fn test_roundtrip_with_defaults_present() {
        let field = FieldDescriptorProto {
            name: Some(String::new()),
            number: Some(0),
            label: Some(Label::Repeated as i32),
            r#type: Some(Type::Int32 as i32),
            proto3_optional: Some(false),
            ..Default::default()
        };
        let bytes = field.encode_to_vec();
        // Explicit presence keeps empty and zero values on the wire.
        assert_eq!(bytes, [0x0a, 0x00, 0x18, 0x00, 0x20, 0x03, 0x28, 0x05, 0x88, 0x01, 0x00]);

        let decoded = FieldDescriptorProto::decode(&bytes).unwrap();
        assert_eq!(decoded, field);
        assert_eq!(decoded.label(), Label::Repeated);
        assert_eq!(decoded.field_type(), Some(Type::Int32));
    }

    #[test]
    fn test_public_dependency_is_unpacked() {
        let file = FileDescriptorProto {
            public_dependency: vec![0, 1],
            ..Default::default()
        };
        assert_eq!(file.encode_to_vec(), [0x50, 0x00, 0x50, 0x01]);
    }

    #[test]
    fn test_unknown_fields_survive() {
        // name = "m", then field 11 (visibility in newer descriptor.proto) = 1.
        let bytes = [0x0a, 0x01, b'm', 0x58, 0x01];
        let message = DescriptorProto::decode(&bytes).unwrap();
        assert_eq!(message.name.as_deref(), Some("m"));
        assert_eq!(message.unknown_fields.last_varint(11), Some(1));
        assert_eq!(message.encode_to_vec(), bytes);
    }
}
