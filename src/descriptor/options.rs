//! Option messages from descriptor.proto.
//!
//! Options are kept opaque: every member, including extensions such as the
//! non-null markers, is stored as unknown-field data and re-encoded verbatim.
//! Typed accessors read the handful of members the runtime cares about.

use bytes::BufMut;

use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::message::{Message, MessageBuilder};
use crate::schema::MessageSchema;
use crate::unknown::UnknownFieldSet;
use crate::wire::WireType;

/// Extension number of `(protokt.property)` on `FieldOptions` and of
/// `(protokt.oneof)` on `OneofOptions`.
pub const PROTOKT_EXTENSION_NUMBER: u32 = 1253;
/// Field number of `non_null` inside both extension messages.
pub const NON_NULL_FIELD_NUMBER: u32 = 1;

macro_rules! opaque_message {
    ($(#[$meta:meta])* $name:ident, $full_name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            pub unknown_fields: UnknownFieldSet,
        }

        impl Message for $name {
            type Builder = Self;

            fn schema() -> &'static MessageSchema {
                static SCHEMA: MessageSchema = MessageSchema::new($full_name, &[], &[]);
                &SCHEMA
            }

            fn encode_fields<B: BufMut>(&self, _buf: &mut B) {}

            fn encoded_fields_len(&self) -> usize {
                0
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

            fn merge_field(
                &mut self,
                number: u32,
                _wire_type: WireType,
                _buf: &mut &[u8],
                _decoder: &mut Decoder,
            ) -> Result<(), DecodeError> {
                Err(DecodeError::unhandled_field($full_name, number))
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

opaque_message!(FileOptions, "google.protobuf.FileOptions");
opaque_message!(MessageOptions, "google.protobuf.MessageOptions");
opaque_message!(FieldOptions, "google.protobuf.FieldOptions");
opaque_message!(OneofOptions, "google.protobuf.OneofOptions");
opaque_message!(EnumOptions, "google.protobuf.EnumOptions");
opaque_message!(EnumValueOptions, "google.protobuf.EnumValueOptions");
opaque_message!(ServiceOptions, "google.protobuf.ServiceOptions");
opaque_message!(MethodOptions, "google.protobuf.MethodOptions");
opaque_message!(ExtensionRangeOptions, "google.protobuf.ExtensionRangeOptions");
opaque_message!(
    /// Source locations and comments, carried through untouched.
    SourceCodeInfo,
    "google.protobuf.SourceCodeInfo"
);
opaque_message!(
    /// Body of the `(protokt.property)` and `(protokt.oneof)` extensions.
    ProtoktOptions,
    "protokt.ProtoktOptions"
);

fn bool_option(fields: &UnknownFieldSet, number: u32) -> Option<bool> {
    fields.last_varint(number).map(|v| v != 0)
}

/// Reads `non_null` out of every occurrence of the protokt extension.
///
/// Repeated occurrences of a message-typed extension merge, so the last
/// `non_null` seen wins.
fn non_null_extension(fields: &UnknownFieldSet) -> bool {
    let Some(extension) = fields.get(PROTOKT_EXTENSION_NUMBER) else {
        return false;
    };
    extension
        .values()
        .iter()
        .filter_map(|value| value.as_len_delimited())
        .filter_map(|payload| ProtoktOptions::decode(payload).ok())
        .filter_map(|options| bool_option(&options.unknown_fields, NON_NULL_FIELD_NUMBER))
        .last()
        .unwrap_or(false)
}

impl FileOptions {
    pub fn deprecated(&self) -> bool {
        bool_option(&self.unknown_fields, 23).unwrap_or(false)
    }
}

impl MessageOptions {
    pub fn deprecated(&self) -> bool {
        bool_option(&self.unknown_fields, 3).unwrap_or(false)
    }

    /// Whether the message is the synthesized entry type of a map field.
    pub fn map_entry(&self) -> bool {
        bool_option(&self.unknown_fields, 7).unwrap_or(false)
    }
}

impl FieldOptions {
    /// The explicit `packed` option, `None` when not set.
    pub fn packed(&self) -> Option<bool> {
        bool_option(&self.unknown_fields, 2)
    }

    pub fn deprecated(&self) -> bool {
        bool_option(&self.unknown_fields, 3).unwrap_or(false)
    }

    /// Whether the field is declared with `(protokt.property).non_null`.
    pub fn non_null(&self) -> bool {
        non_null_extension(&self.unknown_fields)
    }
}

impl OneofOptions {
    /// Whether the oneof is declared with `(protokt.oneof).non_null`.
    pub fn non_null(&self) -> bool {
        non_null_extension(&self.unknown_fields)
    }
}

impl EnumOptions {
    pub fn allow_alias(&self) -> bool {
        bool_option(&self.unknown_fields, 2).unwrap_or(false)
    }

    pub fn deprecated(&self) -> bool {
        bool_option(&self.unknown_fields, 3).unwrap_or(false)
    }
}

impl EnumValueOptions {
    pub fn deprecated(&self) -> bool {
        bool_option(&self.unknown_fields, 1).unwrap_or(false)
    }
}

impl ServiceOptions {
    pub fn deprecated(&self) -> bool {
        bool_option(&self.unknown_fields, 33).unwrap_or(false)
    }
}

impl MethodOptions {
    pub fn deprecated(&self) -> bool {
        bool_option(&self.unknown_fields, 33).unwrap_or(false)
    }
}
