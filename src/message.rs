//! The [`Message`] and [`MessageBuilder`] traits implemented by every message
//! type, generated or hand-written.
//!
//! A message is immutable once built. Decoding fills a [`MessageBuilder`]
//! field by field and only produces the message after every non-null
//! constraint has been checked.

use bytes::BufMut;

use crate::decoder::{DecodeOptions, Decoder};
use crate::error::DecodeError;
use crate::schema::MessageSchema;
use crate::unknown::UnknownFieldSet;
use crate::wire::WireType;

pub trait Message: Sized {
    /// Mutable construction state. Messages whose construction cannot fail
    /// use `Self`.
    type Builder: MessageBuilder<Message = Self>;

    /// Static field layout for this message type.
    fn schema() -> &'static MessageSchema;

    /// Writes every present known field, in declaration order.
    fn encode_fields<B: BufMut>(&self, buf: &mut B);

    /// Encoded length of [`Message::encode_fields`].
    fn encoded_fields_len(&self) -> usize;

    fn unknown_fields(&self) -> &UnknownFieldSet;

    /// Turns the message back into construction state, used to merge more
    /// input into an existing value.
    fn into_builder(self) -> Self::Builder;

    /// Total encoded length: known fields plus preserved unknown bytes.
    #[inline]
    fn encoded_len(&self) -> usize {
        self.encoded_fields_len() + self.unknown_fields().encoded_len()
    }

    /// Writes known fields followed by unknown fields.
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.encode_fields(buf);
        self.unknown_fields().write_all(buf);
    }

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf
    }

    /// Decodes a message from `buf` with default [`DecodeOptions`].
    fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        Decoder::default().decode(buf)
    }

    fn decode_with(buf: &[u8], options: &DecodeOptions) -> Result<Self, DecodeError> {
        Decoder::new(options.clone()).decode(buf)
    }

    /// Merges the fields encoded in `buf` into this message.
    ///
    /// Scalars are overwritten, repeated fields appended, and embedded
    /// messages merged recursively.
    fn merge_from(self, buf: &[u8]) -> Result<Self, DecodeError> {
        Decoder::default().merge::<Self>(self.into_builder(), buf)
    }
}

pub trait MessageBuilder: Default {
    type Message: Message;

    /// Decodes one occurrence of field `number`.
    ///
    /// Only called for numbers the schema declares and wire types it accepts.
    /// `buf` is positioned right after the field key.
    fn merge_field(
        &mut self,
        number: u32,
        wire_type: WireType,
        buf: &mut &[u8],
        decoder: &mut Decoder,
    ) -> Result<(), DecodeError>;

    /// Whether field `number` currently holds a value.
    ///
    /// Consulted for fields and oneofs declared non-null. The default reports
    /// every field as absent, so a builder that declares non-null fields must
    /// implement it.
    fn has_field(&self, number: u32) -> bool {
        let _ = number;
        false
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet;

    fn build(self) -> Result<Self::Message, DecodeError>;
}

/// Unwraps a non-null field while building a message.
pub fn require_field<T>(
    value: Option<T>,
    schema: &MessageSchema,
    field: &'static str,
) -> Result<T, DecodeError> {
    value.ok_or_else(|| DecodeError::null_field(schema.full_name, field))
}

/// Unwraps a non-null oneof while building a message.
pub fn require_oneof<T>(
    value: Option<T>,
    schema: &MessageSchema,
    oneof: &'static str,
) -> Result<T, DecodeError> {
    value.ok_or_else(|| DecodeError::null_oneof(schema.full_name, oneof))
}
