//! Message decoding state machine.

use bytes::Bytes;
use tracing::trace;

use crate::error::DecodeError;
use crate::message::{Message, MessageBuilder};
use crate::schema::MessageSchema;
use crate::unknown::UnknownValue;
use crate::wire::{decode_key, skip_field, split_len_delimited};

/// Default maximum nesting depth of embedded messages.
pub const DEFAULT_RECURSION_LIMIT: u32 = 100;

/// Options controlling how messages are decoded.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    recursion_limit: u32,
    discard_unknown_fields: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            discard_unknown_fields: false,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth of embedded messages.
    ///
    /// Defaults to 100.
    pub fn recursion_limit(&mut self, limit: u32) -> &mut Self {
        self.recursion_limit = limit;
        self
    }

    /// Drop unknown fields instead of preserving them for re-encoding.
    ///
    /// Defaults to `false`.
    pub fn discard_unknown_fields(&mut self, discard: bool) -> &mut Self {
        self.discard_unknown_fields = discard;
        self
    }

    pub fn get_recursion_limit(&self) -> u32 {
        self.recursion_limit
    }

    pub fn get_discard_unknown_fields(&self) -> bool {
        self.discard_unknown_fields
    }
}

/// Per-call decoding state.
///
/// Holds nothing shared, each decode of an independent buffer gets its own.
#[derive(Debug, Default)]
pub struct Decoder {
    options: DecodeOptions,
    depth: u32,
}

impl Decoder {
    pub fn new(options: DecodeOptions) -> Self {
        Decoder { options, depth: 0 }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes a message that spans all of `buf`.
    pub fn decode<M: Message>(&mut self, buf: &[u8]) -> Result<M, DecodeError> {
        self.merge::<M>(M::Builder::default(), buf)
    }

    /// Merges the fields in `buf` into `builder`, then checks non-null
    /// constraints and builds the message.
    pub fn merge<M: Message>(
        &mut self,
        mut builder: M::Builder,
        mut buf: &[u8],
    ) -> Result<M, DecodeError> {
        let schema = M::schema();
        self.merge_fields(schema, &mut builder, &mut buf)?;
        check_non_null(schema, &builder)?;
        builder.build()
    }

    fn merge_fields<B: MessageBuilder>(
        &mut self,
        schema: &'static MessageSchema,
        builder: &mut B,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        while !buf.is_empty() {
            let record = *buf;
            let key = decode_key(buf)?;
            let key_len = record.len() - buf.len();
            let (wire_type, number) = key.into_parts();

            match schema.field(number) {
                Some(field) if field.accepts(wire_type) => {
                    builder.merge_field(number, wire_type, buf, self)?;
                }
                known => {
                    // Unknown numbers and known numbers with an unexpected wire
                    // type are both preserved as raw data.
                    skip_field(key, buf)?;
                    if self.options.discard_unknown_fields {
                        continue;
                    }
                    let raw = &record[..record.len() - buf.len()];
                    trace!(
                        message_type = schema.full_name,
                        number,
                        ?wire_type,
                        mismatched = known.is_some(),
                        len = raw.len(),
                        "preserving unknown field"
                    );
                    builder.unknown_fields_mut().record(
                        number,
                        UnknownValue::new(wire_type, key_len, Bytes::copy_from_slice(raw)),
                    );
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn enter(&mut self) -> Result<(), DecodeError> {
        if self.depth >= self.options.recursion_limit {
            return Err(DecodeError::recursion_limit_exceeded(
                self.options.recursion_limit,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// Decodes a length-prefixed embedded message from the front of `buf`.
    pub fn decode_nested<M: Message>(&mut self, buf: &mut &[u8]) -> Result<M, DecodeError> {
        let payload = split_len_delimited(buf)?;
        self.enter()?;
        let result = self.decode::<M>(payload);
        self.depth -= 1;
        result
    }

    /// Decodes a singular embedded message field, merging into any value
    /// already present.
    pub fn merge_message<M: Message>(
        &mut self,
        dst: &mut Option<M>,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        let payload = split_len_delimited(buf)?;
        let builder = match dst.take() {
            Some(existing) => existing.into_builder(),
            None => M::Builder::default(),
        };
        self.enter()?;
        let result = self.merge::<M>(builder, payload);
        self.depth -= 1;
        *dst = Some(result?);
        Ok(())
    }

    /// Decodes one element of a repeated embedded message field.
    pub fn merge_repeated_message<M: Message>(
        &mut self,
        dst: &mut Vec<M>,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        dst.push(self.decode_nested(buf)?);
        Ok(())
    }
}

/// Fails when a field or oneof declared non-null has no value.
fn check_non_null<B: MessageBuilder>(
    schema: &'static MessageSchema,
    builder: &B,
) -> Result<(), DecodeError> {
    for field in schema.fields.iter().filter(|f| f.non_null && f.oneof.is_none()) {
        if !builder.has_field(field.number) {
            return Err(DecodeError::null_field(schema.full_name, field.name));
        }
    }

    for (index, oneof) in schema.oneofs.iter().enumerate() {
        if oneof.non_null
            && !schema
                .oneof_members(index)
                .any(|f| builder.has_field(f.number))
        {
            return Err(DecodeError::null_oneof(schema.full_name, oneof.name));
        }
    }
    Ok(())
}
