//! Oneof field support for protobuf.
//!
//! Protobuf oneofs map naturally to Rust enums held as `Option<Enum>`. Oneofs
//! have no wire representation of their own, each variant is encoded as a
//! regular field with its own number.
//!
//! When several members of the same oneof appear on the wire the last one
//! wins and replaces the earlier value, even when both are messages.

use bytes::BufMut;

use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::wire::WireType;

/// Trait for protobuf oneof types.
pub trait ProtoOneof: Sized {
    /// Decode a oneof variant from the given field number and buffer.
    ///
    /// Returns `Ok(None)` when `number` is not a member of this oneof.
    /// `buf` is positioned right after the field key.
    fn decode_variant(
        number: u32,
        wire_type: WireType,
        buf: &mut &[u8],
        decoder: &mut Decoder,
    ) -> Result<Option<Self>, DecodeError>;

    /// Encode this oneof variant to the buffer, including its field key.
    fn encode_variant<B: BufMut>(&self, buf: &mut B);

    /// Returns the encoded length of this variant (including field key).
    fn encoded_variant_len(&self) -> usize;

    /// Returns the field number of the currently active variant.
    fn variant_number(&self) -> u32;
}

/// Decodes a oneof member into `dst`, replacing any existing value.
///
/// Returns `false` if `number` is not a member of the oneof.
#[inline]
pub fn merge_oneof<O: ProtoOneof>(
    dst: &mut Option<O>,
    number: u32,
    wire_type: WireType,
    buf: &mut &[u8],
    decoder: &mut Decoder,
) -> Result<bool, DecodeError> {
    match O::decode_variant(number, wire_type, buf, decoder)? {
        Some(value) => {
            *dst = Some(value);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Writes the active member of a oneof, if any.
#[inline]
pub fn encode_oneof<O: ProtoOneof, B: BufMut>(field: &Option<O>, buf: &mut B) {
    if let Some(value) = field {
        value.encode_variant(buf);
    }
}

/// Encoded length of [`encode_oneof`].
#[inline]
pub fn oneof_len<O: ProtoOneof>(field: &Option<O>) -> usize {
    field.as_ref().map_or(0, ProtoOneof::encoded_variant_len)
}
