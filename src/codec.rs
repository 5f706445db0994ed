//! Encoding and decoding traits for protobuf wire format, plus the per-field
//! helpers message implementations are written against.

mod default_check;
mod delimited;
mod map;
mod message;
mod oneof;
mod optional;
mod repeated;
mod scalar;

use crate::error::DecodeError;
use crate::wire::WireType;

pub trait ProtoType: Sized {
    /// The wire type used to encode a single value of this type.
    const WIRE_TYPE: WireType;
}

/// A type that can be decoded from protobuf wire format.
///
/// The `decode_into` method follows protobuf merging semantics:
/// - Scalars: last value wins (overwrite)
/// - Strings and bytes: last value wins (overwrite)
pub trait ProtoDecode: ProtoType + Default {
    /// Decode a single value's payload from `buf` into `dst`.
    fn decode_into<B: bytes::Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError>;
}

/// A type that can be encoded to protobuf wire format.
pub trait ProtoEncode: ProtoType {
    /// Encode this value's payload to the buffer, without a field key.
    fn encode<B: bytes::BufMut>(&self, buf: &mut B);

    /// Returns the encoded length of this value (not including field key).
    fn encoded_len(&self) -> usize;
}

/// Decodes a single value of `T` from the front of `buf`.
#[inline]
pub fn decode_value<T: ProtoDecode, B: bytes::Buf>(buf: &mut B) -> Result<T, DecodeError> {
    let mut value = T::default();
    T::decode_into(buf, &mut value)?;
    Ok(value)
}

pub use default_check::IsProtoDefault;
pub use scalar::{Fixed32, Fixed64, Sfixed32, Sfixed64, Sint32, Sint64};

pub use optional::{
    encode_field, encode_optional, encode_scalar, field_len, merge_optional, merge_scalar,
    optional_len, scalar_len,
};
pub use repeated::{encode_repeated, merge_repeated, repeated_len};

pub use message::{
    encode_message, encode_optional_message, encode_repeated_message, message_len,
    optional_message_len, repeated_message_len,
};

pub use map::{encode_map, map_len, merge_map_entry, MapField, MapValue, ProtoMap, ProtoMapKey};
pub use oneof::{encode_oneof, merge_oneof, oneof_len, ProtoOneof};
