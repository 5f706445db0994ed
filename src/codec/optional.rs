//! Singular fields, with implicit presence (default values are skipped) or
//! explicit presence (`Option<T>`, written whenever set).

use bytes::{Buf, BufMut};

use super::{IsProtoDefault, ProtoDecode, ProtoEncode};
use crate::error::DecodeError;
use crate::wire::{encode_key, encoded_key_len};

/// Writes `value` under `number` unconditionally.
#[inline]
pub fn encode_field<T: ProtoEncode, B: BufMut>(number: u32, value: &T, buf: &mut B) {
    encode_key(T::WIRE_TYPE, number, buf);
    value.encode(buf);
}

/// Encoded length of [`encode_field`].
#[inline]
pub fn field_len<T: ProtoEncode>(number: u32, value: &T) -> usize {
    encoded_key_len(number) + value.encoded_len()
}

/// Writes an implicit-presence field, skipping it when it holds the default.
#[inline]
pub fn encode_scalar<T, B>(number: u32, value: &T, buf: &mut B)
where
    T: ProtoEncode + IsProtoDefault,
    B: BufMut,
{
    if !value.is_proto_default() {
        encode_field(number, value, buf);
    }
}

/// Encoded length of [`encode_scalar`].
#[inline]
pub fn scalar_len<T: ProtoEncode + IsProtoDefault>(number: u32, value: &T) -> usize {
    if value.is_proto_default() {
        0
    } else {
        field_len(number, value)
    }
}

/// Writes an explicit-presence field when it is set.
#[inline]
pub fn encode_optional<T: ProtoEncode, B: BufMut>(number: u32, value: &Option<T>, buf: &mut B) {
    if let Some(value) = value {
        encode_field(number, value, buf);
    }
}

/// Encoded length of [`encode_optional`].
#[inline]
pub fn optional_len<T: ProtoEncode>(number: u32, value: &Option<T>) -> usize {
    value.as_ref().map_or(0, |value| field_len(number, value))
}

/// Decodes one occurrence of a singular field, replacing the current value.
#[inline]
pub fn merge_scalar<T: ProtoDecode, B: Buf>(dst: &mut T, buf: &mut B) -> Result<(), DecodeError> {
    T::decode_into(buf, dst)
}

/// Decodes one occurrence of an explicit-presence field.
#[inline]
pub fn merge_optional<T: ProtoDecode, B: Buf>(
    dst: &mut Option<T>,
    buf: &mut B,
) -> Result<(), DecodeError> {
    let value = dst.get_or_insert_with(T::default);
    T::decode_into(buf, value)
}
