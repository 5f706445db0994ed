//! Repeated fields, packed and unpacked.
//!
//! Decoding accepts both encodings for every packable type regardless of how
//! the field is declared, appending values in the order they arrive.

// Packed lengths are summed in usize and written as u64.
#![allow(clippy::as_conversions)]

use bytes::BufMut;

use super::{decode_value, ProtoDecode, ProtoEncode};
use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::wire::{encode_key, encoded_key_len, split_len_delimited, WireType};

#[inline]
fn is_packable<T: ProtoEncode>() -> bool {
    T::WIRE_TYPE != WireType::Len
}

#[inline]
fn packed_payload_len<T: ProtoEncode>(values: &[T]) -> usize {
    match T::WIRE_TYPE.fixed_width() {
        Some(width) => values.len() * usize::from(width),
        None => values.iter().map(ProtoEncode::encoded_len).sum(),
    }
}

/// Writes a repeated field.
///
/// Length-delimited element types are never packed, `packed` is ignored for
/// them. An empty field writes nothing.
pub fn encode_repeated<T: ProtoEncode, B: BufMut>(
    number: u32,
    values: &[T],
    packed: bool,
    buf: &mut B,
) {
    if values.is_empty() {
        return;
    }

    if packed && is_packable::<T>() {
        encode_key(WireType::Len, number, buf);
        (packed_payload_len(values) as u64).encode_leb128(buf);
        for value in values {
            value.encode(buf);
        }
    } else {
        for value in values {
            encode_key(T::WIRE_TYPE, number, buf);
            value.encode(buf);
        }
    }
}

/// Encoded length of [`encode_repeated`].
pub fn repeated_len<T: ProtoEncode>(number: u32, values: &[T], packed: bool) -> usize {
    if values.is_empty() {
        return 0;
    }

    if packed && is_packable::<T>() {
        let payload = packed_payload_len(values);
        encoded_key_len(number) + (payload as u64).encoded_leb128_len() + payload
    } else {
        values.len() * encoded_key_len(number)
            + values.iter().map(ProtoEncode::encoded_len).sum::<usize>()
    }
}

/// Decodes one occurrence of a repeated field, which is either a single
/// element or a packed run of elements.
pub fn merge_repeated<T: ProtoDecode>(
    dst: &mut Vec<T>,
    wire_type: WireType,
    buf: &mut &[u8],
) -> Result<(), DecodeError> {
    if wire_type == WireType::Len && T::WIRE_TYPE != WireType::Len {
        let mut payload = split_len_delimited(buf)?;
        if let Some(width) = T::WIRE_TYPE.fixed_width() {
            if payload.len() % usize::from(width) != 0 {
                return Err(DecodeError::invalid_packed_length(width, payload.len()));
            }
            dst.reserve(payload.len() / usize::from(width));
        }
        while !payload.is_empty() {
            dst.push(decode_value(&mut payload)?);
        }
        Ok(())
    } else {
        dst.push(decode_value(buf)?);
        Ok(())
    }
}
