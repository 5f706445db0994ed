//! Length-delimited protobuf types (bytes, string).

// Lengths always fit in a u64.
#![allow(clippy::as_conversions)]

use bytes::{Buf, BufMut, Bytes};

use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::wire::{decode_len, WireType};

#[inline]
fn encode_len_prefix<B: BufMut>(len: usize, buf: &mut B) {
    (len as u64).encode_leb128(buf);
}

#[inline]
fn len_delimited_len(len: usize) -> usize {
    (len as u64).encoded_leb128_len() + len
}

#[inline]
fn read_len<B: Buf>(buf: &mut B) -> Result<usize, DecodeError> {
    let len = decode_len(buf)?;
    if buf.remaining() < len {
        return Err(DecodeError::truncated(len, buf.remaining()));
    }
    Ok(len)
}

impl ProtoType for Bytes {
    const WIRE_TYPE: WireType = WireType::Len;
}

impl ProtoDecode for Bytes {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        let len = read_len(buf)?;
        *dst = buf.copy_to_bytes(len);
        Ok(())
    }
}

impl ProtoEncode for Bytes {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        encode_len_prefix(self.len(), buf);
        buf.put_slice(self);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        len_delimited_len(self.len())
    }
}

impl ProtoType for Vec<u8> {
    const WIRE_TYPE: WireType = WireType::Len;
}

impl ProtoDecode for Vec<u8> {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        let len = read_len(buf)?;
        // A field can show up multiple times, the last occurrence wins.
        dst.clear();
        dst.resize(len, 0);
        buf.copy_to_slice(&mut dst[..]);
        Ok(())
    }
}

impl ProtoEncode for Vec<u8> {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        encode_len_prefix(self.len(), buf);
        buf.put_slice(self);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        len_delimited_len(self.len())
    }
}

impl ProtoType for String {
    const WIRE_TYPE: WireType = WireType::Len;
}

impl ProtoDecode for String {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        let mut bytes = core::mem::take(dst).into_bytes();
        Vec::<u8>::decode_into(buf, &mut bytes)?;
        *dst = String::from_utf8(bytes).map_err(|_| DecodeError::invalid_utf8())?;
        Ok(())
    }
}

impl ProtoEncode for String {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        encode_len_prefix(self.len(), buf);
        buf.put_slice(self.as_bytes());
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        len_delimited_len(self.len())
    }
}
