//! Scalar protobuf types and their encoding/decoding implementations.

// Sign extension and truncation below follow the protobuf integer rules.
#![allow(clippy::as_conversions)]

use bytes::{Buf, BufMut};

use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::error::DecodeError;
use crate::leb128::{zigzag_decode_32, zigzag_decode_64, zigzag_encode_32, zigzag_encode_64};
use crate::leb128::LebCodec;
use crate::wire::WireType;

impl ProtoType for u64 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for u64 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = u64::decode_leb128_buf(buf)?.0;
        Ok(())
    }
}

impl ProtoEncode for u64 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        self.encoded_leb128_len()
    }
}

impl ProtoType for u32 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for u32 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = u32::decode_leb128_buf(buf)?.0;
        Ok(())
    }
}

impl ProtoEncode for u32 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        self.encoded_leb128_len()
    }
}

impl ProtoType for i64 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for i64 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = u64::decode_leb128_buf(buf)?.0 as i64;
        Ok(())
    }
}

impl ProtoEncode for i64 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        (*self as u64).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        (*self as u64).encoded_leb128_len()
    }
}

impl ProtoType for i32 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for i32 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        // Protobuf int32 is encoded as varint, sign-extended to 64 bits.
        *dst = u64::decode_leb128_buf(buf)?.0 as i32;
        Ok(())
    }
}

impl ProtoEncode for i32 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        // Negative values are sign-extended to 64 bits.
        (*self as i64 as u64).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        (*self as i64 as u64).encoded_leb128_len()
    }
}

impl ProtoType for bool {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for bool {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = u64::decode_leb128_buf(buf)?.0 != 0;
        Ok(())
    }
}

impl ProtoEncode for bool {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(u8::from(*self));
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        1
    }
}

/// Wrapper for protobuf `sint32` (zigzag-encoded signed 32-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Sint32(pub i32);

impl ProtoType for Sint32 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for Sint32 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = Sint32(zigzag_decode_32(u32::decode_leb128_buf(buf)?.0));
        Ok(())
    }
}

impl ProtoEncode for Sint32 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        zigzag_encode_32(self.0).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        zigzag_encode_32(self.0).encoded_leb128_len()
    }
}

/// Wrapper for protobuf `sint64` (zigzag-encoded signed 64-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Sint64(pub i64);

impl ProtoType for Sint64 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for Sint64 {
    #[inline]
    fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = Sint64(zigzag_decode_64(u64::decode_leb128_buf(buf)?.0));
        Ok(())
    }
}

impl ProtoEncode for Sint64 {
    #[inline]
    fn encode<B: BufMut>(&self, buf: &mut B) {
        zigzag_encode_64(self.0).encode_leb128(buf);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        zigzag_encode_64(self.0).encoded_leb128_len()
    }
}

#[inline]
fn ensure_remaining<B: Buf>(buf: &B, needed: usize) -> Result<(), DecodeError> {
    if buf.remaining() < needed {
        return Err(DecodeError::truncated(needed, buf.remaining()));
    }
    Ok(())
}

/// Implements the codec traits for a fixed-width type.
macro_rules! fixed_width {
    ($ty:ty, $wire:expr, $len:literal, $get:ident, $put:ident, |$v:ident| $from:expr, |$s:ident| $to:expr) => {
        impl ProtoType for $ty {
            const WIRE_TYPE: WireType = $wire;
        }

        impl ProtoDecode for $ty {
            #[inline]
            fn decode_into<B: Buf>(buf: &mut B, dst: &mut Self) -> Result<(), DecodeError> {
                ensure_remaining(buf, $len)?;
                let $v = buf.$get();
                *dst = $from;
                Ok(())
            }
        }

        impl ProtoEncode for $ty {
            #[inline]
            fn encode<B: BufMut>(&self, buf: &mut B) {
                let $s = self;
                buf.$put($to);
            }

            #[inline]
            fn encoded_len(&self) -> usize {
                $len
            }
        }
    };
}

/// Wrapper for protobuf `fixed32` (always 4 bytes, little-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Fixed32(pub u32);

/// Wrapper for protobuf `fixed64` (always 8 bytes, little-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Fixed64(pub u64);

/// Wrapper for protobuf `sfixed32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Sfixed32(pub i32);

/// Wrapper for protobuf `sfixed64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Sfixed64(pub i64);

fixed_width!(Fixed32, WireType::I32, 4, get_u32_le, put_u32_le, |v| Fixed32(v), |s| s.0);
fixed_width!(Fixed64, WireType::I64, 8, get_u64_le, put_u64_le, |v| Fixed64(v), |s| s.0);
fixed_width!(Sfixed32, WireType::I32, 4, get_i32_le, put_i32_le, |v| Sfixed32(v), |s| s.0);
fixed_width!(Sfixed64, WireType::I64, 8, get_i64_le, put_i64_le, |v| Sfixed64(v), |s| s.0);
fixed_width!(f32, WireType::I32, 4, get_f32_le, put_f32_le, |v| v, |s| *s);
fixed_width!(f64, WireType::I64, 8, get_f64_le, put_f64_le, |v| v, |s| *s);

macro_rules! deref_inner {
    ($($ty:ident => $inner:ty),* $(,)?) => {
        $(
            impl core::ops::Deref for $ty {
                type Target = $inner;
                fn deref(&self) -> &Self::Target {
                    &self.0
                }
            }
        )*
    };
}

deref_inner!(
    Sint32 => i32,
    Sint64 => i64,
    Fixed32 => u32,
    Fixed64 => u64,
    Sfixed32 => i32,
    Sfixed64 => i64,
);

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: ProtoEncode + ProtoDecode + PartialEq + std::fmt::Debug>(value: T) {
        let mut buf = Vec::new();
        value.encode(&mut buf);
        assert_eq!(buf.len(), value.encoded_len());
        let mut decoded = T::default();
        T::decode_into(&mut &buf[..], &mut decoded).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_varint_roundtrip() {
        roundtrip(0u32);
        roundtrip(127u32);
        roundtrip(128u32);
        roundtrip(u32::MAX);

        roundtrip(0u64);
        roundtrip(u64::MAX);

        roundtrip(0i32);
        roundtrip(-1i32);
        roundtrip(i32::MIN);
        roundtrip(i64::MIN);

        roundtrip(true);
        roundtrip(false);
    }

    #[test]
    fn test_negative_int32_is_ten_bytes() {
        assert_eq!((-1i32).encoded_len(), 10);
        assert_eq!(Sint32(-1).encoded_len(), 1);
    }

    #[test]
    fn test_zigzag_roundtrip() {
        roundtrip(Sint32(-64));
        roundtrip(Sint32(i32::MAX));
        roundtrip(Sint64(i64::MIN));
    }

    #[test]
    fn test_fixed_roundtrip() {
        roundtrip(Fixed32(0xdead_beef));
        roundtrip(Fixed64(u64::MAX));
        roundtrip(Sfixed32(-7));
        roundtrip(Sfixed64(-7));
        roundtrip(1.5f32);
        roundtrip(-0.25f64);
    }

    #[test]
    fn test_fixed_little_endian() {
        let mut buf = Vec::new();
        Fixed32(1).encode(&mut buf);
        assert_eq!(buf, [1, 0, 0, 0]);
    }

    #[test]
    fn test_fixed_truncated() {
        let mut decoded = Fixed64::default();
        assert!(Fixed64::decode_into(&mut &[1u8, 2, 3][..], &mut decoded).is_err());
    }
}
