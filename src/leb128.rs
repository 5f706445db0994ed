//! LEB128 variable-length integer encoding/decoding, plus zigzag mapping for
//! `sint32`/`sint64`.

// This module uses `as` casts which have been reviewed for correctness.
#![allow(clippy::as_conversions)]

use crate::error::DecodeError;

/// Maximum number of bytes a protobuf varint may occupy.
pub const MAX_VARINT_LEN: usize = 10;

/// Types that can be encoded as, and decoded from, a LEB128 varint.
pub trait LebCodec: Sized + Copy {
    /// Maximum number of bytes needed to encode any value of `Self`.
    const MAX_LEB_BYTES: u32;

    /// Decode a varint from the front of `data`.
    ///
    /// Returns the decoded value and the number of bytes consumed. Values
    /// wider than `Self` are truncated to the low bits, matching how protobuf
    /// parsers read `int32` fields that were written sign-extended.
    fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeError>;

    /// Decode a varint from a [`bytes::Buf`], advancing past it.
    fn decode_leb128_buf<B: bytes::Buf>(buf: &mut B) -> Result<(Self, usize), DecodeError>;

    /// Encode `self` into the provided buffer, returning the number of bytes written.
    fn encode_leb128<B: bytes::BufMut>(self, buf: &mut B) -> usize;

    /// The number of bytes required to encode this integer.
    fn encoded_leb128_len(self) -> usize;
}

impl LebCodec for u64 {
    const MAX_LEB_BYTES: u32 = MAX_VARINT_LEN as u32;

    #[inline]
    fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut value: u64 = 0;
        for (i, b) in data.iter().take(MAX_VARINT_LEN).enumerate() {
            // The 10th byte only contributes its lowest bit, the rest overflow
            // and are dropped.
            value |= u64::from(b & 0x7f) << (7 * i);
            if *b < 0x80 {
                return Ok((value, i + 1));
            }
        }

        if data.len() >= MAX_VARINT_LEN {
            Err(DecodeError::overlong_varint())
        } else {
            Err(DecodeError::truncated_varint())
        }
    }

    #[inline]
    fn decode_leb128_buf<B: bytes::Buf>(buf: &mut B) -> Result<(Self, usize), DecodeError> {
        let chunk = buf.chunk();

        // Fast path: the whole varint lives in the current chunk.
        if chunk.len() >= MAX_VARINT_LEN || chunk.last().is_some_and(|b| *b < 0x80) {
            let (value, len) = Self::decode_leb128(chunk)?;
            buf.advance(len);
            return Ok((value, len));
        }

        // Slow path: read byte by byte across chunk boundaries.
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            if !buf.has_remaining() {
                return Err(DecodeError::truncated_varint());
            }
            let b = buf.get_u8();
            value |= u64::from(b & 0x7f) << (7 * i);
            if b < 0x80 {
                return Ok((value, i + 1));
            }
        }
        Err(DecodeError::overlong_varint())
    }

    #[inline]
    fn encode_leb128<B: bytes::BufMut>(self, buf: &mut B) -> usize {
        let mut value = self;
        let mut written = 1;
        while value >= 0x80 {
            buf.put_u8((value as u8 & 0x7f) | 0x80);
            value >>= 7;
            written += 1;
        }
        buf.put_u8(value as u8);
        written
    }

    #[inline]
    fn encoded_leb128_len(self) -> usize {
        #[rustfmt::skip]
        const LZ_TO_LEN: [u8; 65] = [
            10,                                         // 0:     64 bits -> 10 bytes
            9, 9, 9, 9, 9, 9, 9,                        // 1-7:   63-57 bits -> 9 bytes
            8, 8, 8, 8, 8, 8, 8,                        // 8-14:  56-50 bits -> 8 bytes
            7, 7, 7, 7, 7, 7, 7,                        // 15-21: 49-43 bits -> 7 bytes
            6, 6, 6, 6, 6, 6, 6,                        // 22-28: 42-36 bits -> 6 bytes
            5, 5, 5, 5, 5, 5, 5,                        // 29-35: 35-29 bits -> 5 bytes
            4, 4, 4, 4, 4, 4, 4,                        // 36-42: 28-22 bits -> 4 bytes
            3, 3, 3, 3, 3, 3, 3,                        // 43-49: 21-15 bits -> 3 bytes
            2, 2, 2, 2, 2, 2, 2,                        // 50-56: 14-8 bits  -> 2 bytes
            1, 1, 1, 1, 1, 1, 1, 1,                     // 57-64: 7-0 bits   -> 1 byte
        ];

        LZ_TO_LEN[self.leading_zeros() as usize] as usize
    }
}

impl LebCodec for u32 {
    const MAX_LEB_BYTES: u32 = 5;

    #[inline]
    fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeError> {
        u64::decode_leb128(data).map(|(value, len)| (value as u32, len))
    }

    #[inline]
    fn decode_leb128_buf<B: bytes::Buf>(buf: &mut B) -> Result<(Self, usize), DecodeError> {
        u64::decode_leb128_buf(buf).map(|(value, len)| (value as u32, len))
    }

    #[inline]
    fn encode_leb128<B: bytes::BufMut>(self, buf: &mut B) -> usize {
        u64::from(self).encode_leb128(buf)
    }

    #[inline]
    fn encoded_leb128_len(self) -> usize {
        #[rustfmt::skip]
        const LZ_TO_LEN: [u8; 33] = [
            5, 5, 5, 5,                         // 0-3:   32-29 bits -> 5 bytes
            4, 4, 4, 4, 4, 4, 4,                // 4-10:  28-22 bits -> 4 bytes
            3, 3, 3, 3, 3, 3, 3,                // 11-17: 21-15 bits -> 3 bytes
            2, 2, 2, 2, 2, 2, 2,                // 18-24: 14-8 bits  -> 2 bytes
            1, 1, 1, 1, 1, 1, 1, 1,             // 25-32: 7-0 bits   -> 1 byte
        ];

        LZ_TO_LEN[self.leading_zeros() as usize] as usize
    }
}

/// Encodes `value` as a varint, returning the number of bytes written.
#[inline]
pub fn encode_varint<B: bytes::BufMut>(value: u64, buf: &mut B) -> usize {
    value.encode_leb128(buf)
}

/// Decodes a varint starting at `offset` within `data`.
///
/// Returns the value and the number of bytes consumed.
#[inline]
pub fn decode_varint(data: &[u8], offset: usize) -> Result<(u64, usize), DecodeError> {
    match data.get(offset..) {
        Some(rest) => u64::decode_leb128(rest),
        None => Err(DecodeError::truncated_varint()),
    }
}

/// Returns the number of bytes [`encode_varint`] would write for `value`.
#[inline]
pub fn encoded_varint_len(value: u64) -> usize {
    value.encoded_leb128_len()
}

#[inline]
pub const fn zigzag_encode_32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

#[inline]
pub const fn zigzag_decode_32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ (-((n & 1) as i32))
}

#[inline]
pub const fn zigzag_encode_64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[inline]
pub const fn zigzag_decode_64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}
