//! Wire format for Google's Protocol Buffers, aka [protobuf](https://protobuf.dev).

// Keys are at most 32 bits wide, casts below are checked by the tag range.
#![allow(clippy::as_conversions)]

use bytes::Buf;

use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::util::{likely, unlikely};

/// Minimum value of a protobuf tag.
pub const MINIMUM_TAG_VAL: u32 = 1;
/// Maximum value of a protobuf tag.
pub const MAXIMUM_TAG_VAL: u32 = (1 << 29) - 1;

/// Groups nested deeper than this while skipping are rejected.
const MAX_GROUP_DEPTH: u32 = 64;

/// A decoded protobuf field key containing a wire type and tag.
///
/// The layout mirrors the protobuf wire format:
/// * Bits 0-2: wire type (0-5)
/// * Bits 3-31: tag/field number (1 to 2^29-1)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtoKey {
    tag: u32,
    wire_type: WireType,
}

impl ProtoKey {
    /// Creates a key from its parts.
    ///
    /// Returns an error if the tag is out of range.
    #[inline]
    pub fn new(tag: u32, wire_type: WireType) -> Result<Self, DecodeError> {
        if unlikely(!(MINIMUM_TAG_VAL..=MAXIMUM_TAG_VAL).contains(&tag)) {
            return Err(DecodeError::invalid_field_number(u64::from(tag)));
        }
        Ok(ProtoKey { tag, wire_type })
    }

    /// Unpacks a raw key value, validating the wire type and tag.
    #[inline(always)]
    pub fn from_raw(raw_key: u64) -> Result<Self, DecodeError> {
        let wire_type = WireType::try_from_val((raw_key & 0b111) as u8)?;

        let tag = raw_key >> 3;
        if unlikely(tag == 0 || tag > u64::from(MAXIMUM_TAG_VAL)) {
            return Err(DecodeError::invalid_field_number(tag));
        }

        Ok(ProtoKey {
            tag: tag as u32,
            wire_type,
        })
    }

    /// Returns the raw `(tag << 3) | wire_type` value of this key.
    #[inline(always)]
    pub const fn into_raw(self) -> u32 {
        (self.tag << 3) | self.wire_type.into_val() as u32
    }

    /// Returns the [`WireType`] component of this key.
    #[inline(always)]
    pub const fn wire_type(self) -> WireType {
        self.wire_type
    }

    /// Returns the tag/field number component of this key.
    #[inline(always)]
    pub const fn tag(self) -> u32 {
        self.tag
    }

    /// Decomposes this key into its [`WireType`] and tag components.
    #[inline(always)]
    pub const fn into_parts(self) -> (WireType, u32) {
        (self.wire_type, self.tag)
    }
}

impl core::fmt::Debug for ProtoKey {
    #[cold]
    #[inline(never)]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProtoKey")
            .field("wire_type", &self.wire_type())
            .field("tag", &self.tag())
            .finish()
    }
}

/// Encodes the provided tag and wire_type as a protobuf field key.
///
/// Follows the specification from <https://protobuf.dev/programming-guides/encoding>
/// under the "Message Structure" section.
#[inline(always)]
pub fn encode_key<B: bytes::BufMut>(wire_type: WireType, tag: u32, buf: &mut B) -> usize {
    let key = (tag << 3) | u32::from(wire_type.into_val());
    key.encode_leb128(buf)
}

/// Returns the encoded length of a field key (tag + wire type).
#[inline(always)]
pub fn encoded_key_len(tag: u32) -> usize {
    // The wire type only occupies the low 3 bits and never changes the length.
    (tag << 3).encoded_leb128_len()
}

/// Decodes the key from a protobuf encoded message.
///
/// Follows the specification from <https://protobuf.dev/programming-guides/encoding>
/// under the "Message Structure" section.
#[inline]
pub fn decode_key<B: Buf>(buf: &mut B) -> Result<ProtoKey, DecodeError> {
    let chunk = buf.chunk();

    // N.B. Most keys are a single byte, tags 1 through 15.
    let raw = if likely(!chunk.is_empty() && chunk[0] < 0x80) {
        let raw = u64::from(chunk[0]);
        buf.advance(1);
        raw
    } else {
        u64::decode_leb128_buf(buf)?.0
    };

    ProtoKey::from_raw(raw)
}

/// Decodes the length prefix for a length-delimited field.
#[inline(always)]
pub fn decode_len<B: Buf>(buf: &mut B) -> Result<usize, DecodeError> {
    let chunk = buf.chunk();
    // Fast path, most lengths fit in one byte (< 128).
    if likely(!chunk.is_empty() && chunk[0] < 0x80) {
        let len = usize::from(chunk[0]);
        buf.advance(1);
        Ok(len)
    } else {
        let (len, _) = u64::decode_leb128_buf(buf)?;
        usize::try_from(len).map_err(|_| DecodeError::length_overflow(len))
    }
}

/// Reads a length prefix and splits the payload it covers off the front of
/// `buf`.
///
/// The returned slice bounds an embedded message, a string, or a packed run.
#[inline]
pub fn split_len_delimited<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], DecodeError> {
    let len = decode_len(buf)?;
    if unlikely(buf.len() < len) {
        return Err(DecodeError::truncated(len, buf.len()));
    }
    let (payload, rest) = buf.split_at(len);
    *buf = rest;
    Ok(payload)
}

/// Skips over a field value based on its key.
///
/// Protobuf supports backwards and forwards compatibility by skipping fields
/// we don't know about. We "skip" a field by advancing our buffer past it.
/// Groups are skipped up to and including their matching end-group key.
#[inline]
pub fn skip_field<B: Buf>(key: ProtoKey, buf: &mut B) -> Result<(), DecodeError> {
    skip_field_inner(key, buf, 0)
}

fn skip_field_inner<B: Buf>(key: ProtoKey, buf: &mut B, depth: u32) -> Result<(), DecodeError> {
    let skip_len = match key.wire_type() {
        WireType::Varint => {
            u64::decode_leb128_buf(buf)?;
            return Ok(());
        }
        WireType::I64 => 8,
        WireType::Len => decode_len(buf)?,
        WireType::I32 => 4,
        WireType::SGroup => {
            if unlikely(depth >= MAX_GROUP_DEPTH) {
                return Err(DecodeError::recursion_limit_exceeded(MAX_GROUP_DEPTH));
            }
            loop {
                if unlikely(!buf.has_remaining()) {
                    return Err(DecodeError::truncated(1, 0));
                }
                let inner = decode_key(buf)?;
                if inner.wire_type() == WireType::EGroup {
                    if inner.tag() != key.tag() {
                        return Err(DecodeError::unexpected_end_group(inner.tag()));
                    }
                    return Ok(());
                }
                skip_field_inner(inner, buf, depth + 1)?;
            }
        }
        WireType::EGroup => return Err(DecodeError::unexpected_end_group(key.tag())),
    };

    if unlikely(buf.remaining() < skip_len) {
        return Err(DecodeError::truncated(skip_len, buf.remaining()));
    }
    buf.advance(skip_len);
    Ok(())
}

/// Denotes the type of a field in an encoded protobuf message.
///
/// Protobuf messages are a series of key-value pairs. When encoded each key-value pair
/// is turned into a record consisting of a field number, a [`WireType`], and a payload.
/// The [`WireType`] indicates how large the proceeding payload is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable length integer.
    ///
    /// Used for: `int32`, `int64`, `uint32`, `uint64`, `sint32`, `sint64`, `bool`, `enum`.
    Varint = 0,
    /// 64-bit integer.
    ///
    /// Used for: `fixed64`, `sfixed64`, `double`.
    I64 = 1,
    /// Variable length field.
    ///
    /// Used for: `string`, `bytes`, `message`, packed `repeated` fields.
    Len = 2,
    /// Group start (deprecated, only ever skipped).
    SGroup = 3,
    /// Group end (deprecated, only ever skipped).
    EGroup = 4,
    /// 32-bit integer.
    ///
    /// Used for: `fixed32`, `sfixed32`, `float`.
    I32 = 5,
}

static_assertions::assert_eq_size!(WireType, u8);
static_assertions::const_assert_eq!(WireType::Varint as u8, 0);
static_assertions::const_assert_eq!(WireType::I32 as u8, 5);

impl WireType {
    /// Try to decode a [`WireType`] from the provided raw value.
    #[inline(always)]
    pub fn try_from_val(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::I64),
            2 => Ok(WireType::Len),
            3 => Ok(WireType::SGroup),
            4 => Ok(WireType::EGroup),
            5 => Ok(WireType::I32),
            other => Err(DecodeError::invalid_wire_type(other)),
        }
    }

    /// Return the raw value for this [`WireType`].
    #[inline(always)]
    pub const fn into_val(self) -> u8 {
        self as u8
    }

    /// Width in bytes of a fixed-width payload, `None` for variable length types.
    #[inline]
    pub const fn fixed_width(self) -> Option<u8> {
        match self {
            WireType::I32 => Some(4),
            WireType::I64 => Some(8),
            _ => None,
        }
    }
}

impl TryFrom<u8> for WireType {
    type Error = DecodeError;

    #[inline(always)]
    fn try_from(value: u8) -> Result<Self, DecodeError> {
        WireType::try_from_val(value)
    }
}
