//! Errors produced while decoding protobuf messages.

use thiserror::Error;

/// Name of the field-level option that marks a field as non-null.
pub const NON_NULL_PROPERTY_OPTION: &str = "(protokt.property).non_null";
/// Name of the oneof-level option that marks a oneof as non-null.
pub const NON_NULL_ONEOF_OPTION: &str = "(protokt.oneof).non_null";

/// Why a varint could not be decoded.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MalformedVarintReason {
    /// The input ended before a terminating byte was found.
    Truncated,
    /// Ten bytes were consumed without finding a terminating byte.
    TooLong,
}

impl core::fmt::Display for MalformedVarintReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MalformedVarintReason::Truncated => f.write_str("input ended mid-varint"),
            MalformedVarintReason::TooLong => f.write_str("more than 10 bytes"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("malformed varint: {reason}")]
    MalformedVarint { reason: MalformedVarintReason },
    #[error("invalid 'wire type' value: {value}")]
    InvalidWireType { value: u8 },
    #[error("invalid field number: {value}")]
    InvalidFieldNumber { value: u64 },
    #[error("truncated message: needed {needed} bytes, {remaining} remaining")]
    TruncatedMessage { needed: usize, remaining: usize },
    #[error("length prefix {value} exceeds platform addressable memory")]
    LengthOverflow { value: u64 },
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,
    #[error("invalid packed field length: {actual} is not a multiple of {expected_multiple}")]
    InvalidPackedLength { expected_multiple: u8, actual: usize },
    #[error("end group for field {field_number} without a matching start group")]
    UnexpectedEndGroup { field_number: u32 },
    #[error("recursion limit of {limit} exceeded")]
    RecursionLimitExceeded { limit: u32 },
    #[error("{message}.{field} was null, but is declared with {option}")]
    NullConstraintViolation {
        message: &'static str,
        field: &'static str,
        option: &'static str,
    },
    #[error("field {field_number} of {message} was accepted by its schema but not handled")]
    UnhandledField {
        message: &'static str,
        field_number: u32,
    },
}

/// Error returned when a protobuf message fails to decode.
///
/// The kind is boxed so `Result<T, DecodeError>` stays a single pointer wide.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct DecodeError {
    kind: Box<DecodeErrorKind>,
}

static_assertions::assert_eq_size!(DecodeError, usize);

impl DecodeError {
    /// Returns the underlying [`DecodeErrorKind`].
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    #[cold]
    pub fn truncated_varint() -> Self {
        DecodeErrorKind::MalformedVarint {
            reason: MalformedVarintReason::Truncated,
        }
        .into()
    }

    #[cold]
    pub fn overlong_varint() -> Self {
        DecodeErrorKind::MalformedVarint {
            reason: MalformedVarintReason::TooLong,
        }
        .into()
    }

    #[cold]
    pub fn invalid_wire_type(value: u8) -> Self {
        DecodeErrorKind::InvalidWireType { value }.into()
    }

    #[cold]
    pub fn invalid_field_number(value: u64) -> Self {
        DecodeErrorKind::InvalidFieldNumber { value }.into()
    }

    #[cold]
    pub fn truncated(needed: usize, remaining: usize) -> Self {
        DecodeErrorKind::TruncatedMessage { needed, remaining }.into()
    }

    #[cold]
    pub fn length_overflow(value: u64) -> Self {
        DecodeErrorKind::LengthOverflow { value }.into()
    }

    #[cold]
    pub fn invalid_utf8() -> Self {
        DecodeErrorKind::InvalidUtf8.into()
    }

    #[cold]
    pub fn invalid_packed_length(expected_multiple: u8, actual: usize) -> Self {
        DecodeErrorKind::InvalidPackedLength {
            expected_multiple,
            actual,
        }
        .into()
    }

    #[cold]
    pub fn unexpected_end_group(field_number: u32) -> Self {
        DecodeErrorKind::UnexpectedEndGroup { field_number }.into()
    }

    #[cold]
    pub fn recursion_limit_exceeded(limit: u32) -> Self {
        DecodeErrorKind::RecursionLimitExceeded { limit }.into()
    }

    /// A non-null field was absent once the message had been fully read.
    #[cold]
    pub fn null_field(message: &'static str, field: &'static str) -> Self {
        DecodeErrorKind::NullConstraintViolation {
            message,
            field,
            option: NON_NULL_PROPERTY_OPTION,
        }
        .into()
    }

    /// No member of a non-null oneof was set once the message had been fully read.
    #[cold]
    pub fn null_oneof(message: &'static str, oneof: &'static str) -> Self {
        DecodeErrorKind::NullConstraintViolation {
            message,
            field: oneof,
            option: NON_NULL_ONEOF_OPTION,
        }
        .into()
    }

    #[cold]
    pub fn unhandled_field(message: &'static str, field_number: u32) -> Self {
        DecodeErrorKind::UnhandledField {
            message,
            field_number,
        }
        .into()
    }
}

impl From<DecodeErrorKind> for DecodeError {
    fn from(kind: DecodeErrorKind) -> Self {
        DecodeError {
            kind: Box::new(kind),
        }
    }
}
