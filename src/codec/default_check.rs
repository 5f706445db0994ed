//! Default value checks for implicit-presence fields.
//!
//! Singular fields without explicit presence are not written when they hold
//! their default value.

use bytes::Bytes;

use super::{Fixed32, Fixed64, Sfixed32, Sfixed64, Sint32, Sint64};

/// Trait for checking if a value is the protobuf default.
///
/// This avoids creating a temporary default value for comparison.
pub trait IsProtoDefault {
    /// Returns true if this value is the protobuf default value.
    fn is_proto_default(&self) -> bool;
}

macro_rules! zero_default {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IsProtoDefault for $ty {
                #[inline(always)]
                fn is_proto_default(&self) -> bool {
                    *self == Default::default()
                }
            }
        )*
    };
}

zero_default!(u32, u64, i32, i64, bool, Sint32, Sint64, Fixed32, Fixed64, Sfixed32, Sfixed64);

// Floats compare by bits so `-0.0` is still written.
impl IsProtoDefault for f32 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.to_bits() == 0
    }
}

impl IsProtoDefault for f64 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.to_bits() == 0
    }
}

impl IsProtoDefault for String {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.is_empty()
    }
}

impl IsProtoDefault for Vec<u8> {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.is_empty()
    }
}

impl IsProtoDefault for Bytes {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.is_empty()
    }
}

impl<T> IsProtoDefault for Option<T> {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.is_none()
    }
}
