//! Protobuf wire-format runtime with unknown-field preservation, non-null
//! field constraints, and self-describing file descriptors.
//!
//! Message types, generated or hand-written, implement [`Message`] on top of
//! the per-field helpers in [`codec`] and a static [`schema::MessageSchema`].
//! The [`descriptor`] module decodes embedded `FileDescriptorProto` bytes into
//! a shared, memoized descriptor graph.

#![deny(clippy::as_conversions)]

pub mod codec;
pub mod decoder;
pub mod descriptor;
pub mod error;
pub mod leb128;
pub mod message;
pub mod schema;
pub mod unknown;
pub mod wire;

mod util;

pub use decoder::{DecodeOptions, Decoder};
pub use error::{DecodeError, DecodeErrorKind};
pub use message::{Message, MessageBuilder};
pub use unknown::UnknownFieldSet;
