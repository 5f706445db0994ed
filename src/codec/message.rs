//! Embedded message fields.
//!
//! Decoding lives on [`Decoder`](crate::decoder::Decoder) since it needs the
//! recursion depth; this module only covers the encode side.

// Message lengths always fit in a u64.
#![allow(clippy::as_conversions)]

use bytes::BufMut;

use crate::leb128::LebCodec;
use crate::message::Message;
use crate::wire::{encode_key, encoded_key_len, WireType};

/// Length of a message's payload including its length prefix.
#[inline]
pub(crate) fn delimited_message_len<M: Message>(msg: &M) -> usize {
    let len = msg.encoded_len();
    (len as u64).encoded_leb128_len() + len
}

/// Writes a message's payload preceded by its length.
#[inline]
pub(crate) fn encode_delimited_message<M: Message, B: BufMut>(msg: &M, buf: &mut B) {
    (msg.encoded_len() as u64).encode_leb128(buf);
    msg.encode(buf);
}

/// Writes `msg` as field `number`.
#[inline]
pub fn encode_message<M: Message, B: BufMut>(number: u32, msg: &M, buf: &mut B) {
    encode_key(WireType::Len, number, buf);
    encode_delimited_message(msg, buf);
}

/// Encoded length of [`encode_message`].
#[inline]
pub fn message_len<M: Message>(number: u32, msg: &M) -> usize {
    encoded_key_len(number) + delimited_message_len(msg)
}

/// Writes a singular message field when it is set.
#[inline]
pub fn encode_optional_message<M: Message, B: BufMut>(number: u32, msg: &Option<M>, buf: &mut B) {
    if let Some(msg) = msg {
        encode_message(number, msg, buf);
    }
}

#[inline]
pub fn optional_message_len<M: Message>(number: u32, msg: &Option<M>) -> usize {
    msg.as_ref().map_or(0, |msg| message_len(number, msg))
}

/// Writes every element of a repeated message field.
pub fn encode_repeated_message<M: Message, B: BufMut>(number: u32, msgs: &[M], buf: &mut B) {
    for msg in msgs {
        encode_message(number, msg, buf);
    }
}

pub fn repeated_message_len<M: Message>(number: u32, msgs: &[M]) -> usize {
    msgs.iter().map(|msg| message_len(number, msg)).sum()
}
