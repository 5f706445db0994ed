//! Protobuf map field support.
//!
//! Maps in protobuf are syntactic sugar for `repeated Entry { K key = 1; V value = 2; }`.
//! Each map entry is encoded as a length-delimited record with two fields.
//!
//! # Wire Format
//!
//! ```text
//! [field_tag, LEN] [entry_len] [key_tag=1, key_wire] [key_value] [value_tag=2, value_wire] [value_value]
//! ```
//!
//! # Valid Key Types
//!
//! Per protobuf, valid key types are: integral types, bool, string.
//! NOT valid: float, double, bytes, enum, messages.

// Entry lengths always fit in a u64.
#![allow(clippy::as_conversions)]

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use bytes::{BufMut, Bytes};

use super::message::{delimited_message_len, encode_delimited_message};
use super::{Fixed32, Fixed64, Sfixed32, Sfixed64, Sint32, Sint64};
use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::message::Message;
use crate::wire::{decode_key, encode_key, encoded_key_len, skip_field, split_len_delimited};
use crate::wire::WireType;

const KEY_NUMBER: u32 = 1;
const VALUE_NUMBER: u32 = 2;

/// Marker trait for types that can be used as protobuf map keys.
pub trait ProtoMapKey: ProtoDecode + ProtoEncode + Clone + Eq + Hash {}

impl ProtoMapKey for i32 {}
impl ProtoMapKey for i64 {}
impl ProtoMapKey for u32 {}
impl ProtoMapKey for u64 {}
impl ProtoMapKey for bool {}
impl ProtoMapKey for Sint32 {}
impl ProtoMapKey for Sint64 {}
impl ProtoMapKey for Fixed32 {}
impl ProtoMapKey for Fixed64 {}
impl ProtoMapKey for Sfixed32 {}
impl ProtoMapKey for Sfixed64 {}
impl ProtoMapKey for String {}

/// A type that can be stored as the value of a map entry.
pub trait MapValue: Sized {
    const WIRE_TYPE: WireType;

    /// Value used when an entry carries no value field.
    fn empty() -> Self;

    fn merge_value(dst: &mut Self, buf: &mut &[u8], decoder: &mut Decoder)
        -> Result<(), DecodeError>;

    fn encode_value<B: BufMut>(&self, buf: &mut B);

    fn encoded_value_len(&self) -> usize;
}

macro_rules! scalar_map_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl MapValue for $ty {
                const WIRE_TYPE: WireType = <$ty as ProtoType>::WIRE_TYPE;

                #[inline]
                fn empty() -> Self {
                    <$ty>::default()
                }

                #[inline]
                fn merge_value(
                    dst: &mut Self,
                    buf: &mut &[u8],
                    _decoder: &mut Decoder,
                ) -> Result<(), DecodeError> {
                    <$ty as ProtoDecode>::decode_into(buf, dst)
                }

                #[inline]
                fn encode_value<B: BufMut>(&self, buf: &mut B) {
                    ProtoEncode::encode(self, buf);
                }

                #[inline]
                fn encoded_value_len(&self) -> usize {
                    ProtoEncode::encoded_len(self)
                }
            }
        )*
    };
}

scalar_map_value!(
    u32, u64, i32, i64, bool, f32, f64, Sint32, Sint64, Fixed32, Fixed64, Sfixed32, Sfixed64,
    String, Vec<u8>, Bytes,
);

/// Message-valued entries. An absent value is written as an empty message.
impl<M: Message> MapValue for Option<M> {
    const WIRE_TYPE: WireType = WireType::Len;

    fn empty() -> Self {
        None
    }

    fn merge_value(
        dst: &mut Self,
        buf: &mut &[u8],
        decoder: &mut Decoder,
    ) -> Result<(), DecodeError> {
        decoder.merge_message(dst, buf)
    }

    fn encode_value<B: BufMut>(&self, buf: &mut B) {
        match self {
            Some(msg) => encode_delimited_message(msg, buf),
            None => buf.put_u8(0),
        }
    }

    fn encoded_value_len(&self) -> usize {
        self.as_ref().map_or(1, delimited_message_len)
    }
}

/// Trait for protobuf map fields.
///
/// Provides a unified interface over [`MapField`], `BTreeMap` and `HashMap`.
pub trait ProtoMap: Default {
    type Key: ProtoMapKey;
    type Value: MapValue;

    /// Inserts an entry, replacing the value of an existing key.
    fn insert_entry(&mut self, key: Self::Key, value: Self::Value);

    /// Entries in the order they are encoded.
    fn entries(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;

    /// Returns the number of entries in the map.
    fn map_len(&self) -> usize;
}

/// A map that iterates in first-insertion order.
///
/// Re-inserting a key replaces its value but keeps its original position.
#[derive(Debug, Clone)]
pub struct MapField<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> Default for MapField<K, V> {
    fn default() -> Self {
        MapField {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> MapField<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key`, returning the previous value if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for MapField<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq, V: Eq> Eq for MapField<K, V> {}

impl<K: Eq + Hash + Clone, V> FromIterator<(K, V)> for MapField<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = MapField::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K: ProtoMapKey, V: MapValue> ProtoMap for MapField<K, V> {
    type Key = K;
    type Value = V;

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    fn map_len(&self) -> usize {
        self.len()
    }
}

impl<K: ProtoMapKey + Ord, V: MapValue> ProtoMap for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    fn map_len(&self) -> usize {
        self.len()
    }
}

impl<K: ProtoMapKey, V: MapValue, S: BuildHasher + Default> ProtoMap for HashMap<K, V, S> {
    type Key = K;
    type Value = V;

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    fn map_len(&self) -> usize {
        self.len()
    }
}

#[inline]
fn entry_len<K: ProtoMapKey, V: MapValue>(key: &K, value: &V) -> usize {
    encoded_key_len(KEY_NUMBER)
        + key.encoded_len()
        + encoded_key_len(VALUE_NUMBER)
        + value.encoded_value_len()
}

/// Writes every entry of `map` as field `number`.
///
/// Both key and value are always written, even when they hold defaults.
pub fn encode_map<M: ProtoMap, B: BufMut>(number: u32, map: &M, buf: &mut B) {
    for (key, value) in map.entries() {
        encode_key(WireType::Len, number, buf);
        (entry_len(key, value) as u64).encode_leb128(buf);
        encode_key(<M::Key as ProtoType>::WIRE_TYPE, KEY_NUMBER, buf);
        key.encode(buf);
        encode_key(<M::Value as MapValue>::WIRE_TYPE, VALUE_NUMBER, buf);
        value.encode_value(buf);
    }
}

/// Encoded length of [`encode_map`].
pub fn map_len<M: ProtoMap>(number: u32, map: &M) -> usize {
    map.entries()
        .map(|(key, value)| {
            let len = entry_len(key, value);
            encoded_key_len(number) + (len as u64).encoded_leb128_len() + len
        })
        .sum()
}

/// Decodes one map entry and inserts it, later duplicates win.
///
/// A missing key or value takes its default. Entry fields with an unexpected
/// number or wire type are skipped.
pub fn merge_map_entry<M: ProtoMap>(
    dst: &mut M,
    buf: &mut &[u8],
    decoder: &mut Decoder,
) -> Result<(), DecodeError> {
    let mut entry = split_len_delimited(buf)?;
    let mut key = M::Key::default();
    let mut value = M::Value::empty();

    while !entry.is_empty() {
        let entry_key = decode_key(&mut entry)?;
        match entry_key.into_parts() {
            (wire_type, KEY_NUMBER) if wire_type == <M::Key as ProtoType>::WIRE_TYPE => {
                M::Key::decode_into(&mut entry, &mut key)?;
            }
            (wire_type, VALUE_NUMBER) if wire_type == <M::Value as MapValue>::WIRE_TYPE => {
                M::Value::merge_value(&mut value, &mut entry, decoder)?;
            }
            _ => skip_field(entry_key, &mut entry)?,
        }
    }

    dst.insert_entry(key, value);
    Ok(())
}
