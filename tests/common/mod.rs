//! Hand-written message types shared by the integration tests, laid out the
//! way generated code would be.

#![allow(dead_code)]

use std::collections::HashMap;

use bytes::{BufMut, Bytes};
use protoform::codec::{
    decode_value, encode_field, encode_map, encode_message, encode_oneof, encode_optional,
    encode_optional_message, encode_repeated, encode_repeated_message, encode_scalar, field_len,
    map_len, merge_map_entry, merge_oneof, merge_optional, merge_repeated, merge_scalar,
    message_len, oneof_len, optional_len, optional_message_len, repeated_len,
    repeated_message_len, scalar_len, Fixed64, MapField, ProtoOneof,
};
use protoform::message::{require_field, require_oneof};
use protoform::schema::{FieldInfo, MessageSchema, OneofInfo};
use protoform::wire::WireType;
use protoform::{DecodeError, Decoder, Message, MessageBuilder, UnknownFieldSet};

/// Installs a test-writer subscriber so decoder traces show up in failures.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// ```protobuf
/// message PhoneNumber {
///     string number = 1;
///     int32 kind = 2;
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhoneNumber {
    pub number: String,
    pub kind: i32,
    pub unknown_fields: UnknownFieldSet,
}

impl PhoneNumber {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::singular(1, "number", WireType::Len),
        FieldInfo::singular(2, "kind", WireType::Varint),
    ];

    pub fn new(number: &str, kind: i32) -> Self {
        PhoneNumber {
            number: number.to_string(),
            kind,
            ..Default::default()
        }
    }
}

impl Message for PhoneNumber {
    type Builder = Self;

    fn schema() -> &'static MessageSchema {
        static SCHEMA: MessageSchema =
            MessageSchema::new("test.PhoneNumber", PhoneNumber::FIELDS, &[]);
        &SCHEMA
    }

    fn encode_fields<B: BufMut>(&self, buf: &mut B) {
        encode_scalar(1, &self.number, buf);
        encode_scalar(2, &self.kind, buf);
    }

    fn encoded_fields_len(&self) -> usize {
        scalar_len(1, &self.number) + scalar_len(2, &self.kind)
    }

    fn unknown_fields(&self) -> &UnknownFieldSet {
        &self.unknown_fields
    }

    fn into_builder(self) -> Self {
        self
    }
}

impl MessageBuilder for PhoneNumber {
    type Message = Self;

    fn merge_field(
        &mut self,
        number: u32,
        _wire_type: WireType,
        buf: &mut &[u8],
        _decoder: &mut Decoder,
    ) -> Result<(), DecodeError> {
        match number {
            1 => merge_scalar(&mut self.number, buf),
            2 => merge_scalar(&mut self.kind, buf),
            _ => Err(DecodeError::unhandled_field("test.PhoneNumber", number)),
        }
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet {
        &mut self.unknown_fields
    }

    fn build(self) -> Result<Self, DecodeError> {
        Ok(self)
    }
}

/// ```protobuf
/// oneof handle {
///     string nickname = 7;
///     PhoneNumber primary = 8;
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Handle {
    Nickname(String),
    Primary(PhoneNumber),
}

impl ProtoOneof for Handle {
    fn decode_variant(
        number: u32,
        _wire_type: WireType,
        buf: &mut &[u8],
        decoder: &mut Decoder,
    ) -> Result<Option<Self>, DecodeError> {
        match number {
            7 => Ok(Some(Handle::Nickname(decode_value(buf)?))),
            8 => Ok(Some(Handle::Primary(decoder.decode_nested(buf)?))),
            _ => Ok(None),
        }
    }

    fn encode_variant<B: BufMut>(&self, buf: &mut B) {
        match self {
            Handle::Nickname(value) => encode_field(7, value, buf),
            Handle::Primary(value) => encode_message(8, value, buf),
        }
    }

    fn encoded_variant_len(&self) -> usize {
        match self {
            Handle::Nickname(value) => field_len(7, value),
            Handle::Primary(value) => message_len(8, value),
        }
    }

    fn variant_number(&self) -> u32 {
        match self {
            Handle::Nickname(_) => 7,
            Handle::Primary(_) => 8,
        }
    }
}

/// ```protobuf
/// syntax = "proto3";
///
/// message Contact {
///     string name = 1;
///     int64 id = 2;
///     optional string email = 3;
///     repeated PhoneNumber phones = 4;
///     repeated int32 scores = 5;
///     map<string, int64> counters = 6;
///     oneof handle {
///         string nickname = 7;
///         PhoneNumber primary = 8;
///     }
///     fixed64 checksum = 9;
///     double weight = 10;
///     bytes avatar = 11;
///     repeated string tags = 12;
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub name: String,
    pub id: i64,
    pub email: Option<String>,
    pub phones: Vec<PhoneNumber>,
    pub scores: Vec<i32>,
    pub counters: MapField<String, i64>,
    pub handle: Option<Handle>,
    pub checksum: Fixed64,
    pub weight: f64,
    pub avatar: Bytes,
    pub tags: Vec<String>,
    pub unknown_fields: UnknownFieldSet,
}

impl Contact {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::singular(1, "name", WireType::Len),
        FieldInfo::singular(2, "id", WireType::Varint),
        FieldInfo::optional(3, "email", WireType::Len),
        FieldInfo::repeated(4, "phones", WireType::Len),
        FieldInfo::repeated(5, "scores", WireType::Varint),
        FieldInfo::map(6, "counters"),
        FieldInfo::optional(7, "nickname", WireType::Len).in_oneof(0),
        FieldInfo::optional(8, "primary", WireType::Len).in_oneof(0),
        FieldInfo::singular(9, "checksum", WireType::I64),
        FieldInfo::singular(10, "weight", WireType::I64),
        FieldInfo::singular(11, "avatar", WireType::Len),
        FieldInfo::repeated(12, "tags", WireType::Len),
    ];
    const ONEOFS: &'static [OneofInfo] = &[OneofInfo::new("handle")];

    /// A contact with every field populated.
    pub fn sample() -> Self {
        Contact {
            name: "Ada".to_string(),
            id: 1815,
            email: Some("ada@example.com".to_string()),
            phones: vec![PhoneNumber::new("555-0100", 1), PhoneNumber::new("555-0199", 2)],
            scores: vec![3, 270, 86942, -1],
            counters: [("visits".to_string(), 3)].into_iter().collect(),
            handle: Some(Handle::Primary(PhoneNumber::new("555-0123", 0))),
            checksum: Fixed64(0xdead_beef),
            weight: 61.5,
            avatar: Bytes::from_static(&[0x89, b'P', b'N', b'G']),
            tags: vec!["math".to_string(), "engines".to_string()],
            unknown_fields: UnknownFieldSet::new(),
        }
    }
}

impl Message for Contact {
    type Builder = Self;

    fn schema() -> &'static MessageSchema {
        static SCHEMA: MessageSchema =
            MessageSchema::new("test.Contact", Contact::FIELDS, Contact::ONEOFS);
        &SCHEMA
    }

    fn encode_fields<B: BufMut>(&self, buf: &mut B) {
        encode_scalar(1, &self.name, buf);
        encode_scalar(2, &self.id, buf);
        encode_optional(3, &self.email, buf);
        encode_repeated_message(4, &self.phones, buf);
        encode_repeated(5, &self.scores, true, buf);
        encode_map(6, &self.counters, buf);
        encode_oneof(&self.handle, buf);
        encode_scalar(9, &self.checksum, buf);
        encode_scalar(10, &self.weight, buf);
        encode_scalar(11, &self.avatar, buf);
        encode_repeated(12, &self.tags, false, buf);
    }

    fn encoded_fields_len(&self) -> usize {
        scalar_len(1, &self.name)
            + scalar_len(2, &self.id)
            + optional_len(3, &self.email)
            + repeated_message_len(4, &self.phones)
            + repeated_len(5, &self.scores, true)
            + map_len(6, &self.counters)
            + oneof_len(&self.handle)
            + scalar_len(9, &self.checksum)
            + scalar_len(10, &self.weight)
            + scalar_len(11, &self.avatar)
            + repeated_len(12, &self.tags, false)
    }

    fn unknown_fields(&self) -> &UnknownFieldSet {
        &self.unknown_fields
    }

    fn into_builder(self) -> Self {
        self
    }
}

impl MessageBuilder for Contact {
    type Message = Self;

    fn merge_field(
        &mut self,
        number: u32,
        wire_type: WireType,
        buf: &mut &[u8],
        decoder: &mut Decoder,
    ) -> Result<(), DecodeError> {
        match number {
            1 => merge_scalar(&mut self.name, buf),
            2 => merge_scalar(&mut self.id, buf),
            3 => merge_optional(&mut self.email, buf),
            4 => decoder.merge_repeated_message(&mut self.phones, buf),
            5 => merge_repeated(&mut self.scores, wire_type, buf),
            6 => merge_map_entry(&mut self.counters, buf, decoder),
            7 | 8 => merge_oneof(&mut self.handle, number, wire_type, buf, decoder).map(|_| ()),
            9 => merge_scalar(&mut self.checksum, buf),
            10 => merge_scalar(&mut self.weight, buf),
            11 => merge_scalar(&mut self.avatar, buf),
            12 => merge_repeated(&mut self.tags, wire_type, buf),
            _ => Err(DecodeError::unhandled_field("test.Contact", number)),
        }
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet {
        &mut self.unknown_fields
    }

    fn build(self) -> Result<Self, DecodeError> {
        Ok(self)
    }
}

/// An older revision of [`Contact`] that only knows its first two fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactV1 {
    pub name: String,
    pub id: i64,
    pub unknown_fields: UnknownFieldSet,
}

impl ContactV1 {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::singular(1, "name", WireType::Len),
        FieldInfo::singular(2, "id", WireType::Varint),
    ];
}

impl Message for ContactV1 {
    type Builder = Self;

    fn schema() -> &'static MessageSchema {
        static SCHEMA: MessageSchema = MessageSchema::new("test.Contact", ContactV1::FIELDS, &[]);
        &SCHEMA
    }

    fn encode_fields<B: BufMut>(&self, buf: &mut B) {
        encode_scalar(1, &self.name, buf);
        encode_scalar(2, &self.id, buf);
    }

    fn encoded_fields_len(&self) -> usize {
        scalar_len(1, &self.name) + scalar_len(2, &self.id)
    }

    fn unknown_fields(&self) -> &UnknownFieldSet {
        &self.unknown_fields
    }

    fn into_builder(self) -> Self {
        self
    }
}

impl MessageBuilder for ContactV1 {
    type Message = Self;

    fn merge_field(
        &mut self,
        number: u32,
        _wire_type: WireType,
        buf: &mut &[u8],
        _decoder: &mut Decoder,
    ) -> Result<(), DecodeError> {
        match number {
            1 => merge_scalar(&mut self.name, buf),
            2 => merge_scalar(&mut self.id, buf),
            _ => Err(DecodeError::unhandled_field("test.Contact", number)),
        }
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet {
        &mut self.unknown_fields
    }

    fn build(self) -> Result<Self, DecodeError> {
        Ok(self)
    }
}

/// ```protobuf
/// message Card {
///     PhoneNumber phone = 1;
///     repeated Card children = 2;
///     map<string, PhoneNumber> directory = 3;
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Card {
    pub phone: Option<PhoneNumber>,
    pub children: Vec<Card>,
    pub directory: HashMap<String, Option<PhoneNumber>>,
    pub unknown_fields: UnknownFieldSet,
}

impl Card {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::optional(1, "phone", WireType::Len),
        FieldInfo::repeated(2, "children", WireType::Len),
        FieldInfo::map(3, "directory"),
    ];

    /// A chain of `depth` cards, each nested in the previous one.
    pub fn nested(depth: usize) -> Self {
        let mut card = Card::default();
        for _ in 0..depth {
            card = Card {
                children: vec![card],
                ..Default::default()
            };
        }
        card
    }
}

impl Message for Card {
    type Builder = Self;

    fn schema() -> &'static MessageSchema {
        static SCHEMA: MessageSchema = MessageSchema::new("test.Card", Card::FIELDS, &[]);
        &SCHEMA
    }

    fn encode_fields<B: BufMut>(&self, buf: &mut B) {
        encode_optional_message(1, &self.phone, buf);
        encode_repeated_message(2, &self.children, buf);
        encode_map(3, &self.directory, buf);
    }

    fn encoded_fields_len(&self) -> usize {
        optional_message_len(1, &self.phone)
            + repeated_message_len(2, &self.children)
            + map_len(3, &self.directory)
    }

    fn unknown_fields(&self) -> &UnknownFieldSet {
        &self.unknown_fields
    }

    fn into_builder(self) -> Self {
        self
    }
}

impl MessageBuilder for Card {
    type Message = Self;

    fn merge_field(
        &mut self,
        number: u32,
        _wire_type: WireType,
        buf: &mut &[u8],
        decoder: &mut Decoder,
    ) -> Result<(), DecodeError> {
        match number {
            1 => decoder.merge_message(&mut self.phone, buf),
            2 => decoder.merge_repeated_message(&mut self.children, buf),
            3 => merge_map_entry(&mut self.directory, buf, decoder),
            _ => Err(DecodeError::unhandled_field("test.Card", number)),
        }
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet {
        &mut self.unknown_fields
    }

    fn build(self) -> Result<Self, DecodeError> {
        Ok(self)
    }
}

/// ```protobuf
/// oneof credential {
///     option (protokt.oneof).non_null = true;
///     string token = 3;
///     int32 pin = 4;
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    Token(String),
    Pin(i32),
}

impl ProtoOneof for Credential {
    fn decode_variant(
        number: u32,
        _wire_type: WireType,
        buf: &mut &[u8],
        _decoder: &mut Decoder,
    ) -> Result<Option<Self>, DecodeError> {
        match number {
            3 => Ok(Some(Credential::Token(decode_value(buf)?))),
            4 => Ok(Some(Credential::Pin(decode_value(buf)?))),
            _ => Ok(None),
        }
    }

    fn encode_variant<B: BufMut>(&self, buf: &mut B) {
        match self {
            Credential::Token(value) => encode_field(3, value, buf),
            Credential::Pin(value) => encode_field(4, value, buf),
        }
    }

    fn encoded_variant_len(&self) -> usize {
        match self {
            Credential::Token(value) => field_len(3, value),
            Credential::Pin(value) => field_len(4, value),
        }
    }

    fn variant_number(&self) -> u32 {
        match self {
            Credential::Token(_) => 3,
            Credential::Pin(_) => 4,
        }
    }
}

/// ```protobuf
/// message Account {
///     string id = 1 [(protokt.property).non_null = true];
///     optional string note = 2;
///     oneof credential {
///         option (protokt.oneof).non_null = true;
///         string token = 3;
///         int32 pin = 4;
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub note: Option<String>,
    pub credential: Credential,
    pub unknown_fields: UnknownFieldSet,
}

impl Account {
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::optional(1, "id", WireType::Len).non_null(),
        FieldInfo::optional(2, "note", WireType::Len),
        FieldInfo::optional(3, "token", WireType::Len).in_oneof(0),
        FieldInfo::optional(4, "pin", WireType::Varint).in_oneof(0),
    ];
    const ONEOFS: &'static [OneofInfo] = &[OneofInfo::new("credential").non_null()];
}

#[derive(Debug, Default)]
pub struct AccountBuilder {
    id: Option<String>,
    note: Option<String>,
    credential: Option<Credential>,
    unknown_fields: UnknownFieldSet,
}

impl Message for Account {
    type Builder = AccountBuilder;

    fn schema() -> &'static MessageSchema {
        static SCHEMA: MessageSchema =
            MessageSchema::new("test.Account", Account::FIELDS, Account::ONEOFS);
        &SCHEMA
    }

    fn encode_fields<B: BufMut>(&self, buf: &mut B) {
        encode_field(1, &self.id, buf);
        encode_optional(2, &self.note, buf);
        self.credential.encode_variant(buf);
    }

    fn encoded_fields_len(&self) -> usize {
        field_len(1, &self.id) + optional_len(2, &self.note) + self.credential.encoded_variant_len()
    }

    fn unknown_fields(&self) -> &UnknownFieldSet {
        &self.unknown_fields
    }

    fn into_builder(self) -> AccountBuilder {
        AccountBuilder {
            id: Some(self.id),
            note: self.note,
            credential: Some(self.credential),
            unknown_fields: self.unknown_fields,
        }
    }
}

impl MessageBuilder for AccountBuilder {
    type Message = Account;

    fn merge_field(
        &mut self,
        number: u32,
        wire_type: WireType,
        buf: &mut &[u8],
        decoder: &mut Decoder,
    ) -> Result<(), DecodeError> {
        match number {
            1 => merge_optional(&mut self.id, buf),
            2 => merge_optional(&mut self.note, buf),
            3 | 4 => merge_oneof(&mut self.credential, number, wire_type, buf, decoder).map(|_| ()),
            _ => Err(DecodeError::unhandled_field("test.Account", number)),
        }
    }

    fn has_field(&self, number: u32) -> bool {
        match number {
            1 => self.id.is_some(),
            2 => self.note.is_some(),
            3 | 4 => self
                .credential
                .as_ref()
                .is_some_and(|c| c.variant_number() == number),
            _ => false,
        }
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet {
        &mut self.unknown_fields
    }

    fn build(self) -> Result<Account, DecodeError> {
        let schema = Account::schema();
        Ok(Account {
            id: require_field(self.id, schema, "id")?,
            note: self.note,
            credential: require_oneof(self.credential, schema, "credential")?,
            unknown_fields: self.unknown_fields,
        })
    }
}

/// The same shapes as [`PhoneNumber`] and [`Contact`], derived with prost.
pub mod prost_model {
    use std::collections::HashMap;

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct PhoneNumber {
        #[prost(string, tag = "1")]
        pub number: String,
        #[prost(int32, tag = "2")]
        pub kind: i32,
    }

    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Handle {
        #[prost(string, tag = "7")]
        Nickname(String),
        #[prost(message, tag = "8")]
        Primary(PhoneNumber),
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Contact {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(int64, tag = "2")]
        pub id: i64,
        #[prost(string, optional, tag = "3")]
        pub email: Option<String>,
        #[prost(message, repeated, tag = "4")]
        pub phones: Vec<PhoneNumber>,
        #[prost(int32, repeated, packed = "true", tag = "5")]
        pub scores: Vec<i32>,
        #[prost(map = "string, int64", tag = "6")]
        pub counters: HashMap<String, i64>,
        #[prost(oneof = "Handle", tags = "7, 8")]
        pub handle: Option<Handle>,
        #[prost(fixed64, tag = "9")]
        pub checksum: u64,
        #[prost(double, tag = "10")]
        pub weight: f64,
        #[prost(bytes = "vec", tag = "11")]
        pub avatar: Vec<u8>,
        #[prost(string, repeated, tag = "12")]
        pub tags: Vec<String>,
    }

    /// Same as [`Contact::scores`] but written unpacked.
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct UnpackedScores {
        #[prost(int32, repeated, packed = "false", tag = "5")]
        pub scores: Vec<i32>,
    }

    impl From<&super::PhoneNumber> for PhoneNumber {
        fn from(phone: &super::PhoneNumber) -> Self {
            PhoneNumber {
                number: phone.number.clone(),
                kind: phone.kind,
            }
        }
    }

    impl From<&super::Contact> for Contact {
        fn from(contact: &super::Contact) -> Self {
            Contact {
                name: contact.name.clone(),
                id: contact.id,
                email: contact.email.clone(),
                phones: contact.phones.iter().map(PhoneNumber::from).collect(),
                scores: contact.scores.clone(),
                counters: contact
                    .counters
                    .iter()
                    .map(|(k, v)| (k.clone(), *v))
                    .collect(),
                handle: contact.handle.as_ref().map(|handle| match handle {
                    super::Handle::Nickname(nickname) => Handle::Nickname(nickname.clone()),
                    super::Handle::Primary(phone) => Handle::Primary(phone.into()),
                }),
                checksum: contact.checksum.0,
                weight: contact.weight,
                avatar: contact.avatar.to_vec(),
                tags: contact.tags.clone(),
            }
        }
    }
}
