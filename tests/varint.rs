//! Varint lengths at every 7-bit boundary, checked against the `leb128` crate.

mod common;

use common::Contact;
use protoform::leb128::{decode_varint, encode_varint, encoded_varint_len, MAX_VARINT_LEN};
use protoform::{DecodeErrorKind, Message};

fn reference(value: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    leb128::write::unsigned(&mut buf, value).unwrap();
    buf
}

#[test]
fn test_boundary_lengths() {
    for bits in 0..64u32 {
        let boundary = 1u64 << bits;
        for value in [boundary - 1, boundary, boundary.saturating_add(1)] {
            let mut ours = Vec::new();
            let written = encode_varint(value, &mut ours);
            let expected = reference(value);

            assert_eq!(ours, expected, "value {value:#x}");
            assert_eq!(written, expected.len());
            assert_eq!(encoded_varint_len(value), expected.len());
            assert_eq!(decode_varint(&ours, 0).unwrap(), (value, expected.len()));
        }
    }
    assert_eq!(encoded_varint_len(u64::MAX), MAX_VARINT_LEN);
}

#[test]
fn test_length_steps() {
    let cases = [
        (0u64, 1),
        (127, 1),
        (128, 2),
        (16_383, 2),
        (16_384, 3),
        ((1 << 21) - 1, 3),
        (1 << 21, 4),
        ((1 << 28) - 1, 4),
        (1 << 28, 5),
        ((1 << 35) - 1, 5),
        (1 << 35, 6),
        ((1 << 63) - 1, 9),
        (1 << 63, 10),
    ];
    for (value, len) in cases {
        assert_eq!(encoded_varint_len(value), len, "value {value}");
    }
}

#[test]
fn test_decode_at_offset() {
    let data = [0xff, 0xac, 0x02];
    assert_eq!(decode_varint(&data, 1).unwrap(), (300, 2));
    assert!(decode_varint(&data, 4).is_err());
}

#[test]
fn test_negative_int64_field_is_ten_bytes() {
    let contact = Contact {
        id: -1,
        ..Default::default()
    };
    let bytes = contact.encode_to_vec();
    assert_eq!(bytes.len(), 1 + MAX_VARINT_LEN);
    assert_eq!(Contact::decode(&bytes).unwrap().id, -1);
}

#[test]
fn test_overlong_varint_fails() {
    let mut bytes = vec![0x10];
    bytes.extend([0xff; 11]);
    let err = Contact::decode(&bytes).unwrap_err();
    assert!(matches!(err.kind(), DecodeErrorKind::MalformedVarint { .. }));
}
