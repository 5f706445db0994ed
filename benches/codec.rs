use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use prost::Message as _;
use protoform::leb128::LebCodec;
use protoform::wire::WireType;
use protoform::Message;

fn varint_decoding(c: &mut Criterion) {
    let values: Vec<Vec<u8>> = [1u64, 300, 1 << 28, u64::MAX]
        .into_iter()
        .map(|value| {
            let mut buf = Vec::new();
            value.encode_leb128(&mut buf);
            buf
        })
        .collect();

    let mut group = c.benchmark_group("decoding_varint");
    group.bench_with_input(BenchmarkId::new("prost", values.len()), &values, |b, values| {
        b.iter(|| {
            for value in values {
                let value = prost::encoding::decode_varint(&mut value.as_slice());
                std::hint::black_box(value).unwrap();
            }
        })
    });
    group.bench_with_input(
        BenchmarkId::new("protoform", values.len()),
        &values,
        |b, values| {
            b.iter(|| {
                for value in values {
                    let value = u64::decode_leb128_buf(&mut value.as_slice());
                    std::hint::black_box(value).unwrap();
                }
            })
        },
    );
}

fn key_decoding(c: &mut Criterion) {
    let keys: Vec<Vec<u8>> = [(1u32, WireType::Varint), (43, WireType::I64), (1253, WireType::Len)]
        .into_iter()
        .map(|(tag, wire_type)| {
            let mut buf = Vec::new();
            protoform::wire::encode_key(wire_type, tag, &mut buf);
            buf
        })
        .collect();

    let mut group = c.benchmark_group("decoding_key");
    group.bench_with_input(BenchmarkId::new("prost", keys.len()), &keys, |b, keys| {
        b.iter(|| {
            for key in keys {
                let key = prost::encoding::decode_key(&mut key.as_slice());
                std::hint::black_box(key).unwrap();
            }
        })
    });
    group.bench_with_input(
        BenchmarkId::new("protoform", keys.len()),
        &keys,
        |b, keys| {
            b.iter(|| {
                for key in keys {
                    let key = protoform::wire::decode_key(&mut key.as_slice());
                    std::hint::black_box(key).unwrap();
                }
            })
        },
    );
}

fn descriptor_file() -> prost_types::FileDescriptorProto {
    use prost_types::field_descriptor_proto::{Label, Type};

    let fields: Vec<_> = (1..=32)
        .map(|number| prost_types::FieldDescriptorProto {
            name: Some(format!("field_{number}")),
            number: Some(number),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::Int64 as i32),
            json_name: Some(format!("field{number}")),
            ..Default::default()
        })
        .collect();
    let messages = (0..16)
        .map(|i| prost_types::DescriptorProto {
            name: Some(format!("Message{i}")),
            field: fields.clone(),
            ..Default::default()
        })
        .collect();

    prost_types::FileDescriptorProto {
        name: Some("bench.proto".to_string()),
        package: Some("bench".to_string()),
        message_type: messages,
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

fn descriptor_roundtrip(c: &mut Criterion) {
    let bytes = descriptor_file().encode_to_vec();

    let mut group = c.benchmark_group("descriptor");
    group.throughput(criterion::Throughput::Bytes(bytes.len() as u64));
    group.bench_function("prost_decode", |b| {
        b.iter(|| {
            let file = prost_types::FileDescriptorProto::decode(bytes.as_slice());
            std::hint::black_box(file).unwrap();
        })
    });
    group.bench_function("protoform_decode", |b| {
        b.iter(|| {
            let file = protoform::descriptor::FileDescriptorProto::decode(&bytes);
            std::hint::black_box(file).unwrap();
        })
    });

    let file = protoform::descriptor::FileDescriptorProto::decode(&bytes).unwrap();
    group.bench_function("protoform_encode", |b| {
        b.iter(|| std::hint::black_box(file.encode_to_vec()))
    });
}

criterion_group!(decoding, varint_decoding, key_decoding);
criterion_group!(descriptors, descriptor_roundtrip);

criterion_main!(decoding, descriptors);
