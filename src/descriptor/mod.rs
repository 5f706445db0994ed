//! Self-describing descriptor graph.
//!
//! A [`FileDescriptor`] owns a decoded [`FileDescriptorProto`] and shared
//! handles to the descriptors of the files it imports. The borrowed view
//! types ([`MessageDescriptor`], [`FieldDescriptor`], ...) walk that proto and
//! compute fully-qualified names on the way down.

// Descriptor numbers are i32 on the wire and checked before narrowing.
#![allow(clippy::as_conversions)]

pub mod options;
pub mod proto;
pub mod registry;

use std::sync::Arc;

use thiserror::Error;

pub use self::proto::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, MethodDescriptorProto, OneofDescriptorProto,
    ServiceDescriptorProto,
};
pub use self::registry::{global, DescriptorRegistry, EmbeddedFile};

use crate::error::DecodeError;
use crate::message::Message;
use crate::wire::WireType;

/// Errors produced while materializing a [`FileDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error(
        "descriptor for '{file}' not found (required by '{required_by}'); \
         is its embedded descriptor registered?"
    )]
    MissingDescriptor { file: String, required_by: String },
    #[error("failed to decode descriptor '{file}'")]
    Decode {
        file: String,
        #[source]
        source: DecodeError,
    },
    #[error("'{file}' imports {expected:?} but was given {actual:?}")]
    DependencyMismatch {
        file: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[error("'{file}' lists {kind} dependency index {index}, but it has {count} dependencies")]
    InvalidDependencyIndex {
        file: String,
        kind: &'static str,
        index: i32,
        count: usize,
    },
    #[error("dependency cycle through '{file}'")]
    DependencyCycle { file: String },
}

/// Field type enumeration.
/// Corresponds to google.protobuf.FieldDescriptorProto.Type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Type {
    Double = 1,
    Float = 2,
    Int64 = 3,
    Uint64 = 4,
    Int32 = 5,
    Fixed64 = 6,
    Fixed32 = 7,
    Bool = 8,
    String = 9,
    Group = 10,
    Message = 11,
    Bytes = 12,
    Uint32 = 13,
    Enum = 14,
    Sfixed32 = 15,
    Sfixed64 = 16,
    Sint32 = 17,
    Sint64 = 18,
}

impl Type {
    /// Convert from i32.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Double),
            2 => Some(Self::Float),
            3 => Some(Self::Int64),
            4 => Some(Self::Uint64),
            5 => Some(Self::Int32),
            6 => Some(Self::Fixed64),
            7 => Some(Self::Fixed32),
            8 => Some(Self::Bool),
            9 => Some(Self::String),
            10 => Some(Self::Group),
            11 => Some(Self::Message),
            12 => Some(Self::Bytes),
            13 => Some(Self::Uint32),
            14 => Some(Self::Enum),
            15 => Some(Self::Sfixed32),
            16 => Some(Self::Sfixed64),
            17 => Some(Self::Sint32),
            18 => Some(Self::Sint64),
            _ => None,
        }
    }

    /// Wire type a single value of this type is encoded with.
    pub const fn wire_type(self) -> WireType {
        match self {
            Type::Double | Type::Fixed64 | Type::Sfixed64 => WireType::I64,
            Type::Float | Type::Fixed32 | Type::Sfixed32 => WireType::I32,
            Type::Int64
            | Type::Uint64
            | Type::Int32
            | Type::Bool
            | Type::Uint32
            | Type::Enum
            | Type::Sint32
            | Type::Sint64 => WireType::Varint,
            Type::String | Type::Message | Type::Bytes => WireType::Len,
            Type::Group => WireType::SGroup,
        }
    }

    /// Whether a repeated field of this type may use packed encoding.
    pub const fn is_packable(self) -> bool {
        matches!(
            self.wire_type(),
            WireType::Varint | WireType::I32 | WireType::I64
        )
    }
}

/// Field label enumeration.
/// Corresponds to google.protobuf.FieldDescriptorProto.Label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Label {
    Optional = 1,
    Required = 2,
    Repeated = 3,
}

impl Label {
    /// Convert from i32.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Optional),
            2 => Some(Self::Required),
            3 => Some(Self::Repeated),
            _ => None,
        }
    }
}

fn join_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// A decoded `.proto` file together with the files it imports.
#[derive(Debug)]
pub struct FileDescriptor {
    proto: FileDescriptorProto,
    dependencies: Vec<Arc<FileDescriptor>>,
}

impl FileDescriptor {
    /// Creates a descriptor from its proto and its resolved imports.
    ///
    /// `dependencies` must line up with `proto.dependency` by name.
    pub fn new(
        proto: FileDescriptorProto,
        dependencies: Vec<Arc<FileDescriptor>>,
    ) -> Result<Self, DescriptorError> {
        let file = proto.name.clone().unwrap_or_default();

        let matches = proto.dependency.len() == dependencies.len()
            && proto
                .dependency
                .iter()
                .zip(&dependencies)
                .all(|(expected, actual)| expected == actual.name());
        if !matches {
            return Err(DescriptorError::DependencyMismatch {
                file,
                expected: proto.dependency.clone(),
                actual: dependencies.iter().map(|d| d.name().to_string()).collect(),
            });
        }

        let count = dependencies.len();
        for (kind, indexes) in [
            ("public", &proto.public_dependency),
            ("weak", &proto.weak_dependency),
        ] {
            if let Some(&index) = indexes
                .iter()
                .find(|&&i| usize::try_from(i).map_or(true, |i| i >= count))
            {
                return Err(DescriptorError::InvalidDependencyIndex {
                    file,
                    kind,
                    index,
                    count,
                });
            }
        }

        Ok(FileDescriptor {
            proto,
            dependencies,
        })
    }

    /// Decodes a serialized `FileDescriptorProto` and attaches its imports.
    pub fn decode(
        bytes: &[u8],
        dependencies: Vec<Arc<FileDescriptor>>,
    ) -> Result<Self, DescriptorError> {
        let proto = FileDescriptorProto::decode(bytes).map_err(|source| DescriptorError::Decode {
            file: String::from("<unnamed>"),
            source,
        })?;
        Self::new(proto, dependencies)
    }

    pub fn proto(&self) -> &FileDescriptorProto {
        &self.proto
    }

    pub fn name(&self) -> &str {
        self.proto.name.as_deref().unwrap_or("")
    }

    pub fn package(&self) -> &str {
        self.proto.package.as_deref().unwrap_or("")
    }

    /// The declared syntax, files without one are "proto2".
    pub fn syntax(&self) -> &str {
        self.proto.syntax.as_deref().unwrap_or("proto2")
    }

    /// The `Edition` enum value of an editions file, `None` for proto2/proto3.
    pub fn edition(&self) -> Option<i32> {
        self.proto.edition
    }

    /// Imported files, in declaration order.
    pub fn dependencies(&self) -> &[Arc<FileDescriptor>] {
        &self.dependencies
    }

    /// Imported files re-exported with `import public`.
    pub fn public_dependencies(&self) -> impl Iterator<Item = &Arc<FileDescriptor>> {
        self.proto
            .public_dependency
            .iter()
            .filter_map(|&i| usize::try_from(i).ok())
            .filter_map(move |i| self.dependencies.get(i))
    }

    pub fn message_types(&self) -> impl Iterator<Item = MessageDescriptor<'_>> {
        self.proto
            .message_type
            .iter()
            .map(move |proto| MessageDescriptor::new(self, proto, self.package()))
    }

    pub fn enum_types(&self) -> impl Iterator<Item = EnumDescriptor<'_>> {
        self.proto
            .enum_type
            .iter()
            .map(move |proto| EnumDescriptor::new(proto, self.package()))
    }

    pub fn services(&self) -> impl Iterator<Item = ServiceDescriptor<'_>> {
        self.proto
            .service
            .iter()
            .map(move |proto| ServiceDescriptor::new(proto, self.package()))
    }

    /// Extensions declared at file scope.
    pub fn extensions(&self) -> impl Iterator<Item = FieldDescriptor<'_>> {
        self.proto
            .extension
            .iter()
            .map(move |proto| FieldDescriptor::new(proto, self.package()))
    }

    /// Finds a message by fully-qualified name (without a leading dot) in this
    /// file or, transitively, in the files it imports.
    pub fn find_message_type(&self, full_name: &str) -> Option<MessageDescriptor<'_>> {
        fn search<'a>(
            message: MessageDescriptor<'a>,
            full_name: &str,
        ) -> Option<MessageDescriptor<'a>> {
            if message.full_name() == full_name {
                return Some(message);
            }
            if !full_name.starts_with(message.full_name()) {
                return None;
            }
            message
                .nested_types()
                .find_map(|nested| search(nested, full_name))
        }

        self.message_types()
            .find_map(|message| search(message, full_name))
            .or_else(|| {
                self.dependencies
                    .iter()
                    .find_map(|dep| dep.find_message_type(full_name))
            })
    }

    /// Finds a top-level or nested enum by fully-qualified name in this file
    /// or the files it imports.
    pub fn find_enum_type(&self, full_name: &str) -> Option<EnumDescriptor<'_>> {
        fn search<'a>(message: MessageDescriptor<'a>, full_name: &str) -> Option<EnumDescriptor<'a>> {
            message
                .enum_types()
                .find(|e| e.full_name() == full_name)
                .or_else(|| message.nested_types().find_map(|n| search(n, full_name)))
        }

        self.enum_types()
            .find(|e| e.full_name() == full_name)
            .or_else(|| self.message_types().find_map(|m| search(m, full_name)))
            .or_else(|| {
                self.dependencies
                    .iter()
                    .find_map(|dep| dep.find_enum_type(full_name))
            })
    }

    pub fn find_service(&self, full_name: &str) -> Option<ServiceDescriptor<'_>> {
        self.services().find(|s| s.full_name() == full_name)
    }

    /// Re-encodes the underlying `FileDescriptorProto`.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        self.proto.encode_to_vec()
    }
}

/// A message type within a [`FileDescriptor`].
#[derive(Debug, Clone)]
pub struct MessageDescriptor<'a> {
    file: &'a FileDescriptor,
    proto: &'a DescriptorProto,
    full_name: String,
}

impl<'a> MessageDescriptor<'a> {
    fn new(file: &'a FileDescriptor, proto: &'a DescriptorProto, scope: &str) -> Self {
        MessageDescriptor {
            file,
            proto,
            full_name: join_name(scope, proto.name.as_deref().unwrap_or("")),
        }
    }

    pub fn name(&self) -> &'a str {
        self.proto.name.as_deref().unwrap_or("")
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn file(&self) -> &'a FileDescriptor {
        self.file
    }

    pub fn proto(&self) -> &'a DescriptorProto {
        self.proto
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldDescriptor<'a>> + '_ {
        self.proto
            .field
            .iter()
            .map(move |proto| FieldDescriptor::new(proto, &self.full_name))
    }

    pub fn field_by_number(&self, number: u32) -> Option<FieldDescriptor<'a>> {
        self.fields().find(|f| f.number() == number)
    }

    pub fn field_by_name(&self, name: &str) -> Option<FieldDescriptor<'a>> {
        self.fields().find(|f| f.name() == name)
    }

    pub fn oneofs(&self) -> impl Iterator<Item = OneofDescriptor<'a>> + '_ {
        let message = self.proto;
        self.proto
            .oneof_decl
            .iter()
            .enumerate()
            .map(move |(index, proto)| OneofDescriptor {
                message,
                proto,
                index,
                full_name: join_name(&self.full_name, proto.name.as_deref().unwrap_or("")),
            })
    }

    pub fn nested_types(&self) -> impl Iterator<Item = MessageDescriptor<'a>> + '_ {
        self.proto
            .nested_type
            .iter()
            .map(move |proto| MessageDescriptor::new(self.file, proto, &self.full_name))
    }

    pub fn enum_types(&self) -> impl Iterator<Item = EnumDescriptor<'a>> + '_ {
        self.proto
            .enum_type
            .iter()
            .map(move |proto| EnumDescriptor::new(proto, &self.full_name))
    }

    /// Extensions declared inside this message.
    pub fn extensions(&self) -> impl Iterator<Item = FieldDescriptor<'a>> + '_ {
        self.proto
            .extension
            .iter()
            .map(move |proto| FieldDescriptor::new(proto, &self.full_name))
    }

    /// Extension ranges as `(start, end)` pairs, `end` exclusive.
    pub fn extension_ranges(&self) -> impl Iterator<Item = (u32, u32)> + 'a {
        self.proto.extension_range.iter().map(|range| {
            (
                range.start.unwrap_or(0).max(0) as u32,
                range.end.unwrap_or(0).max(0) as u32,
            )
        })
    }

    /// Whether `number` falls within one of the extension ranges.
    pub fn is_extension_number(&self, number: u32) -> bool {
        self.extension_ranges()
            .any(|(start, end)| (start..end).contains(&number))
    }

    pub fn is_map_entry(&self) -> bool {
        self.proto
            .options
            .as_ref()
            .is_some_and(options::MessageOptions::map_entry)
    }
}

/// A field or extension.
#[derive(Debug, Clone)]
pub struct FieldDescriptor<'a> {
    proto: &'a FieldDescriptorProto,
    full_name: String,
}

impl<'a> FieldDescriptor<'a> {
    fn new(proto: &'a FieldDescriptorProto, scope: &str) -> Self {
        FieldDescriptor {
            proto,
            full_name: join_name(scope, proto.name.as_deref().unwrap_or("")),
        }
    }

    pub fn name(&self) -> &'a str {
        self.proto.name.as_deref().unwrap_or("")
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn proto(&self) -> &'a FieldDescriptorProto {
        self.proto
    }

    pub fn number(&self) -> u32 {
        self.proto.number.unwrap_or(0).max(0) as u32
    }

    pub fn label(&self) -> Label {
        self.proto.label()
    }

    pub fn field_type(&self) -> Option<Type> {
        self.proto.field_type()
    }

    /// Fully-qualified name of the message or enum type, with a leading dot.
    pub fn type_name(&self) -> Option<&'a str> {
        self.proto.type_name.as_deref()
    }

    /// For extensions, the fully-qualified name of the extended message.
    pub fn extendee(&self) -> Option<&'a str> {
        self.proto.extendee.as_deref()
    }

    pub fn json_name(&self) -> Option<&'a str> {
        self.proto.json_name.as_deref()
    }

    pub fn wire_type(&self) -> Option<WireType> {
        self.field_type().map(Type::wire_type)
    }

    pub fn is_repeated(&self) -> bool {
        self.label() == Label::Repeated
    }

    /// Whether the field is written packed: repeated, packable, and either
    /// explicitly marked packed or declared in a proto3 file without
    /// `packed = false`.
    pub fn is_packed(&self, syntax: &str) -> bool {
        let packable = self.is_repeated() && self.field_type().is_some_and(Type::is_packable);
        let explicit = self.proto.options.as_ref().and_then(|o| o.packed());
        packable && explicit.unwrap_or(syntax == "proto3")
    }

    pub fn oneof_index(&self) -> Option<usize> {
        self.proto.oneof_index.and_then(|i| usize::try_from(i).ok())
    }

    /// Whether the field is declared with `(protokt.property).non_null`.
    pub fn is_non_null(&self) -> bool {
        self.proto
            .options
            .as_ref()
            .is_some_and(options::FieldOptions::non_null)
    }
}

/// A oneof declared in a message.
#[derive(Debug, Clone)]
pub struct OneofDescriptor<'a> {
    message: &'a DescriptorProto,
    proto: &'a OneofDescriptorProto,
    index: usize,
    full_name: String,
}

impl<'a> OneofDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        self.proto.name.as_deref().unwrap_or("")
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Names of the fields that belong to this oneof.
    pub fn field_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.message
            .field
            .iter()
            .filter(move |f| f.oneof_index.and_then(|i| usize::try_from(i).ok()) == Some(self.index))
            .map(|f| f.name.as_deref().unwrap_or(""))
    }

    /// Whether the oneof is declared with `(protokt.oneof).non_null`.
    pub fn is_non_null(&self) -> bool {
        self.proto
            .options
            .as_ref()
            .is_some_and(options::OneofOptions::non_null)
    }
}

/// An enum type.
#[derive(Debug, Clone)]
pub struct EnumDescriptor<'a> {
    proto: &'a EnumDescriptorProto,
    full_name: String,
}

impl<'a> EnumDescriptor<'a> {
    fn new(proto: &'a EnumDescriptorProto, scope: &str) -> Self {
        EnumDescriptor {
            proto,
            full_name: join_name(scope, proto.name.as_deref().unwrap_or("")),
        }
    }

    pub fn name(&self) -> &'a str {
        self.proto.name.as_deref().unwrap_or("")
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn proto(&self) -> &'a EnumDescriptorProto {
        self.proto
    }

    pub fn values(&self) -> impl Iterator<Item = EnumValueDescriptor<'a>> + 'a {
        self.proto
            .value
            .iter()
            .map(|proto| EnumValueDescriptor { proto })
    }

    /// The first value declared with `number`.
    pub fn value_by_number(&self, number: i32) -> Option<EnumValueDescriptor<'a>> {
        self.values().find(|v| v.number() == number)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EnumValueDescriptor<'a> {
    proto: &'a EnumValueDescriptorProto,
}

impl<'a> EnumValueDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        self.proto.name.as_deref().unwrap_or("")
    }

    pub fn number(&self) -> i32 {
        self.proto.number.unwrap_or(0)
    }
}

/// A service.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor<'a> {
    proto: &'a ServiceDescriptorProto,
    full_name: String,
}

impl<'a> ServiceDescriptor<'a> {
    fn new(proto: &'a ServiceDescriptorProto, scope: &str) -> Self {
        ServiceDescriptor {
            proto,
            full_name: join_name(scope, proto.name.as_deref().unwrap_or("")),
        }
    }

    pub fn name(&self) -> &'a str {
        self.proto.name.as_deref().unwrap_or("")
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn proto(&self) -> &'a ServiceDescriptorProto {
        self.proto
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDescriptor<'a>> + '_ {
        self.proto.method.iter().map(move |proto| MethodDescriptor {
            proto,
            full_name: join_name(&self.full_name, proto.name.as_deref().unwrap_or("")),
        })
    }
}

/// A method of a service.
#[derive(Debug, Clone)]
pub struct MethodDescriptor<'a> {
    proto: &'a MethodDescriptorProto,
    full_name: String,
}

impl<'a> MethodDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        self.proto.name.as_deref().unwrap_or("")
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn input_type(&self) -> &'a str {
        self.proto.input_type.as_deref().unwrap_or("")
    }

    pub fn output_type(&self) -> &'a str {
        self.proto.output_type.as_deref().unwrap_or("")
    }

    pub fn client_streaming(&self) -> bool {
        self.proto.client_streaming.unwrap_or(false)
    }

    pub fn server_streaming(&self) -> bool {
        self.proto.server_streaming.unwrap_or(false)
    }
}
