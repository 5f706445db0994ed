//! Name-keyed store of encoded descriptors, materialized on first use.
//!
//! Each registered file keeps its encoded `FileDescriptorProto` and a
//! [`OnceLock`] holding the materialized [`FileDescriptor`]. Each file is
//! decoded at most once, concurrent first accessors wait for that decode.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use bytes::Bytes;

use super::{DescriptorError, FileDescriptor, FileDescriptorProto};
use crate::message::Message;
use crate::wire::{decode_key, skip_field, split_len_delimited, WireType};

/// `FileDescriptorProto.dependency`
const FILE_DEPENDENCY: u32 = 3;

/// An encoded descriptor compiled into the binary.
///
/// Generated code declares one `static` per `.proto` file:
///
/// ```
/// use protoform::descriptor::EmbeddedFile;
///
/// static EMPTY_PROTO: EmbeddedFile = EmbeddedFile::new(
///     "empty.proto",
///     &[0x0a, 0x0b, b'e', b'm', b'p', b't', b'y', b'.', b'p', b'r', b'o', b't', b'o'],
///     &[],
/// );
///
/// let descriptor = EMPTY_PROTO.descriptor().unwrap();
/// assert_eq!(descriptor.name(), "empty.proto");
/// ```
#[derive(Debug)]
pub struct EmbeddedFile {
    name: &'static str,
    encoded: &'static [u8],
    dependencies: &'static [&'static EmbeddedFile],
}

impl EmbeddedFile {
    pub const fn new(
        name: &'static str,
        encoded: &'static [u8],
        dependencies: &'static [&'static EmbeddedFile],
    ) -> Self {
        EmbeddedFile {
            name,
            encoded,
            dependencies,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn encoded(&self) -> &'static [u8] {
        self.encoded
    }

    pub fn dependencies(&self) -> &'static [&'static EmbeddedFile] {
        self.dependencies
    }

    /// Registers this file with the [`global`] registry and returns its
    /// memoized descriptor.
    pub fn descriptor(&'static self) -> Result<Arc<FileDescriptor>, DescriptorError> {
        let registry = global();
        registry.register(self);
        registry.resolve(self.name)
    }
}

type Resolved = Result<Arc<FileDescriptor>, DescriptorError>;

#[derive(Debug)]
struct Entry {
    encoded: Bytes,
    cell: OnceLock<Resolved>,
}

/// Maps `.proto` file names to their descriptors.
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    entries: Mutex<HashMap<String, Arc<Entry>>>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `file` and, transitively, its dependencies.
    ///
    /// Registering the same name twice is a no-op. If the second registration
    /// carries different bytes the first one is kept.
    pub fn register(&self, file: &'static EmbeddedFile) {
        if self.insert(file.name, Bytes::from_static(file.encoded)) {
            for dependency in file.dependencies {
                self.register(dependency);
            }
        }
    }

    /// Registers a descriptor supplied at runtime.
    pub fn register_encoded(&self, name: impl Into<String>, encoded: impl Into<Bytes>) {
        self.insert_owned(name.into(), encoded.into());
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Resolves the descriptor for `name`, materializing it and its
    /// dependencies on first use.
    ///
    /// Every caller observes the same [`Arc`]. A failure is remembered for
    /// the file it occurred in and does not affect unrelated files.
    pub fn resolve(&self, name: &str) -> Result<Arc<FileDescriptor>, DescriptorError> {
        // Cells are only entered in import order, on an acyclic graph.
        if let Some(file) = self.find_cycle(name, &mut Vec::new(), &mut HashSet::new()) {
            tracing::warn!(file = %file, "descriptor imports itself");
            return Err(DescriptorError::DependencyCycle { file });
        }
        let mut stack = Vec::new();
        self.resolve_inner(name, "<root>", &mut stack)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Entry>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, name: &'static str, encoded: Bytes) -> bool {
        self.insert_owned(name.to_string(), encoded)
    }

    /// Returns true if `name` was newly added.
    fn insert_owned(&self, name: String, encoded: Bytes) -> bool {
        let mut entries = self.lock();
        if let Some(existing) = entries.get(&name) {
            if existing.encoded != encoded {
                tracing::warn!(file = %name, "conflicting descriptor registration ignored");
            }
            return false;
        }
        tracing::debug!(file = %name, len = encoded.len(), "registered descriptor");
        entries.insert(
            name,
            Arc::new(Entry {
                encoded,
                cell: OnceLock::new(),
            }),
        );
        true
    }

    fn entry(&self, name: &str) -> Option<Arc<Entry>> {
        self.lock().get(name).cloned()
    }

    fn resolve_inner(&self, name: &str, required_by: &str, stack: &mut Vec<String>) -> Resolved {
        let entry = self
            .entry(name)
            .ok_or_else(|| DescriptorError::MissingDescriptor {
                file: name.to_string(),
                required_by: required_by.to_string(),
            })?;
        if let Some(resolved) = entry.cell.get() {
            return resolved.clone();
        }
        if stack.iter().any(|file| file == name) {
            return Err(DescriptorError::DependencyCycle {
                file: name.to_string(),
            });
        }

        // Concurrent resolvers of the same file block here until the first
        // one has finished.
        entry
            .cell
            .get_or_init(|| {
                stack.push(name.to_string());
                let materialized = self.materialize(name, &entry.encoded, stack);
                stack.pop();
                match &materialized {
                    Ok(file) => tracing::debug!(
                        file = %name,
                        dependencies = file.dependencies().len(),
                        "materialized descriptor"
                    ),
                    Err(error) => {
                        tracing::warn!(file = %name, %error, "failed to materialize descriptor")
                    }
                }
                materialized
            })
            .clone()
    }

    /// Walks the import graph of files that are not materialized yet and
    /// returns the first file that imports itself, directly or transitively.
    ///
    /// Only dependency names are read, nothing is decoded into messages.
    fn find_cycle(
        &self,
        name: &str,
        path: &mut Vec<String>,
        acyclic: &mut HashSet<String>,
    ) -> Option<String> {
        if path.iter().any(|file| file == name) {
            return Some(name.to_string());
        }
        if acyclic.contains(name) {
            return None;
        }
        let entry = self.entry(name)?;
        if entry.cell.get().is_some() {
            return None;
        }

        path.push(name.to_string());
        for dependency in dependency_names(&entry.encoded) {
            if let Some(file) = self.find_cycle(&dependency, path, acyclic) {
                return Some(file);
            }
        }
        path.pop();
        acyclic.insert(name.to_string());
        None
    }

    fn materialize(&self, name: &str, encoded: &[u8], stack: &mut Vec<String>) -> Resolved {
        let proto =
            FileDescriptorProto::decode(encoded).map_err(|source| DescriptorError::Decode {
                file: name.to_string(),
                source,
            })?;
        let dependencies = proto
            .dependency
            .iter()
            .map(|dependency| self.resolve_inner(dependency, name, stack))
            .collect::<Result<Vec<_>, _>>()?;
        FileDescriptor::new(proto, dependencies).map(Arc::new)
    }
}

/// Reads the `dependency` entries of an encoded `FileDescriptorProto`.
///
/// Stops at the first malformed record, decoding reports that error later.
fn dependency_names(encoded: &[u8]) -> Vec<String> {
    let mut buf = encoded;
    let mut names = Vec::new();
    while !buf.is_empty() {
        let Ok(key) = decode_key(&mut buf) else {
            break;
        };
        if key.tag() == FILE_DEPENDENCY && key.wire_type() == WireType::Len {
            match split_len_delimited(&mut buf) {
                Ok(name) => names.push(String::from_utf8_lossy(name).into_owned()),
                Err(_) => break,
            }
        } else if skip_field(key, &mut buf).is_err() {
            break;
        }
    }
    names
}

/// The process-wide registry used by [`EmbeddedFile::descriptor`].
pub fn global() -> &'static DescriptorRegistry {
    static GLOBAL: OnceLock<DescriptorRegistry> = OnceLock::new();
    GLOBAL.get_or_init(DescriptorRegistry::new)
}
