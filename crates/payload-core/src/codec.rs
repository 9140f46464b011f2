//! Archive codec seam.
//!
//! The archive writer only needs a handful of capabilities from a
//! zip-compatible library: create an empty in-memory archive, wrap bytes as a
//! data source, add a named source, get and set per-entry external
//! attributes, and finalize into a readable, seekable buffer. The production
//! implementation is [`ZipCodec`](crate::zip_codec::ZipCodec); tests plug in
//! codecs that fail on demand.

use crate::errors::CodecError;
use std::io::{Read, Seek};

/// Host system recorded in an entry's "version made by" field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSystem {
    Dos,
    Unix,
    Other(u8),
}

impl HostSystem {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Dos,
            3 => Self::Unix,
            other => Self::Other(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Dos => 0,
            Self::Unix => 3,
            Self::Other(value) => value,
        }
    }
}

/// External attribute word of one entry, tagged by host system.
///
/// For [`HostSystem::Unix`] the upper 16 bits hold the file mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalAttributes {
    pub system: HostSystem,
    pub bits: u32,
}

impl ExternalAttributes {
    pub fn new(system: HostSystem, bits: u32) -> Self {
        Self { system, bits }
    }

    /// UNIX-tagged attributes carrying `mode`.
    pub fn unix(mode: u32) -> Self {
        Self::new(HostSystem::Unix, mode << 16)
    }

    /// File mode, when the attributes are UNIX-tagged.
    pub fn unix_mode(&self) -> Option<u32> {
        (self.system == HostSystem::Unix).then_some(self.bits >> 16)
    }
}

/// Position of an entry inside an archive under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryIndex(pub usize);

/// Entry bytes wrapped as a codec-level data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySource(Vec<u8>);

impl EntrySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Factory for fresh in-memory archives.
pub trait ArchiveCodec {
    type Archive: InMemoryArchive;

    /// Create an empty archive whose buffer is owned by the codec.
    fn create_in_memory(&self) -> Result<Self::Archive, CodecError>;
}

/// An archive being built in memory.
pub trait InMemoryArchive {
    /// Buffer kept alive past [`finalize`](Self::finalize) for read-back.
    type Source: Read + Seek;

    fn wrap_source(&mut self, data: &[u8]) -> Result<EntrySource, CodecError>;

    /// Add `source` under `name`. With `overwrite`, an existing entry of the
    /// same name is replaced and keeps its index.
    fn add(
        &mut self,
        name: &str,
        source: EntrySource,
        overwrite: bool,
    ) -> Result<EntryIndex, CodecError>;

    fn external_attributes(&self, index: EntryIndex) -> Result<ExternalAttributes, CodecError>;

    fn set_external_attributes(
        &mut self,
        index: EntryIndex,
        attributes: ExternalAttributes,
    ) -> Result<(), CodecError>;

    /// Close the archive, writing the central directory, and hand back the
    /// underlying buffer.
    fn finalize(self) -> Result<Self::Source, CodecError>;
}
