//! [`ArchiveCodec`] backed by the `zip` crate.
//!
//! `zip::ZipWriter` streams entries and fixes their attributes at
//! `start_file`, so entries are staged in memory until [`finalize`] and
//! attributes stay editable until then. All entries carry the 1980-01-01
//! DOS epoch as their timestamp; identical inputs give identical bytes.
//!
//! [`finalize`]: InMemoryArchive::finalize

use crate::codec::{
    ArchiveCodec, EntryIndex, EntrySource, ExternalAttributes, InMemoryArchive,
};
use crate::config::Compression;
use crate::errors::CodecError;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Mode of freshly added entries: regular file, read/write for everyone.
pub const DEFAULT_ENTRY_MODE: u32 = 0o100666;

#[derive(Debug, Clone, Default)]
pub struct ZipCodec {
    compression: Compression,
    initial_capacity: usize,
}

impl ZipCodec {
    pub fn new(compression: Compression) -> Self {
        Self {
            compression,
            initial_capacity: 0,
        }
    }

    /// Reserve `bytes` for the archive buffer up front.
    pub fn with_initial_capacity(mut self, bytes: usize) -> Self {
        self.initial_capacity = bytes;
        self
    }
}

impl ArchiveCodec for ZipCodec {
    type Archive = ZipBuild;

    fn create_in_memory(&self) -> Result<ZipBuild, CodecError> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(self.initial_capacity)
            .map_err(|e| CodecError::Allocation(e.to_string()))?;

        Ok(ZipBuild {
            buffer,
            method: match self.compression {
                Compression::Stored => CompressionMethod::Stored,
                Compression::Deflated => CompressionMethod::Deflated,
            },
            entries: Vec::new(),
            by_name: HashMap::new(),
        })
    }
}

#[derive(Debug)]
struct StagedEntry {
    name: String,
    data: Vec<u8>,
    attributes: ExternalAttributes,
}

/// Zip archive under construction.
#[derive(Debug)]
pub struct ZipBuild {
    buffer: Vec<u8>,
    method: CompressionMethod,
    entries: Vec<StagedEntry>,
    by_name: HashMap<String, usize>,
}

impl ZipBuild {
    fn entry(&self, index: EntryIndex) -> Result<&StagedEntry, CodecError> {
        self.entries
            .get(index.0)
            .ok_or(CodecError::UnknownEntry(index.0))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl InMemoryArchive for ZipBuild {
    type Source = Cursor<Vec<u8>>;

    fn wrap_source(&mut self, data: &[u8]) -> Result<EntrySource, CodecError> {
        let mut owned = Vec::new();
        owned
            .try_reserve_exact(data.len())
            .map_err(|e| CodecError::Source(e.to_string()))?;
        owned.extend_from_slice(data);
        Ok(EntrySource::new(owned))
    }

    fn add(
        &mut self,
        name: &str,
        source: EntrySource,
        overwrite: bool,
    ) -> Result<EntryIndex, CodecError> {
        if name.is_empty() {
            return Err(CodecError::Add {
                name: name.to_string(),
                reason: "empty entry name".into(),
            });
        }

        let fresh = StagedEntry {
            name: name.to_string(),
            data: source.into_bytes(),
            attributes: ExternalAttributes::unix(DEFAULT_ENTRY_MODE),
        };

        if let Some(&index) = self.by_name.get(name) {
            if !overwrite {
                return Err(CodecError::EntryExists {
                    name: name.to_string(),
                });
            }
            self.entries[index] = fresh;
            return Ok(EntryIndex(index));
        }

        let index = self.entries.len();
        self.by_name.insert(fresh.name.clone(), index);
        self.entries.push(fresh);
        Ok(EntryIndex(index))
    }

    fn external_attributes(&self, index: EntryIndex) -> Result<ExternalAttributes, CodecError> {
        Ok(self.entry(index)?.attributes)
    }

    fn set_external_attributes(
        &mut self,
        index: EntryIndex,
        attributes: ExternalAttributes,
    ) -> Result<(), CodecError> {
        let entry = self
            .entries
            .get_mut(index.0)
            .ok_or(CodecError::UnknownEntry(index.0))?;
        entry.attributes = attributes;
        Ok(())
    }

    fn finalize(self) -> Result<Cursor<Vec<u8>>, CodecError> {
        let mut writer = ZipWriter::new(Cursor::new(self.buffer));

        for entry in &self.entries {
            let options = entry_options(self.method, entry.attributes);
            writer
                .start_file(entry.name.as_str(), options)
                .map_err(|e| CodecError::Finalize(format!("{}: {e}", entry.name)))?;
            writer.write_all(&entry.data)?;
        }

        writer
            .finish()
            .map_err(|e| CodecError::Finalize(e.to_string()))
    }
}

fn entry_options(method: CompressionMethod, attributes: ExternalAttributes) -> SimpleFileOptions {
    let options = SimpleFileOptions::default()
        .compression_method(method)
        .last_modified_time(DateTime::default());
    // The zip writer only records UNIX modes; other host systems keep its defaults.
    match attributes.unix_mode() {
        Some(mode) => options.unix_permissions(mode),
        None => options,
    }
}
