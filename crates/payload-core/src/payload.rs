//! The payload: a [`FileStore`] plus the configuration that decides how it
//! is serialized.

use crate::archive::{ArchiveReport, ArchiveWriter};
use crate::config::{OutputFormat, PayloadConfig};
use crate::errors::{ArchiveError, PayloadError};
use crate::path::PathKey;
use crate::plain::{self, DirectoryReport};
use crate::store::{FileHandle, FileStore};
use crate::zip_codec::ZipCodec;
use std::io::{self, Write};
use std::path::Path;

/// What [`Payload::write`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Archive(ArchiveReport),
    Plain,
}

/// In-memory file collection populated by producers and serialized once at
/// the end of a run.
///
/// # Example
///
/// ```
/// use payload_core::Payload;
///
/// let payload = Payload::with_prefix("out/");
/// payload.get_file("a.txt").set("hello");
/// payload.get_file("b.txt").set("world\n");
///
/// let mut zip = Vec::new();
/// let report = payload.write_zip(&mut zip).unwrap();
/// assert_eq!(report.entries.len(), 3);
/// ```
#[derive(Debug)]
pub struct Payload {
    store: FileStore,
    config: PayloadConfig,
}

impl Payload {
    pub fn new(config: PayloadConfig) -> Self {
        Self {
            store: FileStore::new(config.prefix.clone()),
            config,
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::new(PayloadConfig::with_prefix(prefix))
    }

    pub fn config(&self) -> &PayloadConfig {
        &self.config
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn prefix(&self) -> &str {
        self.store.prefix()
    }

    /// Content slot for `prefix + name`, created empty on first use.
    pub fn get_file(&self, name: impl AsRef<str>) -> FileHandle {
        self.store.get_or_create(name)
    }

    pub fn ordered_file_names(&self) -> Vec<PathKey> {
        self.store.ordered_keys()
    }

    /// Zip writer for the configured compression, version and policy. The
    /// archive buffer is pre-sized to the payload's current content.
    pub fn archive_writer(&self) -> ArchiveWriter<ZipCodec> {
        let codec = ZipCodec::new(self.config.compression)
            .with_initial_capacity(self.store.content_len());
        ArchiveWriter::new(codec, &self.config.version).with_policy(self.config.entry_policy)
    }

    /// Serialize with the configured default format.
    pub fn write<W: Write + ?Sized>(&self, sink: &mut W) -> Result<WriteOutcome, PayloadError> {
        match self.config.format {
            OutputFormat::Zip => Ok(WriteOutcome::Archive(self.write_zip(sink)?)),
            OutputFormat::Plain => {
                self.write_plain(sink)?;
                Ok(WriteOutcome::Plain)
            }
        }
    }

    pub fn write_zip<W: Write + ?Sized>(&self, sink: &mut W) -> Result<ArchiveReport, ArchiveError> {
        self.archive_writer().write_archive(&self.store, sink)
    }

    pub fn write_plain<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        plain::write_to_stream(&self.store, sink)
    }

    pub fn write_plain_dir(&self, root: &Path) -> DirectoryReport {
        plain::write_to_directory(&self.store, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntryPolicy;

    #[test]
    fn write_dispatches_on_configured_format() {
        let payload = Payload::new(PayloadConfig {
            prefix: "p/".into(),
            format: OutputFormat::Plain,
            ..PayloadConfig::default()
        });
        payload.get_file("x").set("y");

        let mut out = Vec::new();
        assert_eq!(payload.write(&mut out).unwrap(), WriteOutcome::Plain);
        assert!(String::from_utf8(out).unwrap().contains("File: p/x\ny\n"));
    }

    #[test]
    fn archive_writer_follows_config() {
        let payload = Payload::new(PayloadConfig {
            version: "0.0.1-test".into(),
            entry_policy: EntryPolicy::Strict,
            ..PayloadConfig::default()
        });
        let writer = payload.archive_writer();
        assert_eq!(writer.version(), "0.0.1-test");
        assert_eq!(writer.policy(), EntryPolicy::Strict);
    }

    #[test]
    fn archive_writer_presizes_to_content() {
        let payload = Payload::with_prefix("out/");
        payload.get_file("big.bin").set(vec![7u8; 4096]);
        let mut zip = Vec::new();
        let report = payload.write_zip(&mut zip).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.bytes, zip.len() as u64);
    }

    #[test]
    fn get_file_uses_prefix() {
        let payload = Payload::with_prefix("out/");
        payload.get_file("a.txt");
        assert_eq!(payload.ordered_file_names(), vec![PathKey::from_full("out/a.txt")]);
    }
}
