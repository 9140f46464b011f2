//! Error types for archive, codec, and configuration operations.

use crate::archive::OmittedEntry;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by an [`ArchiveCodec`](crate::codec::ArchiveCodec).
#[derive(Debug, Error)]
pub enum CodecError {
    /// The codec could not allocate its in-memory buffer.
    #[error("cannot allocate archive buffer: {0}")]
    Allocation(String),

    /// Entry bytes could not be wrapped as a data source.
    #[error("cannot create data source: {0}")]
    Source(String),

    /// An entry with this name exists and overwrite was not requested.
    #[error("entry already exists: {name}")]
    EntryExists { name: String },

    #[error("cannot add entry {name}: {reason}")]
    Add { name: String, reason: String },

    #[error("no entry at index {0}")]
    UnknownEntry(usize),

    /// Writing the central directory failed.
    #[error("cannot finalize archive: {0}")]
    Finalize(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal failure of [`ArchiveWriter::write_archive`](crate::archive::ArchiveWriter::write_archive).
///
/// When any of these is returned, nothing has been written to the sink.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("cannot serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("cannot create in-memory archive: {0}")]
    Create(#[source] CodecError),

    #[error("problem closing zip archive: {0}")]
    Finalize(#[source] CodecError),

    #[error("cannot read back finalized archive: {0}")]
    ReadBack(#[source] std::io::Error),

    #[error("unable to allocate {bytes} byte output buffer for archive")]
    Allocation { bytes: u64 },

    /// Strict policy only: at least one entry could not be added.
    #[error("{} entries omitted from archive", .omitted.len())]
    EntriesOmitted { omitted: Vec<OmittedEntry> },

    #[error("cannot write archive to sink: {0}")]
    Sink(#[source] std::io::Error),
}

impl ArchiveError {
    /// True for failures inside the archive codec rather than the caller's sink.
    pub fn is_codec_failure(&self) -> bool {
        matches!(
            self,
            Self::Create(_) | Self::Finalize(_) | Self::ReadBack(_) | Self::Allocation { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Error from [`Payload::write`](crate::payload::Payload::write).
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("cannot write plain payload: {0}")]
    Io(#[from] std::io::Error),
}
