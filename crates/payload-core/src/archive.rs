//! Archive serialization of a [`FileStore`].
//!
//! # Process
//!
//! With the store lock held for the whole call:
//!
//! 1. Refresh the manifest entry
//! 2. Create an empty in-memory archive
//! 3. Add every entry in key order, normalizing UNIX permission bits
//! 4. Finalize the archive (central directory)
//! 5. Read the finished buffer back into an exactly-sized output buffer
//! 6. Write the output buffer to the sink and flush
//!
//! Failures in steps 2, 4 and 5 are fatal and leave the sink untouched.
//! Per-entry failures in step 3 omit that entry; whether that is fatal is
//! decided by the [`EntryPolicy`].

use crate::codec::{ArchiveCodec, EntryIndex, InMemoryArchive};
use crate::config::EntryPolicy;
use crate::errors::ArchiveError;
use crate::manifest;
use crate::path::PathKey;
use crate::permissions;
use crate::store::{FileStore, StoreGuard};
use crate::zip_codec::ZipCodec;
use sha2::{Digest, Sha256};
use std::io::{Read, Seek, SeekFrom, Write};
use tracing::{debug, error, info, warn};

/// An entry left out of an archive, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmittedEntry {
    pub key: PathKey,
    pub reason: String,
}

/// Outcome of a successful [`ArchiveWriter::write_archive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Entries written, in archive order.
    pub entries: Vec<PathKey>,
    /// Entries skipped under [`EntryPolicy::Lenient`].
    pub omitted: Vec<OmittedEntry>,
    /// Size of the archive in bytes.
    pub bytes: u64,
    /// `sha256:<hex>` of the archive bytes.
    pub sha256: String,
}

impl ArchiveReport {
    pub fn is_complete(&self) -> bool {
        self.omitted.is_empty()
    }
}

struct Built {
    buffer: Vec<u8>,
    entries: Vec<PathKey>,
    omitted: Vec<OmittedEntry>,
}

/// Builds archives from a [`FileStore`] with a pluggable codec.
#[derive(Debug, Clone)]
pub struct ArchiveWriter<C = ZipCodec> {
    codec: C,
    version: String,
    policy: EntryPolicy,
}

impl ArchiveWriter<ZipCodec> {
    /// Writer using the zip codec with default settings.
    pub fn zip(version: impl Into<String>) -> Self {
        Self::new(ZipCodec::default(), version)
    }
}

impl<C: ArchiveCodec> ArchiveWriter<C> {
    pub fn new(codec: C, version: impl Into<String>) -> Self {
        Self {
            codec,
            version: version.into(),
            policy: EntryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: EntryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn policy(&self) -> EntryPolicy {
        self.policy
    }

    /// Build the archive for `store` and write it to `sink`.
    ///
    /// The store lock is held until `sink` has been flushed. On `Err`,
    /// nothing has been written to `sink`.
    pub fn write_archive<W: Write + ?Sized>(
        &self,
        store: &FileStore,
        sink: &mut W,
    ) -> Result<ArchiveReport, ArchiveError> {
        info!("writing zip to stream");
        let mut guard = store.lock();
        manifest::build_and_insert(&mut guard, &self.version)?;

        let Built {
            buffer,
            entries,
            omitted,
        } = self.build(&guard)?;

        let report = ArchiveReport {
            entries,
            omitted,
            bytes: buffer.len() as u64,
            sha256: format!("sha256:{}", hex::encode(Sha256::digest(&buffer))),
        };

        sink.write_all(&buffer).map_err(ArchiveError::Sink)?;
        sink.flush().map_err(ArchiveError::Sink)?;

        info!(bytes = report.bytes, sha256 = %report.sha256, "zip written to stream");
        Ok(report)
    }

    /// Build the archive in memory and return it as a byte vector.
    pub fn to_bytes(&self, store: &FileStore) -> Result<Vec<u8>, ArchiveError> {
        let mut out = Vec::new();
        self.write_archive(store, &mut out)?;
        Ok(out)
    }

    fn build(&self, store: &StoreGuard<'_>) -> Result<Built, ArchiveError> {
        let mut archive = self.codec.create_in_memory().map_err(|e| {
            error!(error = %e, "can't create zip source for new archive");
            ArchiveError::Create(e)
        })?;
        info!("zip buffer created, adding files to archive");

        let mut entries = Vec::with_capacity(store.len());
        let mut omitted = Vec::new();

        for (key, handle) in store.entries() {
            debug!(file = %key, bytes = handle.len(), "adding file to archive buffer");

            let added = handle
                .with_contents(|data| archive.wrap_source(data))
                .map_err(|e| ("can't create zip source", e))
                .and_then(|source| {
                    archive
                        .add(key.as_str(), source, true)
                        .map_err(|e| ("problem adding file to archive", e))
                });

            match added {
                Ok(index) => {
                    normalize_permissions(&mut archive, index, key);
                    entries.push(key.clone());
                }
                Err((what, e)) => {
                    warn!(file = %key, error = %e, "{what}");
                    omitted.push(OmittedEntry {
                        key: key.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if self.policy == EntryPolicy::Strict && !omitted.is_empty() {
            error!(omitted = omitted.len(), "entries omitted under strict policy");
            return Err(ArchiveError::EntriesOmitted { omitted });
        }

        let source = archive.finalize().map_err(|e| {
            error!(error = %e, "problem closing new zip archive");
            ArchiveError::Finalize(e)
        })?;

        Ok(Built {
            buffer: read_back(source)?,
            entries,
            omitted,
        })
    }
}

/// Clear group/other write and mark shell scripts executable on UNIX-tagged
/// entries. Attribute failures leave the entry as the codec created it.
fn normalize_permissions<A: InMemoryArchive>(archive: &mut A, index: EntryIndex, key: &PathKey) {
    let result = archive.external_attributes(index).and_then(|current| {
        let updated = permissions::normalize(key.as_str(), current);
        if updated == current {
            return Ok(());
        }
        archive.set_external_attributes(index, updated)
    });
    if let Err(e) = result {
        warn!(file = %key, error = %e, "cannot normalize file permissions");
    }
}

/// Copy a finalized archive into an exactly-sized buffer.
fn read_back<R: Read + Seek>(mut source: R) -> Result<Vec<u8>, ArchiveError> {
    let size = source.seek(SeekFrom::End(0)).map_err(ArchiveError::ReadBack)?;
    info!(bytes = size, "zip buffer size");

    let mut out = Vec::new();
    usize::try_from(size)
        .ok()
        .and_then(|len| out.try_reserve_exact(len).ok())
        .ok_or_else(|| {
            error!(bytes = size, "unable to allocate output buffer for writing zip to stream");
            ArchiveError::Allocation { bytes: size }
        })?;

    source.seek(SeekFrom::Start(0)).map_err(ArchiveError::ReadBack)?;
    source
        .take(size)
        .read_to_end(&mut out)
        .map_err(ArchiveError::ReadBack)?;
    Ok(out)
}
