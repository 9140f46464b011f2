//! Plain (non-archive) serializations of a [`FileStore`].
//!
//! - [`write_to_directory`]: one real file per key under a root directory.
//! - [`write_to_stream`]: a human-readable dump for debugging. Not meant to be
//!   parsed back.

use crate::path::PathKey;
use crate::store::FileStore;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, warn};

pub const SEPARATOR: &str = "------------------------------------------\n";

/// A file that could not be written by [`write_to_directory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub key: PathKey,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryReport {
    pub written: Vec<PathKey>,
    pub failed: Vec<FailedFile>,
}

impl DirectoryReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Write every entry to `root/<key>`, creating parent directories as needed.
///
/// A file that cannot be written is logged and skipped; all others are still
/// attempted.
pub fn write_to_directory(store: &FileStore, root: &Path) -> DirectoryReport {
    let guard = store.lock();
    let mut report = DirectoryReport::default();

    for (key, handle) in guard.entries() {
        let result = if key.is_safe_relative() {
            let target = root.join(key.as_path());
            handle.with_contents(|data| write_file(&target, data))
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path escapes the output directory",
            ))
        };

        match result {
            Ok(()) => {
                debug!(file = %key, "wrote plain file");
                report.written.push(key.clone());
            }
            Err(err) => {
                warn!(file = %key, error = %err, "unable to open output file");
                report.failed.push(FailedFile {
                    key: key.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    report
}

fn write_file(target: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(target)?;
    file.write_all(data)?;
    file.flush()
}

/// Write a banner, the ordered file list, then each file's content.
///
/// Every body ends with a newline, added when the content lacks one.
pub fn write_to_stream<W: Write + ?Sized>(store: &FileStore, sink: &mut W) -> io::Result<()> {
    let guard = store.lock();

    sink.write_all(SEPARATOR.as_bytes())?;
    writeln!(sink, "Plaintext payload: {}", guard.prefix())?;
    sink.write_all(SEPARATOR.as_bytes())?;
    writeln!(sink, "Manifest:")?;
    for (key, _) in guard.entries() {
        writeln!(sink, "{key}")?;
    }
    sink.write_all(SEPARATOR.as_bytes())?;

    for (key, handle) in guard.entries() {
        writeln!(sink, "File: {key}")?;
        handle.with_contents(|data| -> io::Result<()> {
            sink.write_all(data)?;
            if data.last() != Some(&b'\n') {
                sink.write_all(b"\n")?;
            }
            Ok(())
        })?;
        sink.write_all(SEPARATOR.as_bytes())?;
    }

    sink.flush()
}
