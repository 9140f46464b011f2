pub mod archive;
pub mod codec;
pub mod config;
pub mod errors;
pub mod manifest;
pub mod path;
pub mod payload;
pub mod permissions;
pub mod plain;
pub mod store;
pub mod zip_codec;

// Convenience re-exports
pub use archive::{ArchiveReport, ArchiveWriter, OmittedEntry};
pub use codec::{
    ArchiveCodec, EntryIndex, EntrySource, ExternalAttributes, HostSystem, InMemoryArchive,
};
pub use config::{Compression, EntryPolicy, OutputFormat, PayloadConfig, DEFAULT_VERSION};
pub use errors::{ArchiveError, CodecError, ConfigError, PayloadError};
pub use manifest::{Manifest, MANIFEST_PATH};
pub use path::PathKey;
pub use payload::{Payload, WriteOutcome};
pub use plain::{DirectoryReport, FailedFile};
pub use store::{FileHandle, FileStore, StoreGuard};
pub use zip_codec::ZipCodec;
