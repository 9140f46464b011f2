//! Payload configuration, loadable from YAML.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Version recorded in manifests when none is configured.
pub const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PayloadConfig {
    /// Namespace prepended to every entry name (e.g. "out/").
    pub prefix: String,

    /// Opaque toolchain version written into the manifest.
    pub version: String,

    /// Serializer used by `Payload::write`.
    pub format: OutputFormat,

    /// What to do when an entry cannot be added to an archive.
    pub entry_policy: EntryPolicy,

    pub compression: Compression,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            version: DEFAULT_VERSION.to_string(),
            format: OutputFormat::default(),
            entry_policy: EntryPolicy::default(),
            compression: Compression::default(),
        }
    }
}

impl PayloadConfig {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to the defaults.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Zip,
    Plain,
}

/// Handling of entries that cannot be wrapped or added to an archive.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryPolicy {
    /// Log and skip the entry; the archive is still written.
    #[default]
    Lenient,
    /// Fail the whole archive before anything reaches the sink.
    Strict,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    Stored,
    #[default]
    Deflated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_zip_lenient_deflated() {
        let cfg = PayloadConfig::default();
        assert_eq!(cfg.prefix, "");
        assert_eq!(cfg.version, DEFAULT_VERSION);
        assert_eq!(cfg.format, OutputFormat::Zip);
        assert_eq!(cfg.entry_policy, EntryPolicy::Lenient);
        assert_eq!(cfg.compression, Compression::Deflated);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = PayloadConfig::from_yaml_str("prefix: out/\nentry_policy: strict\n").unwrap();
        assert_eq!(cfg.prefix, "out/");
        assert_eq!(cfg.entry_policy, EntryPolicy::Strict);
        assert_eq!(cfg.format, OutputFormat::Zip);
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(
            PayloadConfig::from_yaml_str("  \n").unwrap(),
            PayloadConfig::default()
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = PayloadConfig::from_yaml_str("prefx: out/\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PayloadConfig::load(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("missing.yaml"));
    }
}
