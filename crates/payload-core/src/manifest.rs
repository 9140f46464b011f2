//! Payload manifest (`manifest/manifest.json`).
//!
//! Refreshed on every archive build; it is never treated as producer data.

use crate::path::PathKey;
use crate::store::StoreGuard;
use serde::{Deserialize, Serialize};

/// Fixed, unprefixed location of the manifest inside every archive.
pub const MANIFEST_PATH: &str = "manifest/manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// Prefix under which the payload's files live
    pub contents_path: String,
    /// Opaque toolchain version string
    pub version: String,
}

impl Manifest {
    pub fn new(version: impl Into<String>, contents_path: impl Into<String>) -> Self {
        Self {
            contents_path: contents_path.into(),
            version: version.into(),
        }
    }

    /// Compact JSON with keys in sorted order, followed by exactly one newline.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        let mut out = serde_json::to_vec(self)?;
        out.push(b'\n');
        Ok(out)
    }
}

/// Build the manifest for `version` and the guard's prefix and overwrite the
/// entry at [`MANIFEST_PATH`].
///
/// Takes a [`StoreGuard`] so the refresh happens under the same lock as the
/// serialization that follows it.
pub fn build_and_insert(store: &mut StoreGuard<'_>, version: &str) -> serde_json::Result<Manifest> {
    let manifest = Manifest::new(version, store.prefix());
    let bytes = manifest.to_bytes()?;
    store.insert(PathKey::from_full(MANIFEST_PATH), bytes);
    Ok(manifest)
}
