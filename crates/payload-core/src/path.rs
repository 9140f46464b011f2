//! Prefix-qualified entry names.
//!
//! A [`PathKey`] is the identity of one stored file: the payload prefix
//! followed by the producer-supplied relative name, always with forward
//! slashes. Keys compare by the raw bytes of the full string, which is the
//! canonical order of every serialized output.

use std::borrow::Borrow;
use std::fmt;
use std::path::{Component, Path};

/// Normalized, prefix-qualified relative path of a stored file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathKey(String);

impl PathKey {
    /// Build `prefix + name`, converting backslashes in `name` to `/`.
    pub fn new(prefix: &str, name: &str) -> Self {
        let mut key = String::with_capacity(prefix.len() + name.len());
        key.push_str(prefix);
        key.extend(name.chars().map(|c| if c == '\\' { '/' } else { c }));
        Self(key)
    }

    /// Wrap an already fully-qualified key (used for fixed, unprefixed entries).
    pub fn from_full(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// True when the key is relative and contains no `..` or root components,
    /// i.e. joining it onto a directory can never escape that directory.
    pub fn is_safe_relative(&self) -> bool {
        if self.0.is_empty() || self.0.starts_with('/') {
            return false;
        }
        self.as_path()
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PathKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PathKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<PathKey> for String {
    fn from(key: PathKey) -> Self {
        key.0
    }
}

impl PartialEq<str> for PathKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PathKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
