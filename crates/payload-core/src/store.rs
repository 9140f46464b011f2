//! Thread-safe, path-keyed file store.
//!
//! One coarse lock guards the key set. Producers call
//! [`FileStore::get_or_create`] from any thread and keep the returned
//! [`FileHandle`]; writes through a handle do not touch the store lock.
//! Serializers take the lock for their whole run through [`FileStore::lock`],
//! so no key can appear mid-enumeration.

use crate::path::PathKey;
use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared handle to one content slot.
///
/// Clones refer to the same slot. The slot lives as long as any handle or
/// the owning store does.
#[derive(Debug, Clone, Default)]
pub struct FileHandle {
    slot: Arc<Mutex<Vec<u8>>>,
}

impl FileHandle {
    fn slot(&self) -> MutexGuard<'_, Vec<u8>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the slot's content.
    pub fn set(&self, data: impl AsRef<[u8]>) {
        let mut slot = self.slot();
        slot.clear();
        slot.extend_from_slice(data.as_ref());
    }

    pub fn append(&self, data: impl AsRef<[u8]>) {
        self.slot().extend_from_slice(data.as_ref());
    }

    /// Copy of the current content.
    pub fn contents(&self) -> Vec<u8> {
        self.slot().clone()
    }

    /// Run `f` against the current content without copying it.
    pub fn with_contents<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&self.slot())
    }

    pub fn len(&self) -> usize {
        self.slot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot().is_empty()
    }

    /// True when both handles refer to the same slot.
    pub fn same_slot(&self, other: &FileHandle) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl io::Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for &FileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Mapping from [`PathKey`] to content, scoped by an immutable prefix.
#[derive(Debug, Default)]
pub struct FileStore {
    prefix: String,
    files: Mutex<BTreeMap<PathKey, FileHandle>>,
}

impl FileStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            files: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Handle to the slot for `prefix + name`, creating an empty one if absent.
    ///
    /// Repeated calls with the same name return handles to the same slot.
    pub fn get_or_create(&self, name: impl AsRef<str>) -> FileHandle {
        let key = PathKey::new(&self.prefix, name.as_ref());
        self.lock().get_or_create(key)
    }

    /// Handle for a fully-qualified key, if present.
    pub fn get(&self, key: &str) -> Option<FileHandle> {
        self.lock().get(key).cloned()
    }

    /// All keys in byte-lexicographic order of the full path.
    pub fn ordered_keys(&self) -> Vec<PathKey> {
        self.lock().ordered_keys()
    }

    pub fn len(&self) -> usize {
        self.lock().files.len()
    }

    /// Total bytes held across all slots.
    pub fn content_len(&self) -> usize {
        self.lock().files.values().map(FileHandle::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().files.is_empty()
    }

    /// Take the store-wide lock. Held by serializers for their entire run.
    pub fn lock(&self) -> StoreGuard<'_> {
        StoreGuard {
            prefix: &self.prefix,
            files: self.files.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }
}

/// Exclusive view of a [`FileStore`] while its lock is held.
pub struct StoreGuard<'a> {
    prefix: &'a str,
    files: MutexGuard<'a, BTreeMap<PathKey, FileHandle>>,
}

impl StoreGuard<'_> {
    pub fn prefix(&self) -> &str {
        self.prefix
    }

    pub fn get_or_create(&mut self, key: PathKey) -> FileHandle {
        self.files.entry(key).or_default().clone()
    }

    pub fn get(&self, key: &str) -> Option<&FileHandle> {
        self.files.get(key)
    }

    /// Overwrite (or create) the entry at a fully-qualified key.
    pub fn insert(&mut self, key: PathKey, data: impl AsRef<[u8]>) {
        self.get_or_create(key).set(data);
    }

    pub fn ordered_keys(&self) -> Vec<PathKey> {
        self.files.keys().cloned().collect()
    }

    /// Entries in canonical order.
    pub fn entries(&self) -> impl Iterator<Item = (&PathKey, &FileHandle)> + '_ {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn get_or_create_is_idempotent() {
        let store = FileStore::new("out/");
        let a = store.get_or_create("a.txt");
        let b = store.get_or_create("a.txt");
        assert!(a.same_slot(&b));

        a.append("hel");
        b.append("lo");
        assert_eq!(a.contents(), b"hello");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn empty_slots_are_enumerated() {
        let store = FileStore::new("p/");
        store.get_or_create("empty.bin");
        assert_eq!(store.ordered_keys(), vec![PathKey::from_full("p/empty.bin")]);
        assert!(store.get("p/empty.bin").unwrap().is_empty());
    }

    #[test]
    fn ordered_keys_ignore_insertion_order() {
        let forward = FileStore::new("x/");
        let backward = FileStore::new("x/");
        let names = ["c.o", "a.txt", "b/z.json", "b.txt", "A.txt"];
        for n in names {
            forward.get_or_create(n);
        }
        for n in names.iter().rev() {
            backward.get_or_create(n);
        }
        assert_eq!(forward.ordered_keys(), backward.ordered_keys());
        let keys: Vec<String> = forward.ordered_keys().into_iter().map(String::from).collect();
        assert_eq!(keys, ["x/A.txt", "x/a.txt", "x/b.txt", "x/b/z.json", "x/c.o"]);
    }

    #[test]
    fn set_overwrites_and_write_appends() {
        let store = FileStore::new("");
        let mut handle = store.get_or_create("log.txt");
        write!(handle, "first").unwrap();
        handle.set("second");
        writeln!(&handle, " line").unwrap();
        assert_eq!(handle.contents(), b"second line\n");
    }

    #[test]
    fn content_len_sums_all_slots() {
        let store = FileStore::new("");
        assert_eq!(store.content_len(), 0);
        store.get_or_create("a").set("hello");
        store.get_or_create("b").set("world\n");
        store.get_or_create("empty");
        assert_eq!(store.content_len(), 11);
    }

    #[test]
    fn guard_insert_overwrites_existing_entry() {
        let store = FileStore::new("");
        store.get_or_create("m.json").set("old");
        store.lock().insert(PathKey::from_full("m.json"), "new");
        assert_eq!(store.get("m.json").unwrap().contents(), b"new");
        assert_eq!(store.len(), 1);
    }
}
