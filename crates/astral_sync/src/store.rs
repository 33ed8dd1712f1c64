//! # Persistent Stores
//!
//! Byte-oriented key-value storage behind the cache's persistent tier.
//! The cache treats every store failure as a miss, so implementations
//! report errors honestly and never retry.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// Key-value byte storage.
pub trait PersistentStore: Send + Sync {
    /// Reads a value. `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Writes a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write(&self, key: &str, value: &[u8]) -> io::Result<()>;

    /// Removes a value. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// One file per key under a directory.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash leaves either the old record or the new one.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) a store directory.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Store directory.
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid store key {key:?}"),
            ));
        }
        Ok(self.dir.join(format!("{key}.bin")))
    }
}

impl PersistentStore for FileStore {
    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &[u8]) -> io::Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)?) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// In-process store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl PersistentStore for MemoryStore {
    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> io::Result<()> {
        self.entries.lock().insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("astral_store_{name}_{}", std::process::id()))
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = temp_dir("round_trip");
        let store = FileStore::open(&dir).unwrap();

        assert_eq!(store.read("sector_1_2_3").unwrap(), None);
        store.write("sector_1_2_3", b"hello").unwrap();
        store.write("sector_1_2_3", b"world").unwrap();
        assert_eq!(store.read("sector_1_2_3").unwrap(), Some(b"world".to_vec()));
        assert!(!dir.join("sector_1_2_3.tmp").exists());

        store.remove("sector_1_2_3").unwrap();
        store.remove("sector_1_2_3").unwrap();
        assert_eq!(store.read("sector_1_2_3").unwrap(), None);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = temp_dir("keys");
        let store = FileStore::open(&dir).unwrap();
        let err = store.write("../escape", b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.write("a", b"1").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.read("a").unwrap(), Some(b"1".to_vec()));
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }
}
