use std::collections::BTreeMap;
#[cfg(test)]
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access local store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode local store: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to replace local store: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// String key/value storage scoped to one client, like browser local storage.
pub trait LocalStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
    /// Every key, in whatever order the backend enumerates them.
    fn keys(&self) -> Vec<String>;
}

/// Volatile store. Enumeration order is unspecified.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/**
    Store persisted as a JSON object of string values.

    Every write re-reads the file, applies its one change and rewrites the
    whole file through a temp file in the same directory, so readers never
    see a partial file. Handles on the same file keep each other's keys;
    concurrent writes to the same key are last-write-wins. Reads are served
    from the snapshot taken at open or at this handle's last write.
*/
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open a store file. A missing file is an empty store; an unreadable
    /// one is an empty store too, and is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        Ok(Self { path, entries })
    }

    // The snapshot only changes once the file has been replaced.
    fn update<F>(&mut self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut entries = read_entries(&self.path)?;
        if change(&mut entries) {
            write_entries(&self.path, &entries)?;
        }
        self.entries = entries;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Ignoring malformed local store");
            BTreeMap::new()
        })),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(&mut tmp, entries)?;
    tmp.persist(path)?;
    Ok(())
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value);
            true
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| entries.remove(key).is_some())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basics() {
        let mut store = MemoryStore::new();
        assert!(store.get("a").is_none());
        store.set("a", "1".into()).unwrap();
        store.set("a", "2".into()).unwrap();
        assert_eq!(store.get("a").as_deref(), Some("2"));
        assert_eq!(store.keys(), vec!["a".to_string()]);
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.keys().is_empty());
        store.set("video_progress_x", "{}".into()).unwrap();
        store.set("other", "v".into()).unwrap();
        store.remove("other").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("video_progress_x").as_deref(), Some("{}"));
        assert!(reopened.get("other").is_none());
    }

    #[test]
    fn test_file_store_malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        std::fs::write(&path, "not json").unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.keys().is_empty());
        store.set("k", "v".into()).unwrap();
        assert_eq!(FileStore::open(&path).unwrap().get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store_handles_keep_each_others_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");

        let mut first = FileStore::open(&path).unwrap();
        let mut second = FileStore::open(&path).unwrap();
        first.set("video_progress_a", "1".into()).unwrap();
        second.set("video_progress_b", "2".into()).unwrap();
        first.set("video_progress_b", "3".into()).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.keys(), vec!["video_progress_a", "video_progress_b"]);
        assert_eq!(reopened.get("video_progress_b").as_deref(), Some("3"));

        second.remove("video_progress_a").unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.keys(), vec!["video_progress_b"]);
    }

    #[test]
    fn test_file_store_failed_write_leaves_snapshot_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("local.json");

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.set("k", "v".into()).is_err());
        assert!(store.get("k").is_none());
        assert!(store.keys().is_empty());
    }
}
