use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persisted blobs written after every session mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKey {
    Responses,
    CompanyInfo,
    LastUpdate,
    /// Copy of a responses blob that could not be fully decoded.
    CorruptResponses,
}

impl SnapshotKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Responses => "audit-responses",
            Self::CompanyInfo => "company-info",
            Self::LastUpdate => "last-update",
            Self::CorruptResponses => "audit-responses.corrupt",
        }
    }
}

/// Storage abstraction so sessions can be exercised without touching disk.
pub trait SnapshotStore: Send + Sync {
    fn load(&self, key: SnapshotKey) -> Result<Option<String>, SnapshotError>;
    fn save(&self, key: SnapshotKey, contents: &str) -> Result<(), SnapshotError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot io failure for {key}: {source}")]
    Io {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// One `<key>.json` file per snapshot key inside a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: SnapshotKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, key: SnapshotKey) -> Result<Option<String>, SnapshotError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SnapshotError::Io {
                key: key.as_str(),
                source,
            }),
        }
    }

    fn save(&self, key: SnapshotKey, contents: &str) -> Result<(), SnapshotError> {
        let io_error = |source| SnapshotError::Io {
            key: key.as_str(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_error)?;
        // Readers only ever see the previous file or the complete new one.
        let target = self.path_for(key);
        let staging = target.with_extension("json.tmp");
        std::fs::write(&staging, contents).map_err(io_error)?;
        std::fs::rename(&staging, &target).map_err(io_error)
    }
}

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    blobs: Mutex<HashMap<SnapshotKey, String>>,
}

impl MemorySnapshotStore {
    pub fn with_blob(self, key: SnapshotKey, contents: impl Into<String>) -> Self {
        if let Ok(mut guard) = self.blobs.lock() {
            guard.insert(key, contents.into());
        }
        self
    }

    pub fn blob(&self, key: SnapshotKey) -> Option<String> {
        self.blobs.lock().ok()?.get(&key).cloned()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: SnapshotKey) -> Result<Option<String>, SnapshotError> {
        let guard = self
            .blobs
            .lock()
            .map_err(|_| SnapshotError::Unavailable("snapshot mutex poisoned".to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    fn save(&self, key: SnapshotKey, contents: &str) -> Result<(), SnapshotError> {
        let mut guard = self
            .blobs
            .lock()
            .map_err(|_| SnapshotError::Unavailable("snapshot mutex poisoned".to_string()))?;
        guard.insert(key, contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_returns_none_for_missing_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSnapshotStore::new(dir.path());
        assert!(store
            .load(SnapshotKey::Responses)
            .expect("load succeeds")
            .is_none());
    }

    #[test]
    fn file_store_creates_directory_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSnapshotStore::new(dir.path().join("nested"));
        store
            .save(SnapshotKey::CompanyInfo, r#"{"name":"Acme"}"#)
            .expect("save succeeds");
        assert!(dir.path().join("nested").join("company-info.json").exists());
        assert_eq!(
            store.load(SnapshotKey::CompanyInfo).expect("load").as_deref(),
            Some(r#"{"name":"Acme"}"#)
        );
    }

    #[test]
    fn file_store_replaces_contents_without_leftovers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSnapshotStore::new(dir.path());
        store
            .save(SnapshotKey::Responses, r#"{"q1":{"score":2}}"#)
            .expect("first save");
        store
            .save(SnapshotKey::Responses, r#"{"q1":{"score":3}}"#)
            .expect("second save");
        assert_eq!(
            store.load(SnapshotKey::Responses).expect("load").as_deref(),
            Some(r#"{"q1":{"score":3}}"#)
        );
        let files: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .map(|entry| entry.expect("dir entry").file_name())
            .collect();
        assert_eq!(files, vec![std::ffi::OsString::from("audit-responses.json")]);
    }

    #[test]
    fn memory_store_keeps_blobs_per_key() {
        let store = MemorySnapshotStore::default().with_blob(SnapshotKey::Responses, "{}");
        store
            .save(SnapshotKey::LastUpdate, "2025-09-24T10:00:00Z")
            .expect("save");
        assert_eq!(store.blob(SnapshotKey::Responses).as_deref(), Some("{}"));
        assert!(store.load(SnapshotKey::CompanyInfo).expect("load").is_none());
    }
}
