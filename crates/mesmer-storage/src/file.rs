//! File-backed key-value store.
//!
//! One file per key under a data directory. Writes go to a temporary file in
//! the same directory and are renamed into place, so a crash never leaves a
//! half-written progress document behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use mesmer_core::error::StorageError;
use mesmer_core::storage::StorageBackend;

const EXTENSION: &str = "json";

/// Stores each key as `<data_dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    quota: Option<u64>,
    read_only: bool,
}

impl FileBackend {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota: None,
            read_only: false,
        }
    }

    /// Limit the total size of all stored values, in bytes.
    pub fn with_quota(mut self, bytes: Option<u64>) -> Self {
        self.quota = bytes;
        self
    }

    /// Refuse every write and delete.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }

    /// Bytes used by every stored value except `skip`.
    fn used_bytes(&self, skip: &Path) -> io::Result<u64> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };
        let mut total = 0;
        for entry in entries {
            let path = entry?.path();
            if path == skip || !path.extension().is_some_and(|ext| ext == EXTENSION) {
                continue;
            }
            total += fs::metadata(&path)?.len();
        }
        Ok(total)
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.read_only {
            Err(StorageError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let path = self.path_for(key)?;

        if let Some(limit) = self.quota {
            let needed = self.used_bytes(&path)? + value.len() as u64;
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }

        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StorageError::Io(e.error))?;
        tracing::debug!(key, bytes = value.len(), "stored");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mesmer_core::storage::{Storage, PROBE_KEY};
    use mesmer_core::tracker::{ProgressTracker, StarTracker, PROGRESS_KEY};

    use super::*;

    #[test]
    fn roundtrip_and_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("data"));

        assert_eq!(backend.get("stars").unwrap(), None);
        backend.set("stars", "12").unwrap();
        assert_eq!(backend.get("stars").unwrap().as_deref(), Some("12"));
        assert!(dir.path().join("data").join("stars.json").exists());

        backend.set("stars", "13").unwrap();
        assert_eq!(backend.get("stars").unwrap().as_deref(), Some("13"));

        backend.remove("stars").unwrap();
        backend.remove("stars").unwrap();
        assert_eq!(backend.get("stars").unwrap(), None);
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        for key in ["", "../escape", "a/b", "a.b"] {
            assert!(matches!(
                backend.set(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn quota_counts_other_keys_but_not_the_replaced_value() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path()).with_quota(Some(10));

        backend.set("a", "123456").unwrap();
        backend.set("a", "1234567890").unwrap();
        let err = backend.set("b", "1").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded {
                needed: 11,
                limit: 10
            }
        ));
        assert_eq!(backend.get("b").unwrap(), None);
    }

    #[test]
    fn probe_succeeds_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FileBackend::new(dir.path().join("fresh")));
        let storage = Storage::probe(backend.clone());
        assert!(storage.is_available());
        assert_eq!(backend.get(PROBE_KEY).unwrap(), None);
    }

    #[test]
    fn read_only_backend_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::probe(Arc::new(FileBackend::new(dir.path()).read_only()));
        assert!(!storage.is_available());
        assert!(!storage.write("stars", "1"));
    }

    #[test]
    fn data_dir_that_is_a_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "not a directory").unwrap();
        let storage = Storage::probe(Arc::new(FileBackend::new(&blocker)));
        assert!(!storage.is_available());
    }

    #[test]
    fn progress_survives_a_new_backend() {
        let dir = tempfile::tempdir().unwrap();
        let open = || Storage::probe(Arc::new(FileBackend::new(dir.path())));

        assert_eq!(StarTracker::new(open()).add_stars(4), 4);
        assert_eq!(StarTracker::new(open()).add_stars(2), 6);

        let tracker = ProgressTracker::new(open());
        assert!(tracker.import_progress(r#"{"animals": {"completed": true, "bestScore": 90}}"#));
        let reopened = ProgressTracker::new(open());
        assert!(reopened.is_quiz_completed("animals"));

        fs::write(dir.path().join(format!("{PROGRESS_KEY}.json")), "{broken").unwrap();
        assert!(ProgressTracker::new(open()).read_all().is_empty());
    }
}
