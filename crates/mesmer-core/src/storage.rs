//! Key-value storage seam.
//!
//! [`StorageBackend`] is implemented by the file store in `mesmer-storage`
//! and by [`MemoryBackend`] here. [`Storage`] wraps a backend, probes it once
//! for availability, and turns every failure into a logged fallback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

/// Key written and removed by the availability probe.
pub const PROBE_KEY: &str = "__storage_test__";

/// A string key-value store, shared by every service that persists state.
pub trait StorageBackend: Send + Sync {
    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend for tests and for sessions that must not touch disk.
///
/// Can simulate a disabled store and a byte quota.
pub struct MemoryBackend {
    values: Mutex<HashMap<String, String>>,
    disabled: AtomicBool,
    quota: Option<u64>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            disabled: AtomicBool::new(false),
            quota: None,
        }
    }

    /// A backend that rejects every operation.
    pub fn unavailable() -> Self {
        let backend = Self::new();
        backend.disabled.store(true, Ordering::Relaxed);
        backend
    }

    /// Limit the total size of stored keys and values.
    pub fn with_quota(mut self, bytes: u64) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Turn the backend off (or back on) after construction.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::Relaxed);
    }

    /// Raw value, bypassing the availability flag.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds valid strings.
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_enabled(&self) -> Result<(), StorageError> {
        if self.disabled.load(Ordering::Relaxed) {
            Err(StorageError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_enabled()?;
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_enabled()?;
        let mut values = self.lock();
        if let Some(limit) = self.quota {
            let others: usize = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = (others + key.len() + value.len()) as u64;
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_enabled()?;
        self.lock().remove(key);
        Ok(())
    }
}

/// A backend plus the result of its one-time availability probe.
///
/// Reads on an unavailable store return `None`; writes return `false`.
/// Nothing here returns an error to the caller.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn StorageBackend>,
    available: bool,
}

impl Storage {
    /// Probe `backend` with a throwaway write and delete, and remember the result.
    pub fn probe(backend: Arc<dyn StorageBackend>) -> Self {
        let available = backend
            .set(PROBE_KEY, PROBE_KEY)
            .and_then(|_| backend.remove(PROBE_KEY));
        let available = match available {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("storage not available: {e}");
                false
            }
        };
        Self { backend, available }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn read(&self, key: &str) -> Option<String> {
        if !self.available {
            return None;
        }
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, "error reading storage: {e}");
                None
            }
        }
    }

    pub fn write(&self, key: &str, value: &str) -> bool {
        if !self.available {
            tracing::warn!(key, "cannot save: storage not available");
            return false;
        }
        match self.backend.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, "error writing storage: {e}");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        if !self.available {
            return false;
        }
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, "error clearing storage: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_leaves_no_trace() {
        let backend = Arc::new(MemoryBackend::new());
        let storage = Storage::probe(backend.clone());
        assert!(storage.is_available());
        assert!(backend.peek(PROBE_KEY).is_none());
    }

    #[test]
    fn unavailable_backend_degrades() {
        let storage = Storage::probe(Arc::new(MemoryBackend::unavailable()));
        assert!(!storage.is_available());
        assert!(!storage.write("k", "v"));
        assert_eq!(storage.read("k"), None);
        assert!(!storage.remove("k"));
    }

    #[test]
    fn probe_result_is_cached() {
        let backend = Arc::new(MemoryBackend::unavailable());
        let storage = Storage::probe(backend.clone());
        backend.set_disabled(false);
        // Still treated as unavailable: the probe ran once at construction.
        assert!(!storage.write("k", "v"));
        assert!(backend.peek("k").is_none());
    }

    #[test]
    fn quota_rejects_large_writes() {
        let backend = Arc::new(MemoryBackend::new().with_quota(64));
        let storage = Storage::probe(backend);
        assert!(storage.write("small", "ok"));
        assert!(!storage.write("big", &"x".repeat(100)));
        assert_eq!(storage.read("small").as_deref(), Some("ok"));
        assert_eq!(storage.read("big"), None);
    }

    #[test]
    fn failure_after_probe_is_reported_as_false() {
        let backend = Arc::new(MemoryBackend::new());
        let storage = Storage::probe(backend.clone());
        backend.set_disabled(true);
        assert!(!storage.write("k", "v"));
        assert_eq!(storage.read("k"), None);
    }
}
