//! mesmer-storage — File-backed persistence and configuration.
//!
//! Implements `StorageBackend` over a data directory and loads `mesmer.toml`.

pub mod config;
pub mod file;

use std::sync::Arc;

use mesmer_core::storage::Storage;

pub use config::{load_config, load_config_from, MesmerConfig};
pub use file::FileBackend;

/// Open and probe the file store described by `config`.
pub fn open_storage(config: &MesmerConfig) -> Storage {
    let backend = FileBackend::new(&config.data_dir).with_quota(config.storage_quota_bytes);
    let storage = Storage::probe(Arc::new(backend));
    if storage.is_available() {
        tracing::debug!("using data directory {}", config.data_dir.display());
    }
    storage
}
