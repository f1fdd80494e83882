//! Subcommand implementations.

pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod play;
pub mod progress;
pub mod reset;
pub mod sound;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use mesmer_core::sound::SoundManager;
use mesmer_core::storage::Storage;
use mesmer_core::tracker::{ProgressTracker, StarTracker};
use mesmer_storage::config::load_config_from;
use mesmer_storage::{open_storage, MesmerConfig};

use crate::terminal::TerminalSink;

/// Configuration plus the opened store, shared by the commands that persist.
pub struct Session {
    pub config: MesmerConfig,
    pub storage: Storage,
}

impl Session {
    /// Load the config, apply `--data-dir`, and probe the store.
    pub fn open(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = load_config_from(config_path)?;
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }
        let storage = open_storage(&config);
        if !storage.is_available() {
            eprintln!(
                "Warning: cannot use data directory {}; progress will not be saved.",
                config.data_dir.display()
            );
        }
        Ok(Self { config, storage })
    }

    pub fn progress(&self) -> ProgressTracker {
        ProgressTracker::new(self.storage.clone())
    }

    pub fn stars(&self) -> StarTracker {
        StarTracker::new(self.storage.clone())
    }

    /// Sound manager with the saved on/off preference applied.
    pub fn sound(&self) -> SoundManager {
        SoundManager::new(self.config.sound.clone(), Arc::new(TerminalSink))
            .with_settings(self.storage.clone())
    }

    /// Fail unless the store can be written.
    pub fn require_storage(&self) -> Result<()> {
        anyhow::ensure!(
            self.storage.is_available(),
            "storage is not available: {}",
            self.config.data_dir.display()
        );
        Ok(())
    }
}
