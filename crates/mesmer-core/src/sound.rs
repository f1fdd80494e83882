//! Sound effects.
//!
//! The run-loops only see [`SoundPlayer`]. [`SoundManager`] is the real
//! implementation: it resolves the asset for a sound kind, hands it to an
//! [`AudioSink`], and logs the configured fallback text if playback fails.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SoundError;
use crate::storage::Storage;

/// Storage key of the sound-enabled preference.
pub const SOUND_ENABLED_KEY: &str = "mesmer_tigrinya_sound_enabled";

/// The sound effects a quiz can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundKind {
    Correct,
    Incorrect,
    Complete,
    Click,
}

impl SoundKind {
    pub const ALL: [SoundKind; 4] = [
        SoundKind::Correct,
        SoundKind::Incorrect,
        SoundKind::Complete,
        SoundKind::Click,
    ];
}

impl fmt::Display for SoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundKind::Correct => write!(f, "correct"),
            SoundKind::Incorrect => write!(f, "incorrect"),
            SoundKind::Complete => write!(f, "complete"),
            SoundKind::Click => write!(f, "click"),
        }
    }
}

/// One value per sound kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerKind<T> {
    pub correct: T,
    pub incorrect: T,
    pub complete: T,
    pub click: T,
}

impl<T> PerKind<T> {
    pub fn get(&self, kind: SoundKind) -> &T {
        match kind {
            SoundKind::Correct => &self.correct,
            SoundKind::Incorrect => &self.incorrect,
            SoundKind::Complete => &self.complete,
            SoundKind::Click => &self.click,
        }
    }

    pub fn get_mut(&mut self, kind: SoundKind) -> &mut T {
        match kind {
            SoundKind::Correct => &mut self.correct,
            SoundKind::Incorrect => &mut self.incorrect,
            SoundKind::Complete => &mut self.complete,
            SoundKind::Click => &mut self.click,
        }
    }
}

/// Plays sound effects. Failures never reach the caller.
pub trait SoundPlayer: Send + Sync {
    fn play(&self, kind: SoundKind);
}

/// A player that does nothing.
pub struct NoSound;

impl SoundPlayer for NoSound {
    fn play(&self, _: SoundKind) {}
}

/// Output device for decoded audio.
pub trait AudioSink: Send + Sync {
    fn play(&self, asset: &Path, volume: f32) -> Result<(), SoundError>;
}

/// Sound settings, usually loaded from the `[sound]` table of `mesmer.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub enabled: bool,
    /// Directory the asset file names are resolved against.
    pub audio_dir: PathBuf,
    pub volumes: PerKind<f32>,
    /// Asset file names; `None` leaves the kind without a sound.
    pub files: PerKind<Option<String>>,
    /// Text logged in place of a sound that cannot be played.
    pub fallbacks: PerKind<String>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            audio_dir: PathBuf::from("audio"),
            volumes: PerKind {
                correct: 0.7,
                incorrect: 0.6,
                complete: 0.8,
                click: 0.5,
            },
            files: PerKind {
                correct: Some("correct.MP3".into()),
                incorrect: Some("incorrect.MP3".into()),
                complete: Some("complete.MP3".into()),
                click: Some("click.MP3".into()),
            },
            fallbacks: PerKind {
                correct: "🔊 ቅኑዕ!".into(),
                incorrect: "🔊 ደጊምካ ፈትን!".into(),
                complete: "🔊 ሕቶ ተወዲኡ!".into(),
                click: "🔊 ጠውቕ!".into(),
            },
        }
    }
}

/// Plays configured assets through a sink and remembers the on/off preference.
pub struct SoundManager {
    config: SoundConfig,
    enabled: AtomicBool,
    sink: Arc<dyn AudioSink>,
    settings: Option<Storage>,
}

impl SoundManager {
    pub fn new(config: SoundConfig, sink: Arc<dyn AudioSink>) -> Self {
        Self {
            enabled: AtomicBool::new(config.enabled),
            config,
            sink,
            settings: None,
        }
    }

    /// Persist the on/off preference in `storage` and restore any saved value.
    pub fn with_settings(mut self, storage: Storage) -> Self {
        self.settings = Some(storage);
        self.load_settings();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Turn sounds on or off and save the preference.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        self.enabled.store(enabled, Ordering::Relaxed);
        self.save_settings()
    }

    /// Restore the saved preference, keeping the configured default if none.
    pub fn load_settings(&self) {
        let saved = self
            .settings
            .as_ref()
            .and_then(|s| s.read(SOUND_ENABLED_KEY));
        match saved.as_deref() {
            Some("true") => self.enabled.store(true, Ordering::Relaxed),
            Some("false") => self.enabled.store(false, Ordering::Relaxed),
            Some(other) => tracing::warn!("ignoring sound preference {other:?}"),
            None => {}
        }
    }

    pub fn save_settings(&self) -> bool {
        match &self.settings {
            Some(storage) => storage.write(SOUND_ENABLED_KEY, &self.is_enabled().to_string()),
            None => false,
        }
    }

    /// Path of the asset for `kind`, if one is configured.
    pub fn asset_path(&self, kind: SoundKind) -> Option<PathBuf> {
        self.config
            .files
            .get(kind)
            .as_ref()
            .map(|file| self.config.audio_dir.join(file))
    }

    pub fn fallback(&self, kind: SoundKind) -> &str {
        self.config.fallbacks.get(kind)
    }
}

impl SoundPlayer for SoundManager {
    fn play(&self, kind: SoundKind) {
        if !self.is_enabled() {
            tracing::trace!(%kind, "sounds are disabled");
            return;
        }

        let Some(asset) = self.asset_path(kind) else {
            tracing::info!("{} (no file configured for {kind})", self.fallback(kind));
            return;
        };

        let volume = self.config.volumes.get(kind).clamp(0.0, 1.0);

        if let Err(e) = self.sink.play(&asset, volume) {
            tracing::info!("{} ({e})", self.fallback(kind));
        }
    }
}
