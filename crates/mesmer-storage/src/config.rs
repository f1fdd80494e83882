//! `mesmer.toml` configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mesmer_core::engine::Timings;
use mesmer_core::sound::SoundConfig;

/// Environment variable that replaces `data_dir`.
pub const DATA_DIR_ENV: &str = "MESMER_DATA_DIR";

/// Local config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "mesmer.toml";

/// Top-level mesmer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MesmerConfig {
    /// Directory holding the persisted progress, stars, and sound preference.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory searched by `mesmer list`.
    #[serde(default = "default_quiz_dir")]
    pub quiz_dir: PathBuf,
    /// Upper bound on stored bytes; mirrors a browser's local storage quota.
    #[serde(default = "default_quota")]
    pub storage_quota_bytes: Option<u64>,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub timings: Timings,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./.mesmer")
}
fn default_quiz_dir() -> PathBuf {
    PathBuf::from("./quizzes")
}
fn default_quota() -> Option<u64> {
    Some(5 * 1024 * 1024)
}

impl Default for MesmerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            quiz_dir: default_quiz_dir(),
            storage_quota_bytes: default_quota(),
            sound: SoundConfig::default(),
            timings: Timings::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied as-is and never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `mesmer.toml` in the current directory
/// 2. `~/.config/mesmer/config.toml`
///
/// Environment variable override: `MESMER_DATA_DIR`.
pub fn load_config() -> Result<MesmerConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<MesmerConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MesmerConfig::default(),
    };

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }

    config.data_dir = resolve_path(&config.data_dir);
    config.quiz_dir = resolve_path(&config.quiz_dir);
    config.sound.audio_dir = resolve_path(&config.sound.audio_dir);

    Ok(config)
}

/// Parse config text without touching the environment.
pub fn parse_config(content: &str) -> Result<MesmerConfig> {
    Ok(toml::from_str(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mesmer"))
}

/// Starter config written by `mesmer init`.
pub const SAMPLE_CONFIG: &str = r#"# mesmer configuration

data_dir = "./.mesmer"
quiz_dir = "./quizzes"
storage_quota_bytes = 5242880

[sound]
enabled = true
audio_dir = "./audio"

[sound.volumes]
correct = 0.7
incorrect = 0.6
complete = 0.8
click = 0.5

# Delays in milliseconds.
[timings]
choice_correct_advance = 600
choice_incorrect_advance = 0
build_correct_advance = 1000
memory_flip_resolve = 300
memory_match_clear = 500
memory_mismatch_reset = 1000
memory_finish_celebration = 1000
"#;
