//! Configuration loading for Tally.
//!
//! Reads `~/.tally/config.toml`. A missing file is not an error; every field has a
//! default so a partial file is fine.
//!
//! ```toml
//! [animation]
//! flip_duration_ms = 300
//! step_gap_ms = 150
//! reduced_motion = false
//! ```

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_FLIP_DURATION_MS: u64 = 300;
const DEFAULT_STEP_GAP_MS: u64 = 150;

/// Environment override that forces reduced motion regardless of the file.
pub const REDUCED_MOTION_ENV: &str = "TALLY_REDUCED_MOTION";

const fn default_flip_duration_ms() -> u64 {
    DEFAULT_FLIP_DURATION_MS
}

const fn default_step_gap_ms() -> u64 {
    DEFAULT_STEP_GAP_MS
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TallyConfig {
    pub animation: Option<AnimationConfig>,
}

/// Timings for counter flip sequences.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct AnimationConfig {
    /// Length of a single flip. Default: 300.
    #[serde(default = "default_flip_duration_ms")]
    pub flip_duration_ms: u64,
    /// Pause between consecutive flips. Default: 150.
    #[serde(default = "default_step_gap_ms")]
    pub step_gap_ms: u64,
    /// Skip motion: flips and gaps take no time.
    #[serde(default)]
    pub reduced_motion: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            flip_duration_ms: DEFAULT_FLIP_DURATION_MS,
            step_gap_ms: DEFAULT_STEP_GAP_MS,
            reduced_motion: false,
        }
    }
}

impl AnimationConfig {
    #[must_use]
    pub fn flip_duration(&self) -> Duration {
        if self.reduced_motion {
            Duration::ZERO
        } else {
            Duration::from_millis(self.flip_duration_ms)
        }
    }

    #[must_use]
    pub fn step_gap(&self) -> Duration {
        if self.reduced_motion {
            Duration::ZERO
        } else {
            Duration::from_millis(self.step_gap_ms)
        }
    }
}

impl TallyConfig {
    /// Load from the default path. Returns `Ok(None)` when there is no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Animation settings with defaults filled in and the environment override applied.
    #[must_use]
    pub fn animation(&self) -> AnimationConfig {
        self.animation_with(reduced_motion_from_env())
    }

    fn animation_with(&self, force_reduced_motion: bool) -> AnimationConfig {
        let mut animation = self.animation.unwrap_or_default();
        animation.reduced_motion |= force_reduced_motion;
        animation
    }
}

fn reduced_motion_from_env() -> bool {
    match env::var(REDUCED_MOTION_ENV) {
        Ok(value) => parse_flag(&value),
        Err(_) => false,
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tally").join("config.toml"))
}
