// ============================================
// src/config.rs
// Optional settings.toml and the app's platform directories
// ============================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::games::Difficulty;

const SETTINGS_FILE: &str = "settings.toml";
const MIN_TICK_MS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// MARK: Directories

/// `None` when the platform has no home directory to hang them on.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("in", "EduKhel", "edukhel")
}

/// Data directory (results, log), falling back to the working directory.
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

// MARK: Settings

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty preselected on the rules screen
    pub default_difficulty: Difficulty,
    /// Event poll interval in milliseconds
    pub tick_ms: u64,
    /// Append finished games to the results history
    pub record_results: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_difficulty: Difficulty::Medium,
            tick_ms: 50,
            record_results: true,
        }
    }
}

impl Settings {
    pub fn path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Reads `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Settings from the platform config directory. Problems are logged and
    /// the defaults used instead.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        Self::load_from(&path).unwrap_or_else(|err| {
            warn!("{err}; using default settings");
            Self::default()
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(MIN_TICK_MS))
    }
}
