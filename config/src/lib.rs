//! Engine configuration.
//!
//! ```toml
//! [design]
//! enforce_polarity = true
//! root_locus = "0"
//!
//! [closure]
//! timeout_ms = 30000
//! cache_pairs = true
//!
//! [analysis]
//! low_complexity_max = 50
//! medium_complexity_max = 500
//! max_closure_score = 100000
//! ```
//!
//! Every section and every field is optional; missing values take the
//! defaults shown above.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable that replaces the default config location.
pub const CONFIG_ENV: &str = "LUDICS_CONFIG";

const fn default_true() -> bool {
    true
}

fn default_root_locus() -> String {
    "0".to_owned()
}

const fn default_timeout_ms() -> u64 {
    30_000
}

const fn default_low_max() -> u64 {
    50
}

const fn default_medium_max() -> u64 {
    500
}

const fn default_max_closure_score() -> u64 {
    100_000
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LudicsConfig {
    pub design: DesignConfig,
    pub closure: ClosureConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
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

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DesignConfig {
    /// Require polarity to alternate with depth below the design base.
    #[serde(default = "default_true")]
    pub enforce_polarity: bool,
    /// Base locus for designs created by dialogue compilation.
    #[serde(default = "default_root_locus")]
    pub root_locus: String,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            enforce_polarity: true,
            root_locus: default_root_locus(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClosureConfig {
    /// Wall-clock budget for one orthogonal or closure computation.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Memoize pair verdicts within one computation.
    #[serde(default = "default_true")]
    pub cache_pairs: bool,
}

impl ClosureConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClosureConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            cache_pairs: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisConfig {
    /// Highest score still classed as low complexity.
    #[serde(default = "default_low_max")]
    pub low_complexity_max: u64,
    #[serde(default = "default_medium_max")]
    pub medium_complexity_max: u64,
    /// Universes scoring above this are refused by closure.
    #[serde(default = "default_max_closure_score")]
    pub max_closure_score: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            low_complexity_max: default_low_max(),
            medium_complexity_max: default_medium_max(),
            max_closure_score: default_max_closure_score(),
        }
    }
}

impl LudicsConfig {
    /// Load from [`config_path`]. `Ok(None)` when no file exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
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
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// Like [`LudicsConfig::load`] but falls back to defaults when absent.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Self::load().map(Option::unwrap_or_default)
    }
}

/// `$LUDICS_CONFIG` if set and non-empty, else `~/.ludics/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Ok(raw) = env::var(CONFIG_ENV)
        && !raw.trim().is_empty()
    {
        return Some(PathBuf::from(raw));
    }
    dirs::home_dir().map(|home| home.join(".ludics").join("config.toml"))
}
