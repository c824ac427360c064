//! Recommendation cache configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::TargetDatabase;

/// Fingerprint precision, trading exactness for stability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Any change in join frequencies or rounded write ratios is a miss.
    Strict,
    /// Only changes in pattern shape (join pairs, hot-join membership,
    /// read/write classification) are a miss.
    #[default]
    Relaxed,
}

impl CacheMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Relaxed => "relaxed",
        }
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "relaxed" => Ok(Self::Relaxed),
            other => Err(ConfigError::Invalid {
                field: "cache.mode".to_string(),
                reason: format!("expected 'strict' or 'relaxed', got '{other}'"),
            }),
        }
    }
}

/// Configuration for the on-disk recommendation cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory. Default: `~/.schema-travels/cache`.
    pub dir: PathBuf,
    pub mode: CacheMode,
    /// Identity of the recommendation producer stored with each entry.
    pub model: String,
    pub default_target: TargetDatabase,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            mode: CacheMode::default(),
            model: "rule-engine".to_string(),
            default_target: TargetDatabase::default(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    let base = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(".schema-travels").join("cache")
}
