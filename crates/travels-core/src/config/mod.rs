pub mod analysis_config;
pub mod cache_config;
pub mod logging_config;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use analysis_config::{AnalysisConfig, RuleThresholds};
pub use cache_config::{CacheConfig, CacheMode};
pub use logging_config::LoggingConfig;

use crate::errors::ConfigError;

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelsConfig {
    pub analysis: AnalysisConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

impl TravelsConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists (defaults otherwise), then apply
    /// `TRAVELS_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let raw = std::fs::read_to_string(p).map_err(|source| ConfigError::Io {
                    path: p.to_path_buf(),
                    source,
                })?;
                debug!(path = %p.display(), "loading config");
                toml::from_str(&raw)?
            }
            Some(p) => {
                info!(path = %p.display(), "config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in `load`).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("TRAVELS_CACHE_DIR") {
            debug!(key = "TRAVELS_CACHE_DIR", value = %dir, "config override");
            self.cache.dir = PathBuf::from(dir);
        }
        if let Some(mode) = lookup("TRAVELS_CACHE_MODE") {
            debug!(key = "TRAVELS_CACHE_MODE", value = %mode, "config override");
            self.cache.mode = mode.parse()?;
        }
        if let Some(model) = lookup("TRAVELS_MODEL") {
            debug!(key = "TRAVELS_MODEL", value = %model, "config override");
            self.cache.model = model;
        }
        if let Some(target) = lookup("TRAVELS_DEFAULT_TARGET") {
            debug!(key = "TRAVELS_DEFAULT_TARGET", value = %target, "config override");
            self.cache.default_target = target.parse()?;
        }
        if let Some(level) = lookup("TRAVELS_LOG_LEVEL") {
            debug!(key = "TRAVELS_LOG_LEVEL", value = %level, "config override");
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.hot_join_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "analysis.hot_join_limit".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        for (name, value) in self.analysis.thresholds.ratios() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field: format!("analysis.thresholds.{name}"),
                    reason: format!("{value} is outside [0, 1]"),
                });
            }
        }
        Ok(())
    }
}
