//! Recommendation cache errors.
//! Only write paths surface these; reads degrade to a cache miss.

use std::path::PathBuf;

use super::error_code::{self, TravelsErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid cache key '{key}': only [A-Za-z0-9_-] allowed")]
    InvalidKey { key: String },
}

impl TravelsErrorCode for CacheError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::CACHE_IO,
            Self::Serialization(_) => error_code::CACHE_SERIALIZATION,
            Self::InvalidKey { .. } => error_code::CACHE_INVALID_KEY,
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
