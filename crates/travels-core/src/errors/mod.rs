//! Error types for every subsystem, each carrying a stable error code.

pub mod cache_error;
pub mod config_error;
pub mod error_code;

pub use cache_error::{CacheError, CacheResult};
pub use config_error::ConfigError;
pub use error_code::TravelsErrorCode;
