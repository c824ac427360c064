//! # travels-core
//!
//! Foundation crate for the schema-travels analysis engine.
//! Defines the data model, errors, config, logging setup, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::TravelsConfig;
pub use errors::error_code::TravelsErrorCode;
pub use types::collections::{FxHashMap, FxHashSet};
