//! Stable error codes shared across crates.

pub const CONFIG_IO: &str = "CONFIG_IO";
pub const CONFIG_PARSE: &str = "CONFIG_PARSE";
pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
pub const CACHE_IO: &str = "CACHE_IO";
pub const CACHE_SERIALIZATION: &str = "CACHE_SERIALIZATION";
pub const CACHE_INVALID_KEY: &str = "CACHE_INVALID_KEY";
pub const SQL_UNPARSEABLE: &str = "SQL_UNPARSEABLE";
pub const SQL_EMPTY: &str = "SQL_EMPTY";

/// Every error enum in the workspace maps its variants to one of the codes above.
pub trait TravelsErrorCode {
    fn error_code(&self) -> &'static str;
}
