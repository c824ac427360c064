//! Engine-wide constants.

/// Version tag of the recommendation logic.
/// Bump this when recommendation or fingerprint logic changes significantly;
/// cache entries written under another version are treated as misses.
pub const RECOMMENDATION_VERSION: &str = "1.2.0";

/// Default number of hot joins reported by the join-cost accumulator.
pub const DEFAULT_HOT_JOIN_LIMIT: usize = 20;

/// Number of most frequent columns kept per table in mutation reports.
pub const TOP_COLUMNS_PER_TABLE: usize = 5;

/// Number of filtered columns suggested per index recommendation.
pub const INDEX_RECOMMENDATION_COLUMNS: usize = 3;

/// Table names that never represent user data.
pub const PSEUDO_TABLES: &[&str] = &["dual", "sysibm.sysdummy1"];

/// Length of the hex fingerprint prefix used as a cache key.
pub const FINGERPRINT_HEX_LEN: usize = 16;

/// File name of the cache index inside the cache directory.
pub const CACHE_INDEX_FILE: &str = "index.json";
