//! On-disk shapes: `<dir>/index.json` and one `<dir>/<fingerprint>.json` per entry.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use travels_core::constants::RECOMMENDATION_VERSION;
use travels_core::types::SchemaRecommendation;

/// Full cache entry, stored as `<fingerprint>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub input_hash: String,
    pub version: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
    pub recommendations: Vec<SchemaRecommendation>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl CacheEntry {
    pub fn is_current(&self) -> bool {
        self.version == RECOMMENDATION_VERSION
    }
}

/// Index line for one entry. Enough to list entries without loading them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub version: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
    pub num_recommendations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheIndex {
    #[serde(default = "current_version")]
    pub version: String,
    #[serde(default)]
    pub entries: BTreeMap<String, IndexEntry>,
}

impl Default for CacheIndex {
    fn default() -> Self {
        Self {
            version: current_version(),
            entries: BTreeMap::new(),
        }
    }
}

fn current_version() -> String {
    RECOMMENDATION_VERSION.to_string()
}

/// One row of [`super::RecommendationCache::list_entries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntrySummary {
    pub fingerprint: String,
    pub version: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
    pub num_recommendations: usize,
}

impl CacheEntrySummary {
    pub(crate) fn from_index(fingerprint: &str, entry: &IndexEntry) -> Self {
        Self {
            fingerprint: fingerprint.to_string(),
            version: entry.version.clone(),
            model: entry.model.clone(),
            timestamp: entry.timestamp,
            num_recommendations: entry.num_recommendations,
        }
    }
}
