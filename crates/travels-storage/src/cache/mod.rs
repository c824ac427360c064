//! File-backed recommendation cache keyed by input fingerprint.
//!
//! Reads never fail: a missing, unreadable, or stale entry is a miss. Writes
//! return [`CacheResult`]. No locking; concurrent writers to the same
//! fingerprint race and the last one wins.

pub mod compare;
pub mod entry;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use travels_core::config::CacheConfig;
use travels_core::constants::{CACHE_INDEX_FILE, RECOMMENDATION_VERSION};
use travels_core::errors::{CacheError, CacheResult};
use travels_core::types::SchemaRecommendation;

pub use compare::{compare_recommendations, CacheComparison, ChangeKind, RecommendationChange};
pub use entry::{CacheEntry, CacheEntrySummary, CacheIndex, IndexEntry};

const DEFAULT_MODEL: &str = "rule-engine";

#[derive(Debug)]
pub struct RecommendationCache {
    dir: PathBuf,
    model: String,
    index: CacheIndex,
}

impl RecommendationCache {
    /// Open (creating if needed) a cache directory. An unreadable index is
    /// logged and replaced by an empty one.
    pub fn open(dir: impl Into<PathBuf>) -> CacheResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CacheError::Io {
            path: dir.clone(),
            source,
        })?;
        let index_path = dir.join(CACHE_INDEX_FILE);
        let index = if index_path.exists() {
            read_json::<CacheIndex>(&index_path).unwrap_or_else(|| {
                warn!(path = %index_path.display(), "unreadable cache index, starting empty");
                CacheIndex::default()
            })
        } else {
            CacheIndex::default()
        };
        debug!(dir = %dir.display(), entries = index.entries.len(), "cache opened");
        Ok(Self {
            dir,
            model: DEFAULT_MODEL.to_string(),
            index,
        })
    }

    pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
        Ok(Self::open(&config.dir)?.with_model(&config.model))
    }

    /// Producer identity recorded on every `put`.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.index.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.entries.is_empty()
    }

    fn entry_path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{fingerprint}.json"))
    }

    /// Cached recommendations, or `None` on a miss. Entries written under a
    /// different engine version are misses but stay on disk.
    pub fn get(&self, fingerprint: &str) -> Option<Vec<SchemaRecommendation>> {
        if !is_valid_key(fingerprint) {
            return None;
        }
        let Some(indexed) = self.index.entries.get(fingerprint) else {
            debug!(fingerprint, "cache miss");
            return None;
        };
        if indexed.version != RECOMMENDATION_VERSION {
            info!(fingerprint, version = %indexed.version, "cache entry stale (version mismatch)");
            return None;
        }

        let path = self.entry_path(fingerprint);
        if !path.exists() {
            warn!(path = %path.display(), "cache entry file missing");
            return None;
        }
        let Some(entry) = read_json::<CacheEntry>(&path) else {
            warn!(path = %path.display(), "unreadable cache entry");
            return None;
        };
        if !entry.is_current() {
            info!(fingerprint, version = %entry.version, "cache entry stale (version mismatch)");
            return None;
        }

        info!(fingerprint, count = entry.recommendations.len(), "cache hit");
        Some(entry.recommendations)
    }

    /// Store `recommendations` under `fingerprint`, replacing any previous entry.
    pub fn put(
        &mut self,
        fingerprint: &str,
        recommendations: &[SchemaRecommendation],
        metadata: Option<serde_json::Value>,
    ) -> CacheResult<()> {
        if !is_valid_key(fingerprint) {
            return Err(CacheError::InvalidKey {
                key: fingerprint.to_string(),
            });
        }
        let entry = CacheEntry {
            input_hash: fingerprint.to_string(),
            version: RECOMMENDATION_VERSION.to_string(),
            model: self.model.clone(),
            timestamp: Utc::now(),
            recommendations: recommendations.to_vec(),
            metadata: metadata.unwrap_or_else(|| serde_json::json!({})),
        };
        write_json(&self.entry_path(fingerprint), &entry)?;

        self.index.entries.insert(
            fingerprint.to_string(),
            IndexEntry {
                version: entry.version,
                model: entry.model,
                timestamp: entry.timestamp,
                num_recommendations: recommendations.len(),
            },
        );
        self.save_index()?;
        info!(fingerprint, count = recommendations.len(), "cached recommendations");
        Ok(())
    }

    /// Remove one entry. `false` if it was not indexed.
    pub fn invalidate(&mut self, fingerprint: &str) -> CacheResult<bool> {
        if self.index.entries.remove(fingerprint).is_none() {
            return Ok(false);
        }
        self.save_index()?;
        let path = self.entry_path(fingerprint);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| CacheError::Io { path, source })?;
        }
        info!(fingerprint, "cache entry invalidated");
        Ok(true)
    }

    /// Remove every entry file (stale ones included) and reset the index.
    /// Returns the number of indexed entries before the reset.
    pub fn invalidate_all(&mut self) -> CacheResult<usize> {
        let count = self.index.entries.len();
        let dir_err = |source| CacheError::Io {
            path: self.dir.clone(),
            source,
        };
        for item in fs::read_dir(&self.dir).map_err(dir_err)? {
            let path = item.map_err(dir_err)?.path();
            let is_entry = path.extension().is_some_and(|ext| ext == "json")
                && path.file_name().is_some_and(|name| name != CACHE_INDEX_FILE);
            if is_entry {
                fs::remove_file(&path).map_err(|source| CacheError::Io { path, source })?;
            }
        }
        self.index = CacheIndex::default();
        self.save_index()?;
        info!(count, "cache cleared");
        Ok(count)
    }

    /// Index summaries, sorted by fingerprint. Entry files are not read.
    pub fn list_entries(&self) -> Vec<CacheEntrySummary> {
        self.index
            .entries
            .iter()
            .map(|(fp, entry)| CacheEntrySummary::from_index(fp, entry))
            .collect()
    }

    /// Diff two entries. A missing or stale side compares as empty.
    pub fn compare(&self, fingerprint_a: &str, fingerprint_b: &str) -> CacheComparison {
        let a = self.get(fingerprint_a).unwrap_or_default();
        let b = self.get(fingerprint_b).unwrap_or_default();
        compare_recommendations(fingerprint_a, &a, fingerprint_b, &b)
    }

    fn save_index(&self) -> CacheResult<()> {
        write_json(&self.dir.join(CACHE_INDEX_FILE), &self.index)
    }
}

/// Fingerprints become file names; keep them to a safe alphabet.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> CacheResult<()> {
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })
}
