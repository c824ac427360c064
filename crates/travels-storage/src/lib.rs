//! # travels-storage
//!
//! Persistence for the recommendation pipeline: deterministic input
//! fingerprints and the file-backed cache keyed by them.

pub mod cache;
pub mod fingerprint;

pub use cache::{CacheComparison, CacheEntrySummary, RecommendationCache, RecommendationChange};
pub use fingerprint::compute_fingerprint;
