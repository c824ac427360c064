//! Analysis and recommendation-rule configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_HOT_JOIN_LIMIT;

/// Configuration for the analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of hot joins reported by `get_hot_joins`. Default: 20.
    pub hot_join_limit: usize,
    /// Source database flavour recorded on the result. Default: "postgres".
    pub source_db_type: String,
    pub thresholds: RuleThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            hot_join_limit: DEFAULT_HOT_JOIN_LIMIT,
            source_db_type: "postgres".to_string(),
            thresholds: RuleThresholds::default(),
        }
    }
}

/// Every threshold used by the recommendation cascade and the
/// embedding-candidate count, in one place.
///
/// The `candidate_*` fields drive the summary count only and are tuned
/// independently of the cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    /// `max_children` above this forces REFERENCE. Default: 1000.
    pub unbounded_children: u64,
    /// `co_access_ratio` must exceed this to EMBED. Default: 0.7.
    pub embed_min_co_access: f64,
    /// Child `write_ratio` must stay below this to EMBED. Default: 0.3.
    pub embed_max_child_write_ratio: f64,
    /// A known `max_children` must stay below this to EMBED. Default: 100.
    pub embed_max_children: u64,
    /// Child independence above this yields REFERENCE. Default: 0.4.
    pub reference_min_child_independence: f64,
    /// Child `write_ratio` above this yields REFERENCE. Default: 0.5.
    pub reference_min_child_write_ratio: f64,
    /// Minimum co-access ratio for a candidate. Default: 0.7.
    pub candidate_min_co_access: f64,
    /// Child `write_ratio` above this disqualifies a candidate. Default: 0.5.
    pub candidate_max_child_write_ratio: f64,
    /// Both sides independent above this disqualifies a candidate. Default: 0.4.
    pub candidate_max_independence: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            unbounded_children: 1000,
            embed_min_co_access: 0.7,
            embed_max_child_write_ratio: 0.3,
            embed_max_children: 100,
            reference_min_child_independence: 0.4,
            reference_min_child_write_ratio: 0.5,
            candidate_min_co_access: 0.7,
            candidate_max_child_write_ratio: 0.5,
            candidate_max_independence: 0.4,
        }
    }
}

impl RuleThresholds {
    /// Ratio-valued fields with their names, for validation.
    pub fn ratios(&self) -> [(&'static str, f64); 7] {
        [
            ("embed_min_co_access", self.embed_min_co_access),
            ("embed_max_child_write_ratio", self.embed_max_child_write_ratio),
            ("reference_min_child_independence", self.reference_min_child_independence),
            ("reference_min_child_write_ratio", self.reference_min_child_write_ratio),
            ("candidate_min_co_access", self.candidate_min_co_access),
            ("candidate_max_child_write_ratio", self.candidate_max_child_write_ratio),
            ("candidate_max_independence", self.candidate_max_independence),
        ]
    }
}
