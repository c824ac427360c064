//! Recommendation rule engine: one decision per access pattern.

pub mod rules;

use tracing::debug;
use travels_core::config::RuleThresholds;
use travels_core::types::{
    AccessPattern, AnalysisResult, CardinalityHint, RecommendationMetrics, SchemaRecommendation,
};
use travels_core::FxHashMap;

pub use rules::{apply_rules, PairSignals, Verdict, RULES};

/// Caller-supplied fan-out bounds keyed by `(parent, child)`. Either
/// orientation of a pair is accepted.
pub type CardinalityHints = FxHashMap<(String, String), CardinalityHint>;

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    thresholds: RuleThresholds,
}

impl RecommendationEngine {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    /// One recommendation per access pattern, confidence-descending. Equal
    /// confidences keep access-pattern order.
    pub fn recommend(
        &self,
        analysis: &AnalysisResult,
        hints: Option<&CardinalityHints>,
    ) -> Vec<SchemaRecommendation> {
        let mut recommendations: Vec<SchemaRecommendation> = analysis
            .access_patterns
            .iter()
            .map(|ap| self.evaluate_pair(ap, analysis, hints))
            .collect();
        recommendations.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        recommendations
    }

    pub fn evaluate_pair(
        &self,
        ap: &AccessPattern,
        analysis: &AnalysisResult,
        hints: Option<&CardinalityHints>,
    ) -> SchemaRecommendation {
        let signals = pair_signals(ap, analysis, hints);
        let (rule, verdict) = apply_rules(&signals, &self.thresholds);
        debug!(
            parent = %signals.parent,
            child = %signals.child,
            rule,
            decision = %verdict.decision,
            "pair evaluated"
        );

        SchemaRecommendation {
            parent_table: signals.parent,
            child_table: signals.child,
            decision: verdict.decision,
            confidence: verdict.confidence,
            reasoning: verdict.reasoning,
            warnings: verdict.warnings,
            metrics: RecommendationMetrics {
                co_access_ratio: signals.co_access_ratio,
                child_independence: signals.child_independence,
                child_write_ratio: signals.child_write_ratio,
                max_children: signals.max_children,
            },
        }
    }
}

/// Orient the pair (more independent side is the parent; ties make
/// `table_b` the parent) and gather the child's signals.
pub fn pair_signals(
    ap: &AccessPattern,
    analysis: &AnalysisResult,
    hints: Option<&CardinalityHints>,
) -> PairSignals {
    let (parent, child, child_independence) =
        if ap.table_a_independence() > ap.table_b_independence() {
            (&ap.table_a, &ap.table_b, ap.table_b_independence())
        } else {
            (&ap.table_b, &ap.table_a, ap.table_a_independence())
        };

    let child_write_ratio = analysis
        .mutation_for(child)
        .map(|m| m.write_ratio())
        .unwrap_or(0.0);

    let max_children = hints
        .and_then(|h| {
            h.get(&(parent.clone(), child.clone()))
                .or_else(|| h.get(&(child.clone(), parent.clone())))
        })
        .map(|hint| hint.max)
        .unwrap_or(0);

    PairSignals {
        parent: parent.clone(),
        child: child.clone(),
        co_access_ratio: ap.co_access_ratio(),
        child_independence,
        child_write_ratio,
        max_children,
    }
}
