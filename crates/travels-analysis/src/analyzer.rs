//! Pattern analyzer: one batch pass over a statement log.
//!
//! Each statement is classified once; the classification feeds both
//! accumulators. Derived patterns are read only after the whole log is folded.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use chrono::Utc;
use tracing::{debug, info};
use travels_core::config::{AnalysisConfig, RuleThresholds};
use travels_core::constants::TOP_COLUMNS_PER_TABLE;
use travels_core::types::{
    AccessPattern, AnalysisResult, ExecutedStatement, JoinPattern, SchemaRecommendation,
};
use uuid::Uuid;

use crate::access::synthesize_access_patterns;
use crate::classifier::{SqlParserClassifier, StatementClassifier};
use crate::hot_joins::JoinCostAccumulator;
use crate::mutations::{MutationAccumulator, MutationReport};
use crate::recommendations::{CardinalityHints, RecommendationEngine};

pub struct PatternAnalyzer<C = SqlParserClassifier> {
    classifier: C,
    config: AnalysisConfig,
    joins: JoinCostAccumulator,
    mutations: MutationAccumulator,
}

impl PatternAnalyzer<SqlParserClassifier> {
    /// Analyzer with the `sqlparser` classifier for `config.source_db_type`.
    pub fn new(config: AnalysisConfig) -> Self {
        let classifier = SqlParserClassifier::for_source(&config.source_db_type);
        Self::with_classifier(classifier, config)
    }
}

impl Default for PatternAnalyzer<SqlParserClassifier> {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl<C: StatementClassifier> PatternAnalyzer<C> {
    pub fn with_classifier(classifier: C, config: AnalysisConfig) -> Self {
        Self {
            classifier,
            config,
            joins: JoinCostAccumulator::new(),
            mutations: MutationAccumulator::new(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Fold `statements` and derive every pattern. Accumulators are reset
    /// first, so the hot-join and mutation-report accessors describe the
    /// most recent call.
    pub fn analyze(&mut self, statements: &[ExecutedStatement]) -> AnalysisResult {
        self.joins = JoinCostAccumulator::new();
        self.mutations = MutationAccumulator::new();

        let mut skipped = 0u64;
        for statement in statements {
            match self.classifier.classify(&statement.sql) {
                Ok(classification) => {
                    let duration = statement.duration_or_zero();
                    self.joins.observe(&classification, duration);
                    self.mutations.observe(&classification, duration);
                }
                Err(e) => {
                    skipped += 1;
                    debug!(
                        kind = %statement.query_kind(),
                        sql = %statement.normalized_sql(),
                        error = %e,
                        "skipping statement"
                    );
                }
            }
        }

        let join_patterns = self.joins.join_patterns();
        let mutation_patterns = self.mutations.mutation_patterns();
        let mut table_statistics = self.joins.table_statistics();
        for stats in &mut table_statistics {
            stats.frequently_filtered_columns =
                self.mutations.top_filtered_columns(&stats.table, TOP_COLUMNS_PER_TABLE);
            stats.frequently_updated_columns =
                self.mutations.top_updated_columns(&stats.table, TOP_COLUMNS_PER_TABLE);
        }
        let access_patterns =
            synthesize_access_patterns(&self.joins.get_co_access_matrix(), &table_statistics);

        let tables_analyzed: Vec<String> = join_patterns
            .iter()
            .flat_map(|jp| [jp.left_table.clone(), jp.right_table.clone()])
            .chain(mutation_patterns.iter().map(|mp| mp.table.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut result = AnalysisResult {
            analysis_id: Uuid::new_v4().simple().to_string()[..8].to_string(),
            created_at: Utc::now(),
            source_db_type: self.config.source_db_type.clone(),
            total_queries_analyzed: statements.len() as u64,
            skipped_statements: skipped,
            hot_joins_count: join_patterns.iter().filter(|jp| jp.cost_score() > 0.0).count(),
            join_patterns,
            mutation_patterns,
            access_patterns,
            table_statistics,
            tables_analyzed,
            embedding_candidates_count: 0,
        };
        result.embedding_candidates_count = self.count_embedding_candidates(&result);

        info!(
            analysis_id = %result.analysis_id,
            statements = result.total_queries_analyzed,
            skipped = result.skipped_statements,
            tables = result.tables_analyzed.len(),
            joins = result.join_patterns.len(),
            "analysis complete"
        );
        result
    }

    /// Top joins by cost score, capped at `hot_join_limit`.
    pub fn hot_joins(&self) -> Vec<JoinPattern> {
        self.joins.get_hot_joins(self.config.hot_join_limit)
    }

    pub fn mutation_report(&self) -> MutationReport {
        self.mutations.get_mutation_report()
    }

    pub fn write_heavy_tables(&self, threshold: f64) -> Vec<String> {
        self.mutations.write_heavy_tables(threshold)
    }

    pub fn update_heavy_tables(&self) -> Vec<String> {
        self.mutations.update_heavy_tables()
    }

    /// Summary-only count of likely embedding pairs. Not a decision source;
    /// [`RecommendationEngine`] is authoritative.
    pub fn count_embedding_candidates(&self, result: &AnalysisResult) -> usize {
        let t = &self.config.thresholds;
        result
            .access_patterns
            .iter()
            .filter(|ap| is_embedding_candidate(ap, result, t))
            .count()
    }

    /// Run the rule engine over `result` with this analyzer's thresholds.
    pub fn recommend(
        &self,
        result: &AnalysisResult,
        hints: Option<&CardinalityHints>,
    ) -> Vec<SchemaRecommendation> {
        RecommendationEngine::new(self.config.thresholds.clone()).recommend(result, hints)
    }
}

fn is_embedding_candidate(
    ap: &AccessPattern,
    result: &AnalysisResult,
    t: &RuleThresholds,
) -> bool {
    if ap.co_access_ratio() < t.candidate_min_co_access {
        return false;
    }
    let (a, b) = (ap.table_a_independence(), ap.table_b_independence());
    let child = if a < b { &ap.table_a } else { &ap.table_b };
    if result
        .mutation_for(child)
        .is_some_and(|m| m.write_ratio() > t.candidate_max_child_write_ratio)
    {
        return false;
    }
    // Ruled out only when both sides are mostly queried alone.
    !(a > t.candidate_max_independence && b > t.candidate_max_independence)
}

// ─── Summary ────────────────────────────────────────────────────────────────

const SUMMARY_ROWS: usize = 10;

/// Human-readable report of one analysis run.
pub fn summary(result: &AnalysisResult) -> String {
    let heavy = "=".repeat(60);
    let light = "-".repeat(40);
    let mut out = String::new();

    let _ = writeln!(out, "{heavy}\nACCESS PATTERN ANALYSIS SUMMARY\n{heavy}\n");
    let _ = writeln!(out, "Analysis ID: {}", result.analysis_id);
    let _ = writeln!(out, "Source DB Type: {}", result.source_db_type);
    let _ = writeln!(out, "Queries Analyzed: {}", thousands(result.total_queries_analyzed));
    if result.skipped_statements > 0 {
        let _ = writeln!(out, "Skipped (unparseable): {}", thousands(result.skipped_statements));
    }
    let _ = writeln!(out, "Tables Found: {}\n", result.tables_analyzed.len());

    let _ = writeln!(out, "{light}\nHOT JOINS (Top {SUMMARY_ROWS} by cost score)\n{light}");
    for jp in result.join_patterns.iter().take(SUMMARY_ROWS) {
        let _ = writeln!(
            out,
            "  {} <-> {}: {} calls, {:.1}ms avg",
            jp.left_table,
            jp.right_table,
            thousands(jp.frequency),
            jp.avg_time_ms
        );
    }

    let _ = writeln!(out, "\n{light}\nMUTATION PATTERNS (Top {SUMMARY_ROWS} by operations)\n{light}");
    let mut by_ops: Vec<_> = result.mutation_patterns.iter().collect();
    by_ops.sort_by(|a, b| b.total_operations().cmp(&a.total_operations()));
    for mp in by_ops.into_iter().take(SUMMARY_ROWS) {
        let _ = writeln!(
            out,
            "  {}: R={} W={} ({:.0}% writes)",
            mp.table,
            thousands(mp.select_count),
            thousands(mp.total_writes()),
            mp.write_ratio() * 100.0
        );
    }

    let _ = writeln!(out, "\n{light}\nEMBEDDING CANDIDATES\n{light}");
    let _ = writeln!(out, "  Potential candidates: {}\n", result.embedding_candidates_count);
    out.push_str(&heavy);
    out
}

/// `1234567` → `"1,234,567"`.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separator() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }
}
