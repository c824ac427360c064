//! Mutation accumulator: per-table read/write counters and touched columns.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use travels_core::constants::{INDEX_RECOMMENDATION_COLUMNS, TOP_COLUMNS_PER_TABLE};
use travels_core::types::{MutationPattern, QueryKind};
use travels_core::FxHashMap;

use crate::classifier::{ColumnRef, StatementClassification};

/// `write_ratio` above this makes a write-heavy warning high severity.
const HIGH_SEVERITY_WRITE_RATIO: f64 = 0.7;

// ─── Report types ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    High,
    Medium,
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
        })
    }
}

/// A reason not to embed a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingWarning {
    pub table: String,
    pub warning: String,
    pub severity: WarningSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecommendation {
    pub table: String,
    pub columns: Vec<String>,
    pub reason: String,
}

/// One table's line in the mutation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMutationSummary {
    pub table: String,
    pub reads: u64,
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
    pub total_operations: u64,
    pub write_ratio: f64,
    pub read_ratio: f64,
    pub is_read_heavy: bool,
    pub is_write_heavy: bool,
    pub is_update_heavy: bool,
    pub frequently_updated_columns: Vec<String>,
    pub frequently_filtered_columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationReport {
    /// Sorted by total operations, descending.
    pub tables: Vec<TableMutationSummary>,
    pub embedding_warnings: Vec<EmbeddingWarning>,
    pub index_recommendations: Vec<IndexRecommendation>,
}

impl MutationReport {
    pub fn warnings_for<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = &'a EmbeddingWarning> + 'a {
        self.embedding_warnings.iter().filter(move |w| w.table == table)
    }
}

// ─── Column counting ────────────────────────────────────────────────────────

/// Column → occurrence count, remembering first-seen order for tie-breaks.
#[derive(Debug, Clone, Default)]
struct ColumnCounter {
    index: FxHashMap<String, usize>,
    counts: Vec<(String, u64)>,
}

impl ColumnCounter {
    fn bump(&mut self, column: &str) {
        match self.index.get(column) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(column.to_string(), self.counts.len());
                self.counts.push((column.to_string(), 1));
            }
        }
    }

    fn top(&self, n: usize) -> Vec<String> {
        let mut ranked: Vec<&(String, u64)> = self.counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(n).map(|(c, _)| c.clone()).collect()
    }
}

// ─── Accumulator ────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MutationAccumulator {
    patterns: FxHashMap<String, MutationPattern>,
    order: Vec<String>,
    updated: FxHashMap<String, ColumnCounter>,
    filtered: FxHashMap<String, ColumnCounter>,
}

impl MutationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, classification: &StatementClassification, duration_ms: f64) {
        match classification.kind {
            QueryKind::Select => self.observe_select(classification, duration_ms),
            QueryKind::Insert | QueryKind::Update | QueryKind::Delete => {
                self.observe_write(classification, duration_ms)
            }
            QueryKind::Other => {}
        }
    }

    fn observe_select(&mut self, classification: &StatementClassification, duration_ms: f64) {
        let tables = &classification.tables;
        if tables.is_empty() {
            return;
        }
        // Same even split as the join-cost accumulator.
        let share = duration_ms / tables.len() as f64;
        for table in tables {
            let pattern = self.pattern_mut(table);
            pattern.select_count += 1;
            pattern.total_time_ms += share;
        }
        self.record_filtered(&classification.where_columns, tables);
    }

    fn observe_write(&mut self, classification: &StatementClassification, duration_ms: f64) {
        let Some(table) = classification.mutated_table.clone() else {
            debug!(kind = %classification.kind, "mutated table not identified, skipping");
            return;
        };
        let pattern = self.pattern_mut(&table);
        match classification.kind {
            QueryKind::Insert => pattern.insert_count += 1,
            QueryKind::Update => pattern.update_count += 1,
            _ => pattern.delete_count += 1,
        }
        pattern.total_time_ms += duration_ms;

        if classification.kind == QueryKind::Update {
            for column in &classification.set_columns {
                let owner = column.table.as_deref().unwrap_or(&table);
                self.updated.entry(owner.to_string()).or_default().bump(&column.column);
            }
        }
        if classification.kind != QueryKind::Insert {
            self.record_filtered(&classification.where_columns, std::slice::from_ref(&table));
        }
    }

    /// Attribute a WHERE column to a table when its qualifier names an
    /// in-scope table, or when it is unqualified and only one table is in
    /// scope. Columns qualified with an out-of-scope table are dropped.
    fn record_filtered(&mut self, columns: &[ColumnRef], scope: &[String]) {
        for column in columns {
            let owner = match column.table.as_deref() {
                Some(t) if scope.iter().any(|s| s == t) => t,
                None if scope.len() == 1 => scope[0].as_str(),
                _ => continue,
            };
            self.filtered.entry(owner.to_string()).or_default().bump(&column.column);
        }
    }

    fn pattern_mut(&mut self, table: &str) -> &mut MutationPattern {
        if !self.patterns.contains_key(table) {
            self.order.push(table.to_string());
        }
        self.patterns
            .entry(table.to_string())
            .or_insert_with(|| MutationPattern::new(table))
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    /// All patterns in first-seen order.
    pub fn mutation_patterns(&self) -> Vec<MutationPattern> {
        self.order
            .iter()
            .filter_map(|t| self.patterns.get(t).cloned())
            .collect()
    }

    pub fn get(&self, table: &str) -> Option<&MutationPattern> {
        self.patterns.get(table)
    }

    pub fn top_filtered_columns(&self, table: &str, n: usize) -> Vec<String> {
        self.filtered.get(table).map(|c| c.top(n)).unwrap_or_default()
    }

    pub fn top_updated_columns(&self, table: &str, n: usize) -> Vec<String> {
        self.updated.get(table).map(|c| c.top(n)).unwrap_or_default()
    }

    /// Tables whose write ratio exceeds `threshold`, first-seen order.
    pub fn write_heavy_tables(&self, threshold: f64) -> Vec<String> {
        self.iter_ordered()
            .filter(|p| p.write_ratio() > threshold)
            .map(|p| p.table.clone())
            .collect()
    }

    pub fn update_heavy_tables(&self) -> Vec<String> {
        self.iter_ordered()
            .filter(|p| p.is_update_heavy())
            .map(|p| p.table.clone())
            .collect()
    }

    fn iter_ordered(&self) -> impl Iterator<Item = &MutationPattern> {
        self.order.iter().filter_map(|t| self.patterns.get(t))
    }

    pub fn get_mutation_report(&self) -> MutationReport {
        let mut ranked: Vec<&MutationPattern> = self.iter_ordered().collect();
        ranked.sort_by(|a, b| b.total_operations().cmp(&a.total_operations()));

        let mut report = MutationReport::default();
        for pattern in ranked {
            let table = pattern.table.as_str();
            let filtered = self.top_filtered_columns(table, TOP_COLUMNS_PER_TABLE);

            report.tables.push(TableMutationSummary {
                table: table.to_string(),
                reads: pattern.select_count,
                inserts: pattern.insert_count,
                updates: pattern.update_count,
                deletes: pattern.delete_count,
                total_operations: pattern.total_operations(),
                write_ratio: pattern.write_ratio(),
                read_ratio: pattern.read_ratio(),
                is_read_heavy: pattern.is_read_heavy(),
                is_write_heavy: pattern.is_write_heavy(),
                is_update_heavy: pattern.is_update_heavy(),
                frequently_updated_columns: self.top_updated_columns(table, TOP_COLUMNS_PER_TABLE),
                frequently_filtered_columns: filtered.clone(),
            });

            if pattern.is_write_heavy() {
                let severity = if pattern.write_ratio() > HIGH_SEVERITY_WRITE_RATIO {
                    WarningSeverity::High
                } else {
                    WarningSeverity::Medium
                };
                report.embedding_warnings.push(EmbeddingWarning {
                    table: table.to_string(),
                    warning: format!(
                        "High write ratio ({:.0}%). Embedding this table may cause update complexity.",
                        pattern.write_ratio() * 100.0
                    ),
                    severity,
                });
            }
            if pattern.is_update_heavy() {
                report.embedding_warnings.push(EmbeddingWarning {
                    table: table.to_string(),
                    warning: format!(
                        "Update-heavy table ({} updates vs {} inserts). Consider keeping separate.",
                        pattern.update_count, pattern.insert_count
                    ),
                    severity: WarningSeverity::Medium,
                });
            }

            if !filtered.is_empty() {
                report.index_recommendations.push(IndexRecommendation {
                    table: table.to_string(),
                    columns: filtered.into_iter().take(INDEX_RECOMMENDATION_COLUMNS).collect(),
                    reason: "Frequently used in WHERE clauses".to_string(),
                });
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ties_break_by_first_seen() {
        let mut counter = ColumnCounter::default();
        for col in ["status", "id", "email", "id", "status"] {
            counter.bump(col);
        }
        assert_eq!(counter.top(5), vec!["status", "id", "email"]);
        assert_eq!(counter.top(1), vec!["status"]);
    }

    #[test]
    fn test_write_without_target_is_skipped() {
        let mut acc = MutationAccumulator::new();
        acc.observe(&StatementClassification::empty(QueryKind::Delete), 3.0);
        assert!(acc.mutation_patterns().is_empty());
    }
}
