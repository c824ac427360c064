//! Join-cost accumulator: per-pair join frequency/cost and per-table access counts.

use travels_core::types::{JoinPattern, TablePair, TableStatistics};
use travels_core::FxHashMap;

use crate::classifier::StatementClassification;

/// Folds classifications into join patterns and table statistics.
///
/// Keys are kept in first-seen order next to each map so that rankings with
/// equal scores come out in insertion order.
#[derive(Debug, Default)]
pub struct JoinCostAccumulator {
    joins: FxHashMap<TablePair, JoinPattern>,
    join_order: Vec<TablePair>,
    tables: FxHashMap<String, TableStatistics>,
    table_order: Vec<String>,
}

impl JoinCostAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one classified statement.
    ///
    /// Multi-table statements split `duration_ms` evenly across their tables.
    /// This is an approximation, not a per-table cost model.
    pub fn observe(&mut self, classification: &StatementClassification, duration_ms: f64) {
        let tables = &classification.tables;
        match tables.len() {
            0 => {}
            1 => {
                let stats = self.stats_mut(&tables[0]);
                stats.solo_accesses += 1;
                stats.total_accesses += 1;
                stats.total_time_ms += duration_ms;
            }
            n => {
                let share = duration_ms / n as f64;
                for table in tables {
                    let stats = self.stats_mut(table);
                    stats.joined_accesses += 1;
                    stats.total_accesses += 1;
                    stats.total_time_ms += share;
                }
            }
        }

        for edge in &classification.joins {
            let pair = TablePair::new(&edge.left_table, &edge.right_table);
            if !self.joins.contains_key(&pair) {
                // Columns follow the canonical (sorted) side order.
                let columns = if edge.left_table == pair.first {
                    (edge.left_column.clone(), edge.right_column.clone())
                } else {
                    (edge.right_column.clone(), edge.left_column.clone())
                };
                let pattern = JoinPattern::new(&pair, &edge.join_type, columns);
                self.join_order.push(pair.clone());
                self.joins.insert(pair.clone(), pattern);
            }
            if let Some(pattern) = self.joins.get_mut(&pair) {
                pattern.record(duration_ms);
            }
        }
    }

    fn stats_mut(&mut self, table: &str) -> &mut TableStatistics {
        if !self.tables.contains_key(table) {
            self.table_order.push(table.to_string());
        }
        self.tables
            .entry(table.to_string())
            .or_insert_with(|| TableStatistics::new(table))
    }

    /// Every join pattern, cost-descending, ties in insertion order.
    pub fn join_patterns(&self) -> Vec<JoinPattern> {
        let mut patterns: Vec<JoinPattern> = self
            .join_order
            .iter()
            .filter_map(|pair| self.joins.get(pair).cloned())
            .collect();
        // sort_by is stable.
        patterns.sort_by(|a, b| b.cost_score().total_cmp(&a.cost_score()));
        patterns
    }

    pub fn get_hot_joins(&self, top_n: usize) -> Vec<JoinPattern> {
        let mut patterns = self.join_patterns();
        patterns.truncate(top_n);
        patterns
    }

    /// Canonical pair → join frequency, in first-seen order.
    pub fn get_co_access_matrix(&self) -> Vec<(TablePair, u64)> {
        self.join_order
            .iter()
            .filter_map(|pair| self.joins.get(pair).map(|p| (pair.clone(), p.frequency)))
            .collect()
    }

    /// Per-table statistics in first-seen order.
    pub fn table_statistics(&self) -> Vec<TableStatistics> {
        self.table_order
            .iter()
            .filter_map(|table| self.tables.get(table).cloned())
            .collect()
    }

    pub fn join_count(&self) -> usize {
        self.joins.len()
    }
}
