//! Access-pattern evidence derived from one analysis run.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unordered table pair, canonicalized by lexicographic sort so that
/// `(a, b)` and `(b, a)` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TablePair {
    pub first: String,
    pub second: String,
}

impl TablePair {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self { first: a.to_string(), second: b.to_string() }
        } else {
            Self { first: b.to_string(), second: a.to_string() }
        }
    }

    pub fn contains(&self, table: &str) -> bool {
        self.first == table || self.second == table
    }
}

impl fmt::Display for TablePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.first, self.second)
    }
}

/// Join activity between two tables, accumulated over every statement that joins them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinPattern {
    /// Lexicographically smaller table of the pair.
    pub left_table: String,
    pub right_table: String,
    pub join_type: String,
    /// Representative `(left, right)` column pair from the first observed join.
    pub join_columns: (String, String),
    pub frequency: u64,
    pub total_time_ms: f64,
    pub avg_time_ms: f64,
}

impl JoinPattern {
    pub fn new(pair: &TablePair, join_type: &str, join_columns: (String, String)) -> Self {
        Self {
            left_table: pair.first.clone(),
            right_table: pair.second.clone(),
            join_type: join_type.to_string(),
            join_columns,
            frequency: 0,
            total_time_ms: 0.0,
            avg_time_ms: 0.0,
        }
    }

    /// Add one occurrence. Keeps `avg_time_ms == total_time_ms / frequency`.
    pub fn record(&mut self, duration_ms: f64) {
        self.frequency += 1;
        self.total_time_ms += duration_ms;
        self.avg_time_ms = self.total_time_ms / self.frequency as f64;
    }

    /// Higher score = more impactful to address.
    pub fn cost_score(&self) -> f64 {
        self.frequency as f64 * self.avg_time_ms
    }

    pub fn table_pair(&self) -> TablePair {
        TablePair::new(&self.left_table, &self.right_table)
    }
}

/// Read/write counters for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationPattern {
    pub table: String,
    pub select_count: u64,
    pub insert_count: u64,
    pub update_count: u64,
    pub delete_count: u64,
    pub total_time_ms: f64,
}

impl MutationPattern {
    /// `read_ratio` above this marks a table read-heavy.
    pub const READ_HEAVY_RATIO: f64 = 0.7;
    /// `write_ratio` above this marks a table write-heavy.
    pub const WRITE_HEAVY_RATIO: f64 = 0.5;

    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Default::default()
        }
    }

    pub fn total_writes(&self) -> u64 {
        self.insert_count + self.update_count + self.delete_count
    }

    pub fn total_operations(&self) -> u64 {
        self.select_count + self.total_writes()
    }

    /// 0.0 for a table with no operations.
    pub fn write_ratio(&self) -> f64 {
        self.total_writes() as f64 / self.total_operations().max(1) as f64
    }

    pub fn read_ratio(&self) -> f64 {
        1.0 - self.write_ratio()
    }

    pub fn is_read_heavy(&self) -> bool {
        self.read_ratio() > Self::READ_HEAVY_RATIO
    }

    pub fn is_write_heavy(&self) -> bool {
        self.write_ratio() > Self::WRITE_HEAVY_RATIO
    }

    /// Updates dominate inserts more than two to one.
    pub fn is_update_heavy(&self) -> bool {
        self.update_count > self.insert_count * 2
    }
}

/// How a table is accessed: alone or as part of a multi-table statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableStatistics {
    pub table: String,
    pub total_accesses: u64,
    pub solo_accesses: u64,
    pub joined_accesses: u64,
    pub total_time_ms: f64,
    pub frequently_filtered_columns: Vec<String>,
    pub frequently_updated_columns: Vec<String>,
}

impl TableStatistics {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Default::default()
        }
    }

    pub fn solo_ratio(&self) -> f64 {
        self.solo_accesses as f64 / self.total_accesses.max(1) as f64
    }
}

/// Co-access statistics for an unordered table pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessPattern {
    pub table_a: String,
    pub table_b: String,
    pub co_access_count: u64,
    pub table_a_solo_count: u64,
    pub table_b_solo_count: u64,
}

impl AccessPattern {
    pub fn table_pair(&self) -> TablePair {
        TablePair::new(&self.table_a, &self.table_b)
    }

    fn total_a(&self) -> u64 {
        self.co_access_count + self.table_a_solo_count
    }

    fn total_b(&self) -> u64 {
        self.co_access_count + self.table_b_solo_count
    }

    /// `co_access / min(total_a, total_b)`; 0.0 when neither table was seen.
    pub fn co_access_ratio(&self) -> f64 {
        let min_total = self.total_a().min(self.total_b());
        self.co_access_count as f64 / min_total.max(1) as f64
    }

    /// Fraction of `table_a` accesses made without `table_b`.
    pub fn table_a_independence(&self) -> f64 {
        self.table_a_solo_count as f64 / self.total_a().max(1) as f64
    }

    /// Fraction of `table_b` accesses made without `table_a`.
    pub fn table_b_independence(&self) -> f64 {
        self.table_b_solo_count as f64 / self.total_b().max(1) as f64
    }
}

/// Caller-supplied fan-out bounds for a parent/child relationship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CardinalityHint {
    pub avg: f64,
    pub max: u64,
}

/// Everything one analysis run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub created_at: DateTime<Utc>,
    pub source_db_type: String,
    /// All statements handed to the run, parseable or not.
    pub total_queries_analyzed: u64,
    /// Statements the classifier could not parse.
    pub skipped_statements: u64,

    /// Ordered by cost score, descending.
    pub join_patterns: Vec<JoinPattern>,
    /// First-seen order.
    pub mutation_patterns: Vec<MutationPattern>,
    /// Ordered by co-access ratio, descending.
    pub access_patterns: Vec<AccessPattern>,
    pub table_statistics: Vec<TableStatistics>,

    pub tables_analyzed: Vec<String>,
    pub hot_joins_count: usize,
    pub embedding_candidates_count: usize,
}

impl AnalysisResult {
    pub fn mutation_for(&self, table: &str) -> Option<&MutationPattern> {
        self.mutation_patterns.iter().find(|m| m.table == table)
    }

    pub fn statistics_for(&self, table: &str) -> Option<&TableStatistics> {
        self.table_statistics.iter().find(|s| s.table == table)
    }

    pub fn join_for(&self, pair: &TablePair) -> Option<&JoinPattern> {
        self.join_patterns.iter().find(|j| &j.table_pair() == pair)
    }
}
