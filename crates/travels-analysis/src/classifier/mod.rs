//! Statement classifier: one executed statement in, one flat record out.
//!
//! The SQL parser is isolated behind [`StatementClassifier`]; nothing outside
//! this module sees parser node types. Table and column names are lower-cased.

mod sql_adapter;

use serde::{Deserialize, Serialize};
use travels_core::errors::error_code::{self, TravelsErrorCode};
use travels_core::types::QueryKind;

pub use sql_adapter::SqlParserClassifier;

/// A join between two tables, as written in one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinEdge {
    pub left_table: String,
    /// The table introduced by the join clause.
    pub right_table: String,
    pub join_type: String,
    /// Empty when the ON condition did not name a column for this side.
    pub left_column: String,
    pub right_column: String,
}

/// A column reference with its owning table, when it could be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: Option<&str>, column: &str) -> Self {
        Self {
            table: table.map(str::to_string),
            column: column.to_string(),
        }
    }
}

/// Everything the accumulators need to know about one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementClassification {
    pub kind: QueryKind,
    /// Distinct referenced tables, in order of first appearance.
    pub tables: Vec<String>,
    pub joins: Vec<JoinEdge>,
    /// Target of an INSERT/UPDATE/DELETE.
    pub mutated_table: Option<String>,
    /// Columns read by the WHERE clause.
    pub where_columns: Vec<ColumnRef>,
    /// Left-hand sides of UPDATE ... SET assignments.
    pub set_columns: Vec<ColumnRef>,
}

impl StatementClassification {
    pub fn empty(kind: QueryKind) -> Self {
        Self {
            kind,
            tables: Vec::new(),
            joins: Vec::new(),
            mutated_table: None,
            where_columns: Vec::new(),
            set_columns: Vec::new(),
        }
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

/// Why a statement could not be classified. Callers skip the statement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("Unparseable SQL: {message}")]
    Unparseable { message: String },

    #[error("Empty SQL statement")]
    Empty,
}

impl TravelsErrorCode for ClassifyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unparseable { .. } => error_code::SQL_UNPARSEABLE,
            Self::Empty => error_code::SQL_EMPTY,
        }
    }
}

/// Capability interface over an SQL parser.
pub trait StatementClassifier {
    fn classify(&self, sql: &str) -> Result<StatementClassification, ClassifyError>;
}
