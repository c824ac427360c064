//! Executed-statement records produced by the log collectors.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Statement family, decided from the leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Other => "OTHER",
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Self::Insert | Self::Update | Self::Delete)
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One statement as it was executed against the source database.
/// Immutable once built; the engine only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutedStatement {
    pub sql: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub duration_ms: Option<f64>,
    pub rows_affected: Option<u64>,
    pub user: Option<String>,
    pub database: Option<String>,
}

impl ExecutedStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Duration in milliseconds, 0 when the log line carried none.
    pub fn duration_or_zero(&self) -> f64 {
        self.duration_ms.unwrap_or(0.0)
    }

    /// Keyword-prefix classification of the raw text. Does not parse.
    pub fn query_kind(&self) -> QueryKind {
        let head: String = self
            .sql
            .trim_start()
            .chars()
            .take(6)
            .collect::<String>()
            .to_ascii_uppercase();
        match head.as_str() {
            "SELECT" => QueryKind::Select,
            "INSERT" => QueryKind::Insert,
            "UPDATE" => QueryKind::Update,
            "DELETE" => QueryKind::Delete,
            _ => QueryKind::Other,
        }
    }

    /// SQL with literals replaced by placeholders and whitespace collapsed.
    /// Statements differing only in literal values normalize identically.
    pub fn normalized_sql(&self) -> String {
        let (strings, numbers) = literal_patterns();
        let mut normalized = self.sql.clone();
        if let Some(re) = strings {
            normalized = re.replace_all(&normalized, "'?'").into_owned();
        }
        if let Some(re) = numbers {
            normalized = re.replace_all(&normalized, "?").into_owned();
        }
        normalized.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

fn literal_patterns() -> (Option<&'static Regex>, Option<&'static Regex>) {
    static STRINGS: OnceLock<Option<Regex>> = OnceLock::new();
    static NUMBERS: OnceLock<Option<Regex>> = OnceLock::new();
    let strings = STRINGS.get_or_init(|| Regex::new(r"'[^']*'").ok());
    let numbers = NUMBERS.get_or_init(|| Regex::new(r"\b\d+\b").ok());
    (strings.as_ref(), numbers.as_ref())
}
