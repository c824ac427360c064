//! # travels-analysis
//!
//! Access-pattern analysis engine: statement classification, join-cost and
//! mutation accumulation, co-access synthesis, and the relationship rule
//! cascade that turns the evidence into migration recommendations.

pub mod access;
pub mod analyzer;
pub mod classifier;
pub mod hot_joins;
pub mod mutations;
pub mod recommendations;

pub use analyzer::{summary, PatternAnalyzer};
pub use classifier::{
    ClassifyError, ColumnRef, JoinEdge, SqlParserClassifier, StatementClassification,
    StatementClassifier,
};
pub use mutations::{MutationReport, WarningSeverity};
pub use recommendations::{CardinalityHints, RecommendationEngine};
