//! Data model shared by the analysis engine and the cache.

pub mod collections;
pub mod patterns;
pub mod recommendation;
pub mod schema;
pub mod statement;

pub use patterns::{
    AccessPattern, AnalysisResult, CardinalityHint, JoinPattern, MutationPattern, TablePair,
    TableStatistics,
};
pub use recommendation::{RecommendationMetrics, RelationshipDecision, SchemaRecommendation, TargetDatabase};
pub use schema::{ColumnDefinition, ForeignKeyDefinition, IndexDefinition, SchemaDefinition, TableDefinition};
pub use statement::{ExecutedStatement, QueryKind};
