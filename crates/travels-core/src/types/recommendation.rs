//! Relationship recommendations for the target document model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// How a parent/child relationship should be modelled in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipDecision {
    /// Nest the child inside the parent document.
    Embed,
    /// Keep the child in its own collection, linked by id.
    Reference,
    /// Keep both entities fully separate. Only produced by the external advisor.
    Separate,
    /// Time-series bucketing. Only produced by the external advisor.
    Bucket,
    /// Not enough signal; needs manual review.
    Evaluate,
}

impl RelationshipDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embed => "embed",
            Self::Reference => "reference",
            Self::Separate => "separate",
            Self::Bucket => "bucket",
            Self::Evaluate => "evaluate",
        }
    }
}

impl fmt::Display for RelationshipDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipDecision {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "embed" => Ok(Self::Embed),
            "reference" => Ok(Self::Reference),
            "separate" => Ok(Self::Separate),
            "bucket" => Ok(Self::Bucket),
            "evaluate" => Ok(Self::Evaluate),
            other => Err(ConfigError::Invalid {
                field: "decision".to_string(),
                reason: format!("unknown relationship decision '{other}'"),
            }),
        }
    }
}

/// Supported target document / key-value stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetDatabase {
    #[default]
    #[serde(rename = "mongodb")]
    MongoDb,
    #[serde(rename = "dynamodb")]
    DynamoDb,
}

impl TargetDatabase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MongoDb => "mongodb",
            Self::DynamoDb => "dynamodb",
        }
    }
}

impl fmt::Display for TargetDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetDatabase {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(Self::MongoDb),
            "dynamodb" | "dynamo" => Ok(Self::DynamoDb),
            other => Err(ConfigError::Invalid {
                field: "target".to_string(),
                reason: format!("unsupported target database '{other}'"),
            }),
        }
    }
}

/// The ratios that drove a decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationMetrics {
    pub co_access_ratio: f64,
    pub child_independence: f64,
    pub child_write_ratio: f64,
    /// 0 when no cardinality hint was supplied.
    pub max_children: u64,
}

/// One decision for a parent/child table pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRecommendation {
    pub parent_table: String,
    pub child_table: String,
    pub decision: RelationshipDecision,
    /// In `[0, 1]`.
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub metrics: RecommendationMetrics,
}

impl SchemaRecommendation {
    /// `(parent, child)` key used to match recommendations across runs.
    pub fn relationship_key(&self) -> (String, String) {
        (self.parent_table.clone(), self.child_table.clone())
    }
}
