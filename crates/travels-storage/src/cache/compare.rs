//! Diff between two cached recommendation sets.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use travels_core::types::{RelationshipDecision, SchemaRecommendation};

/// Confidence moves larger than this are reported.
pub const CONFIDENCE_CHANGE_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    DecisionChanged {
        from: RelationshipDecision,
        to: RelationshipDecision,
    },
    ConfidenceChanged {
        from: f64,
        to: f64,
    },
    Added {
        decision: RelationshipDecision,
    },
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationChange {
    pub parent_table: String,
    pub child_table: String,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

impl fmt::Display for RecommendationChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: ", self.parent_table, self.child_table)?;
        match &self.kind {
            ChangeKind::DecisionChanged { from, to } => write!(f, "decision {from} -> {to}"),
            ChangeKind::ConfidenceChanged { from, to } => {
                write!(f, "confidence {from:.2} -> {to:.2}")
            }
            ChangeKind::Added { decision } => write!(f, "added ({decision})"),
            ChangeKind::Removed => write!(f, "removed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheComparison {
    pub fingerprint_a: String,
    pub fingerprint_b: String,
    pub total_in_a: usize,
    pub total_in_b: usize,
    /// Sorted by `(parent, child)`.
    pub changes: Vec<RecommendationChange>,
    pub is_identical: bool,
}

/// Compare two recommendation sets keyed by `(parent, child)`. A decision
/// change hides any confidence change on the same key.
pub fn compare_recommendations(
    fingerprint_a: &str,
    a: &[SchemaRecommendation],
    fingerprint_b: &str,
    b: &[SchemaRecommendation],
) -> CacheComparison {
    let by_key = |recs: &[SchemaRecommendation]| -> BTreeMap<(String, String), SchemaRecommendation> {
        recs.iter().map(|r| (r.relationship_key(), r.clone())).collect()
    };
    let map_a = by_key(a);
    let map_b = by_key(b);
    let keys: BTreeSet<&(String, String)> = map_a.keys().chain(map_b.keys()).collect();

    let mut changes = Vec::new();
    for key in keys {
        let kind = match (map_a.get(key), map_b.get(key)) {
            (Some(ra), Some(rb)) if ra.decision != rb.decision => ChangeKind::DecisionChanged {
                from: ra.decision,
                to: rb.decision,
            },
            (Some(ra), Some(rb))
                if (ra.confidence - rb.confidence).abs() > CONFIDENCE_CHANGE_THRESHOLD =>
            {
                ChangeKind::ConfidenceChanged {
                    from: ra.confidence,
                    to: rb.confidence,
                }
            }
            (Some(_), Some(_)) | (None, None) => continue,
            (Some(_), None) => ChangeKind::Removed,
            (None, Some(rb)) => ChangeKind::Added {
                decision: rb.decision,
            },
        };
        changes.push(RecommendationChange {
            parent_table: key.0.clone(),
            child_table: key.1.clone(),
            kind,
        });
    }

    CacheComparison {
        fingerprint_a: fingerprint_a.to_string(),
        fingerprint_b: fingerprint_b.to_string(),
        total_in_a: a.len(),
        total_in_b: b.len(),
        is_identical: changes.is_empty(),
        changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use travels_core::types::RecommendationMetrics;

    fn rec(parent: &str, child: &str, decision: RelationshipDecision, confidence: f64) -> SchemaRecommendation {
        SchemaRecommendation {
            parent_table: parent.to_string(),
            child_table: child.to_string(),
            decision,
            confidence,
            reasoning: Vec::new(),
            warnings: Vec::new(),
            metrics: RecommendationMetrics::default(),
        }
    }

    #[test]
    fn test_identical_sets() {
        let recs = vec![rec("users", "orders", RelationshipDecision::Embed, 0.85)];
        let cmp = compare_recommendations("a", &recs, "b", &recs);
        assert!(cmp.is_identical);
        assert_eq!((cmp.total_in_a, cmp.total_in_b), (1, 1));
    }

    #[test]
    fn test_small_confidence_drift_is_ignored() {
        let a = vec![rec("users", "orders", RelationshipDecision::Embed, 0.85)];
        let b = vec![rec("users", "orders", RelationshipDecision::Embed, 0.8)];
        assert!(compare_recommendations("a", &a, "b", &b).is_identical);
    }

    #[test]
    fn test_decision_change_wins_over_confidence_change() {
        let a = vec![rec("users", "orders", RelationshipDecision::Embed, 0.85)];
        let b = vec![rec("users", "orders", RelationshipDecision::Evaluate, 0.5)];
        let cmp = compare_recommendations("a", &a, "b", &b);
        assert_eq!(cmp.changes.len(), 1);
        assert_eq!(
            cmp.changes[0].kind,
            ChangeKind::DecisionChanged {
                from: RelationshipDecision::Embed,
                to: RelationshipDecision::Evaluate
            }
        );
        assert_eq!(cmp.changes[0].to_string(), "users -> orders: decision embed -> evaluate");
    }

    #[test]
    fn test_added_and_removed_in_key_order() {
        let a = vec![
            rec("users", "orders", RelationshipDecision::Embed, 0.85),
            rec("posts", "comments", RelationshipDecision::Reference, 0.8),
        ];
        let b = vec![
            rec("users", "orders", RelationshipDecision::Embed, 0.6),
            rec("accounts", "audit", RelationshipDecision::Reference, 0.85),
        ];
        let cmp = compare_recommendations("a", &a, "b", &b);
        let kinds: Vec<&ChangeKind> = cmp.changes.iter().map(|c| &c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &ChangeKind::Added { decision: RelationshipDecision::Reference },
                &ChangeKind::Removed,
                &ChangeKind::ConfidenceChanged { from: 0.85, to: 0.6 },
            ]
        );
        assert!(!cmp.is_identical);
    }

    #[test]
    fn test_change_serializes_with_type_tag() {
        let change = RecommendationChange {
            parent_table: "users".to_string(),
            child_table: "orders".to_string(),
            kind: ChangeKind::Removed,
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["type"], "removed");
        assert_eq!(json["parent_table"], "users");
    }
}
