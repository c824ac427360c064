//! The relationship rule cascade, as an ordered `(predicate, verdict)` table.

use travels_core::config::RuleThresholds;
use travels_core::types::RelationshipDecision;

/// Signals for one parent/child pair, already oriented.
#[derive(Debug, Clone, PartialEq)]
pub struct PairSignals {
    pub parent: String,
    pub child: String,
    pub co_access_ratio: f64,
    pub child_independence: f64,
    pub child_write_ratio: f64,
    /// 0 when no cardinality hint was supplied.
    pub max_children: u64,
}

/// What a rule decided, before it is attached to a pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub decision: RelationshipDecision,
    pub confidence: f64,
    pub reasoning: Vec<String>,
    pub warnings: Vec<String>,
}

type Predicate = fn(&PairSignals, &RuleThresholds) -> bool;
type VerdictFn = fn(&PairSignals, &RuleThresholds) -> Verdict;

/// Rules in precedence order. First match wins; the last rule always matches.
pub const RULES: [(&str, Predicate, VerdictFn); 5] = [
    ("unbounded_children", unbounded_children, reference_unbounded),
    ("co_accessed_read_mostly", co_accessed_read_mostly, embed),
    ("child_independent", child_independent, reference_independent),
    ("child_write_heavy", child_write_heavy, reference_write_heavy),
    ("mixed_signals", always, evaluate),
];

/// Run the cascade. Returns the matching rule's name and its verdict.
pub fn apply_rules(signals: &PairSignals, thresholds: &RuleThresholds) -> (&'static str, Verdict) {
    for (name, applies, verdict) in RULES {
        if applies(signals, thresholds) {
            return (name, verdict(signals, thresholds));
        }
    }
    ("mixed_signals", evaluate(signals, thresholds))
}

fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

// ─── 1. Unbounded fan-out ───────────────────────────────────────────────────

fn unbounded_children(s: &PairSignals, t: &RuleThresholds) -> bool {
    s.max_children > t.unbounded_children
}

fn reference_unbounded(s: &PairSignals, _: &RuleThresholds) -> Verdict {
    Verdict {
        decision: RelationshipDecision::Reference,
        confidence: 0.9,
        reasoning: vec![format!("Potentially unbounded children ({} max)", s.max_children)],
        warnings: vec!["Document size limits could be exceeded".to_string()],
    }
}

// ─── 2. Co-accessed, rarely written, bounded ────────────────────────────────

fn co_accessed_read_mostly(s: &PairSignals, t: &RuleThresholds) -> bool {
    s.co_access_ratio > t.embed_min_co_access
        && s.child_write_ratio < t.embed_max_child_write_ratio
        && (s.max_children == 0 || s.max_children < t.embed_max_children)
}

fn embed(s: &PairSignals, _: &RuleThresholds) -> Verdict {
    let mut reasoning = vec![
        format!("High co-access ({})", percent(s.co_access_ratio)),
        format!("Low child write ratio ({})", percent(s.child_write_ratio)),
    ];
    if s.max_children > 0 {
        reasoning.push(format!("Bounded children ({} max)", s.max_children));
    }
    Verdict {
        decision: RelationshipDecision::Embed,
        confidence: 0.85,
        reasoning,
        warnings: Vec::new(),
    }
}

// ─── 3. Child queried on its own ────────────────────────────────────────────

fn child_independent(s: &PairSignals, t: &RuleThresholds) -> bool {
    s.child_independence > t.reference_min_child_independence
}

fn reference_independent(s: &PairSignals, _: &RuleThresholds) -> Verdict {
    Verdict {
        decision: RelationshipDecision::Reference,
        confidence: 0.8,
        reasoning: vec![format!(
            "{} accessed independently {} of the time",
            s.child,
            percent(s.child_independence)
        )],
        warnings: Vec::new(),
    }
}

// ─── 4. Child written often ─────────────────────────────────────────────────

fn child_write_heavy(s: &PairSignals, t: &RuleThresholds) -> bool {
    s.child_write_ratio > t.reference_min_child_write_ratio
}

fn reference_write_heavy(s: &PairSignals, _: &RuleThresholds) -> Verdict {
    Verdict {
        decision: RelationshipDecision::Reference,
        confidence: 0.85,
        reasoning: vec![
            format!("High write ratio on {} ({})", s.child, percent(s.child_write_ratio)),
            "Embedding would require rewriting parent on every update".to_string(),
        ],
        warnings: Vec::new(),
    }
}

// ─── 5. Fallback ────────────────────────────────────────────────────────────

fn always(_: &PairSignals, _: &RuleThresholds) -> bool {
    true
}

fn evaluate(_: &PairSignals, _: &RuleThresholds) -> Verdict {
    Verdict {
        decision: RelationshipDecision::Evaluate,
        confidence: 0.5,
        reasoning: vec!["Mixed signals - manual review recommended".to_string()],
        warnings: vec!["Consider access patterns and cardinality carefully".to_string()],
    }
}
