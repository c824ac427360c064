//! Input fingerprinting: schema + analysis evidence + target → short digest.
//!
//! The payload is built as a `serde_json::Value` (object keys are sorted),
//! rendered compactly, hashed with blake3, and truncated to
//! [`FINGERPRINT_HEX_LEN`] hex characters. Every list in the payload is sorted,
//! so only content matters, never input order.

use std::collections::BTreeSet;

use serde_json::{json, Value};
use travels_core::config::CacheMode;
use travels_core::constants::{FINGERPRINT_HEX_LEN, RECOMMENDATION_VERSION};
use travels_core::types::{AnalysisResult, SchemaDefinition, TablePair, TargetDatabase};

/// Strict mode hashes at most this many join patterns, in result order.
pub const STRICT_JOIN_LIMIT: usize = 20;
/// Relaxed mode's hot set: the most frequent joins.
pub const RELAXED_HOT_JOIN_LIMIT: usize = 10;
/// Relaxed classification: `write_ratio` above this is write-heavy.
pub const RELAXED_WRITE_HEAVY: f64 = 0.4;
/// Relaxed classification: `write_ratio` below this is read-heavy.
pub const RELAXED_READ_HEAVY: f64 = 0.2;

/// Cache key for `(schema, analysis, target)` under `mode`.
pub fn compute_fingerprint(
    schema: &SchemaDefinition,
    analysis: &AnalysisResult,
    target: TargetDatabase,
    mode: CacheMode,
) -> String {
    digest(&canonical_payload(schema, analysis, target, mode))
}

/// The exact document that gets hashed.
pub fn canonical_payload(
    schema: &SchemaDefinition,
    analysis: &AnalysisResult,
    target: TargetDatabase,
    mode: CacheMode,
) -> Value {
    let mut payload = json!({
        "version": RECOMMENDATION_VERSION,
        "mode": mode.as_str(),
        "target": target.as_str(),
        "tables": schema_tables(schema),
        "foreign_keys": foreign_keys(schema),
    });
    let evidence = match mode {
        CacheMode::Strict => strict_evidence(analysis),
        CacheMode::Relaxed => relaxed_evidence(analysis),
    };
    if let (Value::Object(map), Value::Object(extra)) = (&mut payload, evidence) {
        map.extend(extra);
    }
    payload
}

/// blake3 of the compact JSON rendering, truncated.
pub fn digest(payload: &Value) -> String {
    let hex = blake3::hash(payload.to_string().as_bytes()).to_hex();
    hex.as_str()[..FINGERPRINT_HEX_LEN].to_string()
}

// ─── Schema ─────────────────────────────────────────────────────────────────

fn schema_tables(schema: &SchemaDefinition) -> Value {
    let mut tables: Vec<(&str, Value)> = schema
        .tables
        .iter()
        .map(|t| {
            let mut columns: Vec<&str> = t.columns.iter().map(|c| c.name.as_str()).collect();
            columns.sort_unstable();
            let mut pk: Vec<&str> = t.primary_key.iter().map(String::as_str).collect();
            pk.sort_unstable();
            (t.name.as_str(), json!({ "name": t.name, "columns": columns, "pk": pk }))
        })
        .collect();
    tables.sort_by(|a, b| a.0.cmp(b.0));
    Value::Array(tables.into_iter().map(|(_, v)| v).collect())
}

fn foreign_keys(schema: &SchemaDefinition) -> Value {
    let mut edges: Vec<String> = schema.foreign_keys.iter().map(|fk| fk.edge_label()).collect();
    edges.sort_unstable();
    json!(edges)
}

// ─── Evidence ───────────────────────────────────────────────────────────────

/// Exact join frequencies and write ratios rounded to 2 decimals.
fn strict_evidence(analysis: &AnalysisResult) -> Value {
    let mut joins: Vec<(TablePair, u64)> = analysis
        .join_patterns
        .iter()
        .take(STRICT_JOIN_LIMIT)
        .map(|jp| (jp.table_pair(), jp.frequency))
        .collect();
    joins.sort();

    let mut mutations: Vec<(&str, f64)> = analysis
        .mutation_patterns
        .iter()
        .map(|mp| (mp.table.as_str(), round2(mp.write_ratio())))
        .collect();
    mutations.sort_by(|a, b| a.0.cmp(b.0));

    json!({
        "join_patterns": joins
            .iter()
            .map(|(pair, frequency)| json!({
                "tables": [pair.first, pair.second],
                "frequency": frequency,
            }))
            .collect::<Vec<_>>(),
        "mutation_patterns": mutations
            .iter()
            .map(|(table, write_ratio)| json!({ "table": table, "write_ratio": write_ratio }))
            .collect::<Vec<_>>(),
    })
}

/// Which pairs join, which are hot, and which tables are read/write heavy.
fn relaxed_evidence(analysis: &AnalysisResult) -> Value {
    let join_pairs: BTreeSet<TablePair> =
        analysis.join_patterns.iter().map(|jp| jp.table_pair()).collect();

    let mut by_frequency: Vec<_> = analysis.join_patterns.iter().collect();
    by_frequency.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    let hot_pairs: BTreeSet<TablePair> = by_frequency
        .into_iter()
        .take(RELAXED_HOT_JOIN_LIMIT)
        .map(|jp| jp.table_pair())
        .collect();

    let mut write_heavy: Vec<&str> = Vec::new();
    let mut read_heavy: Vec<&str> = Vec::new();
    for mp in &analysis.mutation_patterns {
        let ratio = mp.write_ratio();
        if ratio > RELAXED_WRITE_HEAVY {
            write_heavy.push(&mp.table);
        } else if ratio < RELAXED_READ_HEAVY {
            read_heavy.push(&mp.table);
        }
    }
    write_heavy.sort_unstable();
    read_heavy.sort_unstable();

    json!({
        "join_pairs": pair_lists(&join_pairs),
        "hot_join_pairs": pair_lists(&hot_pairs),
        "write_heavy_tables": write_heavy,
        "read_heavy_tables": read_heavy,
    })
}

fn pair_lists(pairs: &BTreeSet<TablePair>) -> Value {
    Value::Array(pairs.iter().map(|p| json!([p.first, p.second])).collect())
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.666), 0.67);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(1.0), 1.0);
    }

    #[test]
    fn test_digest_is_fixed_length_hex() {
        let d = digest(&json!({ "a": 1 }));
        assert_eq!(d.len(), FINGERPRINT_HEX_LEN);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(d, digest(&json!({ "a": 1 })));
        assert_ne!(d, digest(&json!({ "a": 2 })));
    }
}
