//! Fingerprint determinism and mode sensitivity.

use chrono::Utc;
use proptest::prelude::*;
use travels_core::config::CacheMode;
use travels_core::types::{
    AnalysisResult, ColumnDefinition, ForeignKeyDefinition, JoinPattern, MutationPattern,
    SchemaDefinition, TableDefinition, TablePair, TargetDatabase,
};
use travels_storage::compute_fingerprint;
use travels_storage::fingerprint::canonical_payload;

fn table(name: &str, columns: &[&str]) -> TableDefinition {
    let mut t = TableDefinition::new(name);
    t.columns = columns.iter().map(|c| ColumnDefinition::new(*c, "text")).collect();
    t.primary_key = vec!["id".to_string()];
    t
}

fn fk(from: &str, col: &str, to: &str) -> ForeignKeyDefinition {
    ForeignKeyDefinition {
        constraint_name: format!("fk_{from}_{to}"),
        from_table: from.to_string(),
        from_columns: vec![col.to_string()],
        to_table: to.to_string(),
        to_columns: vec!["id".to_string()],
    }
}

fn schema() -> SchemaDefinition {
    SchemaDefinition {
        tables: vec![
            table("users", &["id", "name", "email"]),
            table("orders", &["id", "user_id", "total"]),
            table("order_items", &["id", "order_id", "qty"]),
        ],
        foreign_keys: vec![fk("orders", "user_id", "users"), fk("order_items", "order_id", "orders")],
        source_file: None,
    }
}

fn join(a: &str, b: &str, frequency: u64) -> JoinPattern {
    let mut jp = JoinPattern::new(&TablePair::new(a, b), "INNER", ("id".into(), "id".into()));
    for _ in 0..frequency {
        jp.record(1.0);
    }
    jp
}

fn mutation(table: &str, selects: u64, inserts: u64) -> MutationPattern {
    let mut mp = MutationPattern::new(table);
    mp.select_count = selects;
    mp.insert_count = inserts;
    mp
}

fn analysis(joins: Vec<JoinPattern>, mutations: Vec<MutationPattern>) -> AnalysisResult {
    AnalysisResult {
        analysis_id: "deadbeef".to_string(),
        created_at: Utc::now(),
        source_db_type: "postgresql".to_string(),
        total_queries_analyzed: 0,
        skipped_statements: 0,
        join_patterns: joins,
        mutation_patterns: mutations,
        access_patterns: Vec::new(),
        table_statistics: Vec::new(),
        tables_analyzed: Vec::new(),
        hot_joins_count: 0,
        embedding_candidates_count: 0,
    }
}

fn baseline() -> AnalysisResult {
    analysis(
        vec![join("users", "orders", 50), join("orders", "order_items", 30)],
        vec![mutation("users", 90, 10), mutation("orders", 40, 60), mutation("order_items", 85, 15)],
    )
}

#[test]
fn test_same_input_same_fingerprint() {
    let a = compute_fingerprint(&schema(), &baseline(), TargetDatabase::MongoDb, CacheMode::Strict);
    let b = compute_fingerprint(&schema(), &baseline(), TargetDatabase::MongoDb, CacheMode::Strict);
    assert_eq!(a, b);
    assert_eq!(a.len(), 16);
}

#[test]
fn test_analysis_identity_is_not_hashed() {
    let mut other = baseline();
    other.analysis_id = "cafebabe".to_string();
    other.total_queries_analyzed = 1234;
    for mode in [CacheMode::Strict, CacheMode::Relaxed] {
        assert_eq!(
            compute_fingerprint(&schema(), &baseline(), TargetDatabase::MongoDb, mode),
            compute_fingerprint(&schema(), &other, TargetDatabase::MongoDb, mode),
        );
    }
}

#[test]
fn test_relaxed_ignores_small_frequency_drift() {
    let drifted = analysis(
        vec![join("users", "orders", 52), join("orders", "order_items", 30)],
        baseline().mutation_patterns,
    );
    let target = TargetDatabase::MongoDb;
    assert_eq!(
        compute_fingerprint(&schema(), &baseline(), target, CacheMode::Relaxed),
        compute_fingerprint(&schema(), &drifted, target, CacheMode::Relaxed),
    );
    assert_ne!(
        compute_fingerprint(&schema(), &baseline(), target, CacheMode::Strict),
        compute_fingerprint(&schema(), &drifted, target, CacheMode::Strict),
    );
}

#[test]
fn test_relaxed_sees_new_join_pair() {
    let mut extended = baseline();
    extended.join_patterns.push(join("users", "order_items", 1));
    assert_ne!(
        compute_fingerprint(&schema(), &baseline(), TargetDatabase::MongoDb, CacheMode::Relaxed),
        compute_fingerprint(&schema(), &extended, TargetDatabase::MongoDb, CacheMode::Relaxed),
    );
}

#[test]
fn test_relaxed_sees_read_write_reclassification() {
    // users: 10% writes (read-heavy) -> 30% writes (neither)
    let mut shifted = baseline();
    shifted.mutation_patterns[0] = mutation("users", 70, 30);
    assert_ne!(
        compute_fingerprint(&schema(), &baseline(), TargetDatabase::MongoDb, CacheMode::Relaxed),
        compute_fingerprint(&schema(), &shifted, TargetDatabase::MongoDb, CacheMode::Relaxed),
    );
}

#[test]
fn test_mode_and_target_are_part_of_the_key() {
    let s = schema();
    let a = baseline();
    let strict_mongo = compute_fingerprint(&s, &a, TargetDatabase::MongoDb, CacheMode::Strict);
    let relaxed_mongo = compute_fingerprint(&s, &a, TargetDatabase::MongoDb, CacheMode::Relaxed);
    let strict_dynamo = compute_fingerprint(&s, &a, TargetDatabase::DynamoDb, CacheMode::Strict);
    assert_ne!(strict_mongo, relaxed_mongo);
    assert_ne!(strict_mongo, strict_dynamo);
}

#[test]
fn test_schema_change_changes_key() {
    let mut changed = schema();
    changed.tables[0].columns.push(ColumnDefinition::new("created_at", "timestamp"));
    assert_ne!(
        compute_fingerprint(&schema(), &baseline(), TargetDatabase::MongoDb, CacheMode::Relaxed),
        compute_fingerprint(&changed, &baseline(), TargetDatabase::MongoDb, CacheMode::Relaxed),
    );
}

#[test]
fn test_payload_shape() {
    let payload = canonical_payload(&schema(), &baseline(), TargetDatabase::MongoDb, CacheMode::Relaxed);
    assert_eq!(payload["mode"], "relaxed");
    assert_eq!(payload["target"], "mongodb");
    assert_eq!(payload["tables"][0]["name"], "order_items");
    assert_eq!(payload["foreign_keys"][0], "order_items.order_id->orders.id");
    assert_eq!(payload["write_heavy_tables"][0], "orders");
    assert_eq!(payload["read_heavy_tables"].as_array().map(Vec::len), Some(2));
    assert!(payload.get("join_patterns").is_none());

    let strict = canonical_payload(&schema(), &baseline(), TargetDatabase::MongoDb, CacheMode::Strict);
    assert_eq!(strict["join_patterns"][0]["tables"][0], "order_items");
    assert_eq!(strict["mutation_patterns"][1]["write_ratio"], 0.6);
}

// ─── Order independence ─────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_input_order_does_not_matter(
        tables in Just(schema().tables).prop_shuffle(),
        fks in Just(schema().foreign_keys).prop_shuffle(),
        joins in Just(baseline().join_patterns).prop_shuffle(),
        mutations in Just(baseline().mutation_patterns).prop_shuffle(),
        reverse_columns in any::<bool>(),
    ) {
        let mut tables = tables;
        if reverse_columns {
            for t in &mut tables {
                t.columns.reverse();
            }
        }
        let shuffled_schema = SchemaDefinition { tables, foreign_keys: fks, source_file: None };
        let shuffled = analysis(joins, mutations);
        for mode in [CacheMode::Strict, CacheMode::Relaxed] {
            prop_assert_eq!(
                compute_fingerprint(&schema(), &baseline(), TargetDatabase::MongoDb, mode),
                compute_fingerprint(&shuffled_schema, &shuffled, TargetDatabase::MongoDb, mode)
            );
        }
    }
}
