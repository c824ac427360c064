//! End-to-end analysis runs over small statement logs.

use travels_analysis::{summary, PatternAnalyzer};
use travels_core::config::AnalysisConfig;
use travels_core::types::{ExecutedStatement, RelationshipDecision, TablePair};

// ─── Helpers ───────────────────────────────────────────────────────────────

fn log(entries: &[(&str, f64)]) -> Vec<ExecutedStatement> {
    entries
        .iter()
        .map(|(sql, ms)| ExecutedStatement::new(*sql).with_duration(*ms))
        .collect()
}

fn users_orders_log() -> Vec<ExecutedStatement> {
    log(&[
        ("SELECT * FROM users", 1.0),
        ("SELECT * FROM users", 1.0),
        ("SELECT u.name, o.total FROM users u JOIN orders o ON u.id = o.user_id", 5.0),
    ])
}

// ─── Scenarios ─────────────────────────────────────────────────────────────

#[test]
fn users_orders_scenario() {
    let mut analyzer = PatternAnalyzer::default();
    let result = analyzer.analyze(&users_orders_log());

    assert_eq!(result.total_queries_analyzed, 3);
    assert_eq!(result.skipped_statements, 0);

    // Two solo reads plus the join line.
    let users = result.mutation_for("users").unwrap();
    assert_eq!(users.select_count, 3);
    assert!((users.total_time_ms - 4.5).abs() < 1e-9);
    let orders = result.mutation_for("orders").unwrap();
    assert_eq!(orders.select_count, 1);
    assert!((orders.total_time_ms - 2.5).abs() < 1e-9);

    assert_eq!(result.join_patterns.len(), 1);
    let join = &result.join_patterns[0];
    assert_eq!((join.left_table.as_str(), join.right_table.as_str()), ("orders", "users"));
    assert_eq!(join.frequency, 1);
    assert_eq!(join.join_type, "INNER");
    assert_eq!(join.join_columns, ("user_id".to_string(), "id".to_string()));
    assert!((join.avg_time_ms - 5.0).abs() < 1e-9);
    assert_eq!(result.hot_joins_count, 1);

    let users_stats = result.statistics_for("users").unwrap();
    assert_eq!(users_stats.solo_accesses, 2);
    assert_eq!(users_stats.joined_accesses, 1);

    assert_eq!(result.tables_analyzed, vec!["orders", "users"]);
    assert_eq!(result.access_patterns.len(), 1);
    let ap = &result.access_patterns[0];
    assert_eq!(ap.table_pair(), TablePair::new("users", "orders"));
    assert_eq!(ap.co_access_count, 1);
    assert!((ap.co_access_ratio() - 1.0).abs() < 1e-9);
    assert_eq!(result.embedding_candidates_count, 1);
    assert_eq!(result.analysis_id.len(), 8);
}

#[test]
fn users_orders_recommends_embedding_orders_in_users() {
    let mut analyzer = PatternAnalyzer::default();
    let result = analyzer.analyze(&users_orders_log());
    let recs = analyzer.recommend(&result, None);

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].parent_table, "users");
    assert_eq!(recs[0].child_table, "orders");
    assert_eq!(recs[0].decision, RelationshipDecision::Embed);
    assert_eq!(recs[0].confidence, 0.85);
    assert_eq!(recs[0].metrics.max_children, 0);
}

#[test]
fn unparseable_statements_are_skipped_not_counted() {
    let mut analyzer = PatternAnalyzer::default();
    let result = analyzer.analyze(&log(&[
        ("SELECT * FROM users", 1.0),
        ("THIS IS NOT SQL AT ALL", 100.0),
        ("", 100.0),
    ]));
    assert_eq!(result.total_queries_analyzed, 3);
    assert_eq!(result.skipped_statements, 2);
    let users = result.mutation_for("users").unwrap();
    assert_eq!(users.select_count, 1);
    assert!((users.total_time_ms - 1.0).abs() < 1e-9);
    assert_eq!(result.tables_analyzed, vec!["users"]);
}

#[test]
fn empty_log_produces_empty_result() {
    let mut analyzer = PatternAnalyzer::default();
    let result = analyzer.analyze(&[]);
    assert!(result.join_patterns.is_empty());
    assert!(result.mutation_patterns.is_empty());
    assert!(result.access_patterns.is_empty());
    assert_eq!(result.hot_joins_count, 0);
    assert_eq!(result.embedding_candidates_count, 0);
}

#[test]
fn analyze_resets_between_runs() {
    let mut analyzer = PatternAnalyzer::default();
    analyzer.analyze(&users_orders_log());
    let second = analyzer.analyze(&log(&[("SELECT * FROM products", 2.0)]));
    assert_eq!(second.tables_analyzed, vec!["products"]);
    assert!(analyzer.hot_joins().is_empty());
}

#[test]
fn hot_joins_respect_configured_limit() {
    let config = AnalysisConfig {
        hot_join_limit: 1,
        ..AnalysisConfig::default()
    };
    let mut analyzer = PatternAnalyzer::new(config);
    analyzer.analyze(&log(&[
        ("SELECT * FROM a JOIN b ON a.id = b.a_id", 1.0),
        ("SELECT * FROM c JOIN d ON c.id = d.c_id", 9.0),
    ]));
    let hot = analyzer.hot_joins();
    assert_eq!(hot.len(), 1);
    assert_eq!(hot[0].left_table, "c");
}

#[test]
fn write_traffic_feeds_mutation_report() {
    let mut analyzer = PatternAnalyzer::default();
    analyzer.analyze(&log(&[
        ("SELECT * FROM carts WHERE user_id = 1", 1.0),
        ("UPDATE carts SET total = 10 WHERE id = 1", 2.0),
        ("UPDATE carts SET total = 11, status = 'open' WHERE id = 1", 2.0),
        ("INSERT INTO carts (user_id) VALUES (2)", 1.0),
        ("DELETE FROM carts WHERE id = 3", 1.0),
    ]));
    let report = analyzer.mutation_report();
    let carts = &report.tables[0];
    assert_eq!(carts.table, "carts");
    assert_eq!((carts.reads, carts.inserts, carts.updates, carts.deletes), (1, 1, 2, 1));
    assert!((carts.write_ratio - 0.8).abs() < 1e-9);
    assert_eq!(carts.frequently_updated_columns, vec!["total", "status"]);
    assert_eq!(carts.frequently_filtered_columns, vec!["id", "user_id"]);
    assert_eq!(report.index_recommendations[0].columns, vec!["id", "user_id"]);
    assert_eq!(analyzer.write_heavy_tables(0.5), vec!["carts"]);
}

#[test]
fn summary_lists_joins_and_mutations() {
    let mut analyzer = PatternAnalyzer::default();
    let result = analyzer.analyze(&users_orders_log());
    let text = summary(&result);
    assert!(text.contains("ACCESS PATTERN ANALYSIS SUMMARY"));
    assert!(text.contains("Queries Analyzed: 3"));
    assert!(text.contains("orders <-> users: 1 calls, 5.0ms avg"));
    assert!(text.contains("users: R=3 W=0 (0% writes)"));
    assert!(text.contains("Potential candidates: 1"));
}
