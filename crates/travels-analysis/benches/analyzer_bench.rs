//! Full analyze + recommend pass over synthetic logs (1K, 10K statements).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use travels_analysis::PatternAnalyzer;
use travels_core::types::ExecutedStatement;

fn make_log(n: usize) -> Vec<ExecutedStatement> {
    (0..n)
        .map(|i| {
            let sql = match i % 6 {
                0 => format!("SELECT * FROM users WHERE id = {i}"),
                1 => format!(
                    "SELECT u.name, o.total FROM users u JOIN orders o ON u.id = o.user_id WHERE u.id = {i}"
                ),
                2 => format!(
                    "SELECT * FROM orders o JOIN order_items i ON o.id = i.order_id WHERE o.id = {i}"
                ),
                3 => format!("INSERT INTO orders (user_id, total) VALUES ({i}, 10)"),
                4 => format!("UPDATE order_items SET qty = {} WHERE id = {i}", i % 7),
                _ => format!("SELECT * FROM table_{} WHERE id = {i}", i % 40),
            };
            ExecutedStatement::new(sql).with_duration(((i % 13) + 1) as f64)
        })
        .collect()
}

fn bench_analyze(c: &mut Criterion) {
    let log_1k = make_log(1_000);
    let log_10k = make_log(10_000);

    c.bench_function("analyze_1k_statements", |b| {
        b.iter(|| {
            let mut analyzer = PatternAnalyzer::default();
            let result = analyzer.analyze(black_box(&log_1k));
            black_box(analyzer.recommend(&result, None));
        })
    });

    c.bench_function("analyze_10k_statements", |b| {
        b.iter(|| {
            let mut analyzer = PatternAnalyzer::default();
            let result = analyzer.analyze(black_box(&log_10k));
            black_box(analyzer.recommend(&result, None));
        })
    });
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
