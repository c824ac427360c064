//! Access-pattern synthesis: join co-access counts + per-table solo counts.

use travels_core::types::{AccessPattern, TablePair, TableStatistics};
use travels_core::{FxHashMap, FxHashSet};

/// One [`AccessPattern`] per canonical pair of the co-access matrix, sorted by
/// co-access ratio descending (stable over matrix order).
///
/// Pairs where either table has no statistics are dropped.
pub fn synthesize_access_patterns(
    co_access: &[(TablePair, u64)],
    statistics: &[TableStatistics],
) -> Vec<AccessPattern> {
    let lookup: FxHashMap<&str, &TableStatistics> =
        statistics.iter().map(|s| (s.table.as_str(), s)).collect();
    let mut seen: FxHashSet<&TablePair> = FxHashSet::default();
    let mut patterns = Vec::with_capacity(co_access.len());

    for (pair, count) in co_access {
        if !seen.insert(pair) {
            continue;
        }
        let (Some(a), Some(b)) = (lookup.get(pair.first.as_str()), lookup.get(pair.second.as_str()))
        else {
            continue;
        };
        patterns.push(AccessPattern {
            table_a: pair.first.clone(),
            table_b: pair.second.clone(),
            co_access_count: *count,
            table_a_solo_count: a.solo_accesses,
            table_b_solo_count: b.solo_accesses,
        });
    }

    patterns.sort_by(|x, y| y.co_access_ratio().total_cmp(&x.co_access_ratio()));
    patterns
}
