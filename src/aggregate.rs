//! Grouped statistics over filtered views.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Count and mean of the non-null values in one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    /// `None` when the group has no non-null values.
    pub mean: Option<f64>,
}

/// Group key → stats, iterated in ascending key order.
pub type AggregateResult = BTreeMap<String, GroupStats>;

/// Arithmetic mean of the non-null values, or `None` if there are none.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Groups `rows` by `key` and computes count/mean of `value` per group.
///
/// Empty keys are null and never form a group. A group whose values are all
/// null is still present, with `count == 0` and `mean == None`.
pub fn group_mean_count<T, K, V>(rows: &[&T], key: K, value: V) -> AggregateResult
where
    K: Fn(&T) -> &str,
    V: Fn(&T) -> Option<f64>,
{
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for row in rows {
        let k = key(*row);
        if k.is_empty() {
            continue;
        }
        let entry = sums.entry(k).or_insert((0.0, 0));
        if let Some(v) = value(*row) {
            entry.0 += v;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(k, (sum, count))| {
            let mean = (count > 0).then(|| sum / count as f64);
            (k.to_string(), GroupStats { count, mean })
        })
        .collect()
}

/// Number of distinct non-empty values of `key`.
pub fn nunique<T, K>(rows: &[&T], key: K) -> usize
where
    K: Fn(&T) -> &str,
{
    rows.iter()
        .map(|row| key(*row))
        .filter(|k| !k.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Groups that have a defined mean, as `(key, mean)` pairs sorted by
/// descending mean. Ties keep ascending key order.
pub fn ranked_means(result: &AggregateResult) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = result
        .iter()
        .filter_map(|(k, stats)| stats.mean.map(|m| (k.as_str(), m)))
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}
