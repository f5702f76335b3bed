//! Grouping, counting and ranking primitives
//!
//! Two orderings are used throughout:
//! - frequency tables ([`value_counts`]) list values in order of first
//!   appearance before the descending sort, so ties keep that order;
//! - grouped aggregates ([`group_counts`], [`group_sums`]) list groups by
//!   ascending key before the descending sort, so ties keep key order.
//!
//! Every sort here is stable and null keys are never counted.

use std::collections::BTreeMap;

use arrow::array::{Array, Int64Array, StringArray};
use itertools::Itertools;
use rustc_hash::FxHashMap;

/// Sort `(key, measure)` pairs by descending measure, keeping the order of ties
pub fn sort_desc_stable<K, V: Ord>(pairs: &mut [(K, V)]) {
    pairs.sort_by(|a, b| b.1.cmp(&a.1));
}

/// Count the non-null values of a column, most frequent first
///
/// Values with equal counts stay in order of first appearance.
#[must_use]
pub fn value_counts(values: &StringArray) -> Vec<(String, usize)> {
    let mut position: FxHashMap<&str, usize> = FxHashMap::default();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for value in values.iter().flatten() {
        match position.get(value) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                position.insert(value, counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }

    sort_desc_stable(&mut counts);
    counts
}

/// Keys of the first `n` entries of a ranked list
#[must_use]
pub fn top_n<V>(ranked: &[(String, V)], n: usize) -> Vec<String> {
    ranked.iter().take(n).map(|(key, _)| key.clone()).collect()
}

/// Count rows per combination of key columns, groups ascending by key
///
/// Rows with a null in any key column are skipped.
#[must_use]
pub fn group_counts(keys: &[&StringArray]) -> Vec<(Vec<String>, usize)> {
    let num_rows = keys.first().map_or(0, |k| k.len());
    let mut groups: BTreeMap<Vec<&str>, usize> = BTreeMap::new();

    for row in 0..num_rows {
        if keys.iter().any(|k| k.is_null(row)) {
            continue;
        }
        let key = keys.iter().map(|k| k.value(row)).collect_vec();
        *groups.entry(key).or_default() += 1;
    }

    groups
        .into_iter()
        .map(|(key, count)| (key.into_iter().map(str::to_string).collect(), count))
        .collect()
}

/// Sum a column per key, groups ascending by key
///
/// Null keys are skipped; null values contribute nothing, so a group made
/// only of nulls sums to zero.
#[must_use]
pub fn group_sums(keys: &StringArray, values: &Int64Array) -> Vec<(String, i64)> {
    let mut groups: BTreeMap<&str, i64> = BTreeMap::new();

    for (key, value) in keys.iter().zip(values.iter()) {
        let Some(key) = key else { continue };
        *groups.entry(key).or_default() += value.unwrap_or(0);
    }

    groups
        .into_iter()
        .map(|(key, sum)| (key.to_string(), sum))
        .collect()
}
