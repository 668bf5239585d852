//! Group-by-and-summarize over in-memory records.
//!
//! Every division in this module goes through [`ratio`], which returns `0.0`
//! for a zero denominator. An empty group therefore has a mean of `0.0`
//! rather than NaN, and a rate over nothing is `0.0`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::limits::{MONEY_DECIMALS, PERCENT_DECIMALS};

/// Count, sum and mean of a numeric field within one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub count: u64,
    pub sum: f64,
    pub mean: f64,
}

impl GroupStats {
    /// Adds one observation.
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.mean = ratio(self.sum, self.count as f64);
    }

    /// Folds another group into this one.
    pub fn merge(&mut self, other: &GroupStats) {
        self.count += other.count;
        self.sum += other.sum;
        self.mean = ratio(self.sum, self.count as f64);
    }

    /// Copy with sum and mean rounded to currency precision.
    pub fn rounded(&self) -> Self {
        Self {
            count: self.count,
            sum: round_money(self.sum),
            mean: round_money(self.mean),
        }
    }
}

impl FromIterator<f64> for GroupStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = GroupStats::default();
        for value in iter {
            stats.push(value);
        }
        stats
    }
}

/// Groups `records` by `key` and summarizes `value` within each group.
pub fn group_by<T, K, FK, FV>(
    records: impl IntoIterator<Item = T>,
    mut key: FK,
    mut value: FV,
) -> BTreeMap<K, GroupStats>
where
    K: Ord,
    FK: FnMut(&T) -> K,
    FV: FnMut(&T) -> f64,
{
    let mut groups: BTreeMap<K, GroupStats> = BTreeMap::new();
    for record in records {
        let v = value(&record);
        groups.entry(key(&record)).or_default().push(v);
    }
    groups
}

/// Counts `records` per `key`.
pub fn count_by<T, K, FK>(records: impl IntoIterator<Item = T>, mut key: FK) -> BTreeMap<K, u64>
where
    K: Ord,
    FK: FnMut(&T) -> K,
{
    let mut counts: BTreeMap<K, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(key(&record)).or_default() += 1;
    }
    counts
}

/// Largest groups first; ties are broken by key order.
pub fn top_n<K: Ord + Clone>(counts: &BTreeMap<K, u64>, n: usize) -> Vec<(K, u64)> {
    let mut entries: Vec<(K, u64)> = counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    // BTreeMap iteration is already key-ordered, so a stable sort keeps ties in key order.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

/// `numerator / denominator`, or `0.0` when the denominator is zero.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Ratio expressed as a percentage, rounded for display.
pub fn percent(numerator: f64, denominator: f64) -> f64 {
    round_to(ratio(numerator, denominator) * 100.0, PERCENT_DECIMALS)
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Rounds a currency amount for display.
pub fn round_money(value: f64) -> f64 {
    round_to(value, MONEY_DECIMALS)
}
