use std::collections::HashMap;

use serde::Serialize;

use crate::classify::{is_numeric, numeric_value};
use crate::data::Dataset;

/// Pie charts keep at most this many slices after sorting.
pub const MAX_PIE_SLICES: usize = 12;
/// Bar charts keep the first this many groups in first-seen order.
pub const MAX_BAR_GROUPS: usize = 20;

/// Label substituted for rows whose grouping key is missing or empty.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// One aggregated group: the raw key value and the sum of its measure column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedPoint {
    pub label: String,
    pub value: f64,
}

/// Group rows by the key column and sum the value column per group.
///
/// Output order is first-seen key order. Rows whose value cell is not
/// numeric contribute zero; rows whose key cell is empty land under
/// "Unknown".
pub fn aggregate(data: &Dataset, key_idx: usize, value_idx: usize) -> Vec<AggregatedPoint> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for row in 0..data.row_count() {
        let raw_key = data.cell(row, key_idx);
        let key = if raw_key.trim().is_empty() {
            UNKNOWN_LABEL.to_string()
        } else {
            raw_key.to_string()
        };

        if !totals.contains_key(&key) {
            order.push(key.clone());
        }
        let entry = totals.entry(key).or_insert(0.0);

        let cell = data.cell(row, value_idx);
        if is_numeric(cell) {
            *entry += numeric_value(cell);
        }
    }

    order
        .into_iter()
        .map(|label| {
            let value = totals[&label];
            AggregatedPoint { label, value }
        })
        .collect()
}

/// Pie variant: drop non-positive groups, sort descending by value, keep the
/// top slices.
pub fn aggregate_for_pie(data: &Dataset, key_idx: usize, value_idx: usize) -> Vec<AggregatedPoint> {
    let mut points = aggregate(data, key_idx, value_idx);
    points.retain(|p| p.value > 0.0);
    points.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    points.truncate(MAX_PIE_SLICES);
    points
}

/// Bar variant: keep the first groups in encounter order, no sorting and no
/// zero filtering.
pub fn aggregate_for_bar(data: &Dataset, key_idx: usize, value_idx: usize) -> Vec<AggregatedPoint> {
    let mut points = aggregate(data, key_idx, value_idx);
    points.truncate(MAX_BAR_GROUPS);
    points
}
