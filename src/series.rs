use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::classify::{is_numeric, numeric_value};
use crate::data::Dataset;

/// Line series keep at most this many points.
pub const MAX_SERIES_POINTS: usize = 100;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// One point of a line series: the raw x cell, the coerced y value, and the
/// raw grouping cell when a group column is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: String,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Parse a cell as a timestamp in milliseconds. Tries RFC 3339 first, then
/// the common naive datetime and date formats.
fn parse_timestamp(cell: &str) -> Option<i64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}

/// Build the ordered point series for a line chart.
///
/// Row ordering: if any x cell parses as a date, all rows sort ascending by
/// date; else if any x cell is numeric, rows sort ascending numerically;
/// else original order is preserved. Rows that fail the active parse sort
/// after all rows that succeed, stably. Rows with an empty x cell are then
/// dropped, y is coerced (0 when non-numeric), and the series is capped.
pub fn build_series(
    data: &Dataset,
    x_idx: usize,
    y_idx: usize,
    group_idx: Option<usize>,
) -> Vec<SeriesPoint> {
    let rows = data.row_count();
    let mut order: Vec<usize> = (0..rows).collect();

    let timestamps: Vec<Option<i64>> = (0..rows)
        .map(|r| parse_timestamp(data.cell(r, x_idx)))
        .collect();

    if timestamps.iter().any(Option::is_some) {
        // Unparseable cells get i64::MAX so they land after every real date.
        order.sort_by_key(|&r| timestamps[r].unwrap_or(i64::MAX));
    } else {
        let numbers: Vec<Option<f64>> = (0..rows)
            .map(|r| {
                let cell = data.cell(r, x_idx);
                is_numeric(cell).then(|| numeric_value(cell))
            })
            .collect();
        if numbers.iter().any(Option::is_some) {
            order.sort_by(|&a, &b| match (numbers[a], numbers[b]) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }
    }

    let mut points = Vec::new();
    for &r in &order {
        let x = data.cell(r, x_idx);
        if x.trim().is_empty() {
            continue;
        }
        points.push(SeriesPoint {
            x: x.to_string(),
            y: numeric_value(data.cell(r, y_idx)),
            group: group_idx.map(|g| data.cell(r, g).to_string()),
        });
        if points.len() == MAX_SERIES_POINTS {
            break;
        }
    }
    points
}

/// Partition one group-tagged series into per-group sub-series, in
/// first-seen group order. Points without a group tag land under the empty
/// key.
pub fn split_by_group(points: &[SeriesPoint]) -> Vec<(String, Vec<SeriesPoint>)> {
    let mut buckets: HashMap<String, Vec<SeriesPoint>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for point in points {
        let key = point.group.clone().unwrap_or_default();
        if !buckets.contains_key(&key) {
            order.push(key.clone());
        }
        buckets.entry(key).or_default().push(point.clone());
    }

    order
        .into_iter()
        .map(|key| {
            let points = buckets.remove(&key).unwrap_or_default();
            (key, points)
        })
        .collect()
}

/// Restrict a dataset to the rows whose group column equals one value,
/// before the rest of the pipeline runs.
pub fn filter_group(data: &Dataset, group_idx: usize, value: &str) -> Dataset {
    let rows = data
        .rows
        .iter()
        .filter(|row| row.get(group_idx).map(String::as_str).unwrap_or("") == value)
        .cloned()
        .collect();
    Dataset::new(data.headers.clone(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_data(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> Dataset {
        Dataset::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_dates_sort_ascending() {
        let data = make_data(
            vec!["date", "v"],
            vec![vec!["2023-01-02", "2"], vec!["2023-01-01", "1"]],
        );
        let points = build_series(&data, 0, 1, None);
        assert_eq!(points[0].x, "2023-01-01");
        assert_eq!(points[1].x, "2023-01-02");
    }

    #[test]
    fn test_rfc3339_and_naive_formats_parse() {
        assert!(parse_timestamp("2023-06-01T12:00:00Z").is_some());
        assert!(parse_timestamp("2023-06-01 12:00:00").is_some());
        assert!(parse_timestamp("2023/06/01").is_some());
        assert!(parse_timestamp("06/15/2023").is_some());
        assert!(parse_timestamp("not a date").is_none());
        // Plain numbers must not be mistaken for dates.
        assert!(parse_timestamp("42").is_none());
    }

    #[test]
    fn test_unparseable_dates_sort_last() {
        let data = make_data(
            vec!["date", "v"],
            vec![
                vec!["garbage", "0"],
                vec!["2023-01-02", "2"],
                vec!["2023-01-01", "1"],
            ],
        );
        let points = build_series(&data, 0, 1, None);
        assert_eq!(points[0].x, "2023-01-01");
        assert_eq!(points[2].x, "garbage");
    }

    #[test]
    fn test_numeric_x_sorts_ascending() {
        let data = make_data(
            vec!["x", "y"],
            vec![vec!["10", "a"], vec!["2", "b"], vec!["30", "c"]],
        );
        let points = build_series(&data, 0, 1, None);
        let xs: Vec<&str> = points.iter().map(|p| p.x.as_str()).collect();
        assert_eq!(xs, vec!["2", "10", "30"]);
    }

    #[test]
    fn test_plain_text_x_preserves_order() {
        let data = make_data(
            vec!["x", "y"],
            vec![vec!["banana", "1"], vec!["apple", "2"]],
        );
        let points = build_series(&data, 0, 1, None);
        assert_eq!(points[0].x, "banana");
        assert_eq!(points[1].x, "apple");
    }

    #[test]
    fn test_empty_x_rows_dropped_and_y_coerced() {
        let data = make_data(
            vec!["x", "y"],
            vec![vec!["a", "nope"], vec!["", "5"], vec!["b", "3"]],
        );
        let points = build_series(&data, 0, 1, None);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].y, 0.0);
        assert_eq!(points[1].y, 3.0);
    }

    #[test]
    fn test_series_caps_at_limit() {
        let rows: Vec<Vec<String>> = (0..150)
            .map(|i| vec![format!("label{}", i), "1".to_string()])
            .collect();
        let data = Dataset::new(vec!["x".to_string(), "y".to_string()], rows);
        let points = build_series(&data, 0, 1, None);
        assert_eq!(points.len(), MAX_SERIES_POINTS);
    }

    #[test]
    fn test_group_tag_attached() {
        let data = make_data(
            vec!["x", "y", "g"],
            vec![vec!["a", "1", "east"], vec!["b", "2", "west"]],
        );
        let points = build_series(&data, 0, 1, Some(2));
        assert_eq!(points[0].group.as_deref(), Some("east"));
        assert_eq!(points[1].group.as_deref(), Some("west"));
    }

    #[test]
    fn test_split_by_group_first_seen_order() {
        let data = make_data(
            vec!["x", "y", "g"],
            vec![
                vec!["a", "1", "west"],
                vec!["b", "2", "east"],
                vec!["c", "3", "west"],
            ],
        );
        let points = build_series(&data, 0, 1, Some(2));
        let split = split_by_group(&points);
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].0, "west");
        assert_eq!(split[0].1.len(), 2);
        assert_eq!(split[1].0, "east");
    }

    #[test]
    fn test_filter_group_keeps_matching_rows() {
        let data = make_data(
            vec!["x", "y", "g"],
            vec![
                vec!["a", "1", "west"],
                vec!["b", "2", "east"],
                vec!["c", "3", "west"],
            ],
        );
        let filtered = filter_group(&data, 2, "west");
        assert_eq!(filtered.row_count(), 2);
        assert_eq!(filtered.headers, data.headers);
        assert!(filter_group(&data, 2, "north").is_empty());
    }
}
