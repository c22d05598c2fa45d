use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use crate::data::Dataset;

/// Column names that mark a column as a sequential/temporal axis regardless
/// of its values.
const SEQUENTIAL_NAME_HINTS: &[&str] = &["date", "time", "year", "month", "day"];

/// Column names that mark a column as a geographic key regardless of its
/// values.
const GEOGRAPHIC_NAME_HINTS: &[&str] = &[
    "state",
    "region",
    "country",
    "province",
    "location",
    "territory",
];

/// Non-exclusive role tags for a single column. A column can carry several
/// tags at once (a numeric column with few distinct values is also
/// categorical).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnRoles {
    pub numeric: bool,
    pub categorical: bool,
    pub sequential: bool,
    pub geographic: bool,
}

/// Classification result for one column, in dataset column order.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub roles: ColumnRoles,
    pub distinct: usize,
}

/// Whether a single cell behaves as a number.
///
/// A cell passes if EITHER a strict full-string parse OR a leading-prefix
/// parse yields a finite value, so "12abc" counts as numeric (prefix 12).
/// Empty and whitespace-only cells never pass.
pub fn is_numeric(cell: &str) -> bool {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return false;
    }
    if matches!(trimmed.parse::<f64>(), Ok(v) if v.is_finite()) {
        return true;
    }
    numeric_prefix(trimmed).is_some()
}

/// The value a cell contributes to a sum: the strict parse if it succeeds,
/// else the leading-prefix parse, else 0.0.
pub fn numeric_value(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        if v.is_finite() {
            return v;
        }
    }
    numeric_prefix(trimmed).unwrap_or(0.0)
}

/// Parse the longest numeric prefix of a string: optional sign, digits with
/// at most one decimal point, optional exponent. Returns None when no digit
/// is present or the prefix is not finite.
fn numeric_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {
                seen_digit = true;
                end += 1;
            }
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return None;
    }

    // Optional exponent; only consumed when it carries at least one digit.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn name_matches(name: &str, hints: &[&str]) -> bool {
    let lower = name.to_ascii_lowercase();
    hints.iter().any(|h| lower.contains(h))
}

/// Classify every column of the dataset, in column order.
///
/// An empty dataset excludes every column from every role.
pub fn classify_columns(data: &Dataset) -> Vec<ColumnProfile> {
    data.headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let profile = classify_column(data, idx, name);
            debug!(
                "column '{}': roles {:?}, {} distinct",
                profile.name, profile.roles, profile.distinct
            );
            profile
        })
        .collect()
}

fn classify_column(data: &Dataset, idx: usize, name: &str) -> ColumnProfile {
    let rows = data.row_count();
    if rows == 0 {
        return ColumnProfile {
            name: name.to_string(),
            roles: ColumnRoles::default(),
            distinct: 0,
        };
    }

    let mut numeric_cells = 0usize;
    let mut seen: HashSet<&str> = HashSet::new();
    for cell in data.column_values(idx) {
        if is_numeric(cell) {
            numeric_cells += 1;
        }
        seen.insert(cell);
    }
    let distinct = seen.len();

    let numeric = numeric_cells as f64 / rows as f64 >= 0.8;
    let categorical = !numeric || (distinct as f64) < 0.2 * rows as f64;
    let sequential = name_matches(name, SEQUENTIAL_NAME_HINTS)
        || (distinct > 3 && distinct as f64 <= 0.5 * rows as f64);
    let geographic = name_matches(name, GEOGRAPHIC_NAME_HINTS) || (2..=100).contains(&distinct);

    ColumnProfile {
        name: name.to_string(),
        roles: ColumnRoles {
            numeric,
            categorical,
            sequential,
            geographic,
        },
        distinct,
    }
}
