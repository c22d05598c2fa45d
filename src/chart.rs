use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::aggregate::{aggregate_for_bar, aggregate_for_pie};
use crate::data::Dataset;
use crate::palette::ColorPalette;
use crate::selection::{GroupMode, Workspace};
use crate::series::{build_series, filter_group, split_by_group, SeriesPoint};

/// Why a chart could not be produced from the current dataset/selection.
/// Malformed cell values are never an error; they degrade to zero inside the
/// pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    /// Every chart needs one key column and one value column.
    #[error("insufficient columns: chart requires at least 2, dataset has {0}")]
    InsufficientColumns(usize),
    /// The dataset or the shaped output has no rows to draw.
    #[error("no renderable data for the current selection")]
    NoRenderableData,
    /// A selected column is not part of the dataset. Unreachable through
    /// inferred defaults, which only name existing columns.
    #[error("column '{0}' not found in dataset")]
    ColumnNotFound(String),
}

/// One colored bar or pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub label_column: String,
    pub value_column: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub label_column: String,
    pub value_column: String,
    pub slices: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub color: String,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub x_column: String,
    pub y_column: String,
    pub series: Vec<LineSeries>,
}

/// Grouping request for a line chart: which column partitions the rows and
/// whether all groups are shown or a single one.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    pub column: String,
    pub mode: GroupMode,
}

fn ensure_two_columns(data: &Dataset) -> Result<(), ChartError> {
    if data.column_count() < 2 {
        return Err(ChartError::InsufficientColumns(data.column_count()));
    }
    Ok(())
}

fn resolve_column(data: &Dataset, name: &str) -> Result<usize, ChartError> {
    data.column_index(name)
        .ok_or_else(|| ChartError::ColumnNotFound(name.to_string()))
}

fn color_points(points: Vec<crate::aggregate::AggregatedPoint>) -> Vec<ChartPoint> {
    let palette = ColorPalette::standard();
    points
        .into_iter()
        .enumerate()
        .map(|(i, p)| ChartPoint {
            label: p.label,
            value: p.value,
            color: palette.slot(i).to_string(),
        })
        .collect()
}

/// Aggregate the dataset into bar-chart groups: sum per label in first-seen
/// order, capped, colors by slot.
pub fn bar_chart(
    data: &Dataset,
    label_col: &str,
    value_col: &str,
) -> Result<BarChart, ChartError> {
    ensure_two_columns(data)?;
    let key_idx = resolve_column(data, label_col)?;
    let value_idx = resolve_column(data, value_col)?;

    let points = color_points(aggregate_for_bar(data, key_idx, value_idx));
    if points.is_empty() {
        return Err(ChartError::NoRenderableData);
    }
    debug!("bar chart: {} groups from {} rows", points.len(), data.row_count());

    Ok(BarChart {
        label_column: data.headers[key_idx].clone(),
        value_column: data.headers[value_idx].clone(),
        points,
    })
}

/// Aggregate the dataset into pie slices: positive sums only, sorted
/// descending, capped, colors by slot.
pub fn pie_chart(
    data: &Dataset,
    label_col: &str,
    value_col: &str,
) -> Result<PieChart, ChartError> {
    ensure_two_columns(data)?;
    let key_idx = resolve_column(data, label_col)?;
    let value_idx = resolve_column(data, value_col)?;

    let slices = color_points(aggregate_for_pie(data, key_idx, value_idx));
    if slices.is_empty() {
        return Err(ChartError::NoRenderableData);
    }
    debug!("pie chart: {} slices from {} rows", slices.len(), data.row_count());

    Ok(PieChart {
        label_column: data.headers[key_idx].clone(),
        value_column: data.headers[value_idx].clone(),
        slices,
    })
}

/// Build the ordered line series. With a grouping in All mode the single
/// series splits into one sub-series per group value; in Single mode the
/// rows are pre-filtered to that one group before the pipeline runs.
pub fn line_chart(
    data: &Dataset,
    x_col: &str,
    y_col: &str,
    grouping: Option<&Grouping>,
) -> Result<LineChart, ChartError> {
    ensure_two_columns(data)?;
    let x_idx = resolve_column(data, x_col)?;
    let y_idx = resolve_column(data, y_col)?;

    let palette = ColorPalette::standard();
    let series = match grouping {
        None => {
            let points = build_series(data, x_idx, y_idx, None);
            vec![LineSeries {
                name: data.headers[y_idx].clone(),
                color: palette.slot(0).to_string(),
                points,
            }]
        }
        Some(grouping) => {
            let group_idx = resolve_column(data, &grouping.column)?;
            match &grouping.mode {
                GroupMode::Single(value) => {
                    let filtered = filter_group(data, group_idx, value);
                    let points = build_series(&filtered, x_idx, y_idx, None);
                    vec![LineSeries {
                        name: value.clone(),
                        color: palette.slot(0).to_string(),
                        points,
                    }]
                }
                GroupMode::All => {
                    let points = build_series(data, x_idx, y_idx, Some(group_idx));
                    split_by_group(&points)
                        .into_iter()
                        .enumerate()
                        .map(|(i, (name, points))| LineSeries {
                            name,
                            color: palette.slot(i).to_string(),
                            points,
                        })
                        .collect()
                }
            }
        }
    };

    if series.iter().all(|s| s.points.is_empty()) {
        return Err(ChartError::NoRenderableData);
    }
    debug!("line chart: {} series from {} rows", series.len(), data.row_count());

    Ok(LineChart {
        x_column: data.headers[x_idx].clone(),
        y_column: data.headers[y_idx].clone(),
        series,
    })
}

impl Workspace {
    /// Bar chart from the current dataset and selection.
    pub fn bar_chart(&self) -> Result<BarChart, ChartError> {
        bar_chart(
            &self.dataset,
            self.selection.label_col.as_deref().unwrap_or(""),
            self.selection.value_col.as_deref().unwrap_or(""),
        )
    }

    /// Pie chart from the current dataset and selection.
    pub fn pie_chart(&self) -> Result<PieChart, ChartError> {
        pie_chart(
            &self.dataset,
            self.selection.label_col.as_deref().unwrap_or(""),
            self.selection.value_col.as_deref().unwrap_or(""),
        )
    }

    /// Line chart from the current dataset and selection, grouped when the
    /// selection carries a grouping column.
    pub fn line_chart(&self) -> Result<LineChart, ChartError> {
        let grouping = self.selection.group_col.as_ref().map(|column| Grouping {
            column: column.clone(),
            mode: self.selection.group_mode.clone(),
        });
        line_chart(
            &self.dataset,
            self.selection.x_col.as_deref().unwrap_or(""),
            self.selection.y_col.as_deref().unwrap_or(""),
            grouping.as_ref(),
        )
    }
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
    fn test_single_column_fails_all_chart_types() {
        let data = make_data(vec!["only"], vec![vec!["a"], vec!["b"]]);
        assert_eq!(
            bar_chart(&data, "only", "only"),
            Err(ChartError::InsufficientColumns(1))
        );
        assert!(matches!(
            pie_chart(&data, "only", "only"),
            Err(ChartError::InsufficientColumns(1))
        ));
        assert!(matches!(
            line_chart(&data, "only", "only", None),
            Err(ChartError::InsufficientColumns(1))
        ));
    }

    #[test]
    fn test_empty_dataset_is_no_renderable_data() {
        let data = make_data(vec!["k", "v"], vec![]);
        assert_eq!(bar_chart(&data, "k", "v"), Err(ChartError::NoRenderableData));
        assert!(matches!(
            pie_chart(&data, "k", "v"),
            Err(ChartError::NoRenderableData)
        ));
        assert!(matches!(
            line_chart(&data, "k", "v", None),
            Err(ChartError::NoRenderableData)
        ));
    }

    #[test]
    fn test_unknown_column_reported() {
        let data = make_data(vec!["k", "v"], vec![vec!["a", "1"]]);
        assert_eq!(
            bar_chart(&data, "missing", "v"),
            Err(ChartError::ColumnNotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_bar_chart_points_and_colors() {
        let data = make_data(
            vec!["category", "amount"],
            vec![vec!["A", "10"], vec!["B", "20"], vec!["A", "5"]],
        );
        let chart = bar_chart(&data, "category", "amount").unwrap();
        assert_eq!(chart.label_column, "category");
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.points[0].label, "A");
        assert_eq!(chart.points[0].value, 15.0);
        assert_eq!(chart.points[1].label, "B");
        assert_eq!(chart.points[1].value, 20.0);

        let palette = ColorPalette::standard();
        assert_eq!(chart.points[0].color, palette.slot(0));
        assert_eq!(chart.points[1].color, palette.slot(1));
    }

    #[test]
    fn test_pie_chart_all_non_positive_is_no_renderable_data() {
        let data = make_data(
            vec!["k", "v"],
            vec![vec!["A", "-1"], vec!["B", "0"]],
        );
        assert_eq!(pie_chart(&data, "k", "v"), Err(ChartError::NoRenderableData));
    }

    #[test]
    fn test_line_chart_ungrouped_single_series() {
        let data = make_data(
            vec!["date", "temp"],
            vec![vec!["2023-01-02", "8"], vec!["2023-01-01", "5"]],
        );
        let chart = line_chart(&data, "date", "temp", None).unwrap();
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].name, "temp");
        let xs: Vec<&str> = chart.series[0].points.iter().map(|p| p.x.as_str()).collect();
        assert_eq!(xs, vec!["2023-01-01", "2023-01-02"]);
    }

    #[test]
    fn test_line_chart_grouped_all_splits_series() {
        let data = make_data(
            vec!["date", "sales", "region"],
            vec![
                vec!["2023-01-01", "10", "west"],
                vec!["2023-01-01", "20", "east"],
                vec!["2023-01-02", "15", "west"],
            ],
        );
        let grouping = Grouping {
            column: "region".to_string(),
            mode: GroupMode::All,
        };
        let chart = line_chart(&data, "date", "sales", Some(&grouping)).unwrap();
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "west");
        assert_eq!(chart.series[0].points.len(), 2);
        assert_eq!(chart.series[1].name, "east");
        assert_ne!(chart.series[0].color, chart.series[1].color);
    }

    #[test]
    fn test_line_chart_grouped_single_filters_rows() {
        let data = make_data(
            vec!["date", "sales", "region"],
            vec![
                vec!["2023-01-01", "10", "west"],
                vec!["2023-01-01", "20", "east"],
                vec!["2023-01-02", "15", "west"],
            ],
        );
        let grouping = Grouping {
            column: "region".to_string(),
            mode: GroupMode::Single("east".to_string()),
        };
        let chart = line_chart(&data, "date", "sales", Some(&grouping)).unwrap();
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].name, "east");
        assert_eq!(chart.series[0].points.len(), 1);
        assert_eq!(chart.series[0].points[0].y, 20.0);
    }

    #[test]
    fn test_line_chart_filtered_to_nothing_is_no_renderable_data() {
        let data = make_data(
            vec!["date", "sales", "region"],
            vec![vec!["2023-01-01", "10", "west"]],
        );
        let grouping = Grouping {
            column: "region".to_string(),
            mode: GroupMode::Single("north".to_string()),
        };
        assert_eq!(
            line_chart(&data, "date", "sales", Some(&grouping)),
            Err(ChartError::NoRenderableData)
        );
    }

    #[test]
    fn test_workspace_chart_methods_use_selection() {
        let mut workspace = Workspace::new(make_data(
            vec!["category", "amount"],
            vec![vec!["A", "1"], vec!["B", "2"], vec!["A", "2"]],
        ));
        // "category" has 2 distinct values, so it doubles as the default
        // grouping key; restrict the line chart to one group.
        workspace.selection.group_mode = GroupMode::Single("A".to_string());

        let bar = workspace.bar_chart().unwrap();
        assert_eq!(bar.points[0].label, "A");
        assert_eq!(bar.points[0].value, 3.0);

        let pie = workspace.pie_chart().unwrap();
        assert_eq!(pie.slices[0].label, "A");

        let line = workspace.line_chart().unwrap();
        assert_eq!(line.series.len(), 1);
        assert_eq!(line.series[0].name, "A");
    }
}
