// Library exports for chartprep

pub mod aggregate;
pub mod chart;
pub mod classify;
pub mod csv_reader;
pub mod data;
pub mod palette;
pub mod selection;
pub mod series;

pub use chart::{bar_chart, line_chart, pie_chart, BarChart, ChartError, LineChart, PieChart};
pub use classify::{classify_columns, is_numeric, ColumnProfile, ColumnRoles};
pub use data::Dataset;
pub use selection::{GroupMode, Selection, Workspace};
