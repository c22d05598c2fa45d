use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};

use chartprep::{classify_columns, csv_reader, GroupMode, Selection, Workspace};

#[derive(Parser, Debug)]
#[command(name = "chartprep")]
#[command(about = "Shape delimited data into chart-ready JSON series", long_about = None)]
struct Args {
    /// Input file; '-' or omitted reads from stdin
    file: Option<PathBuf>,

    /// Chart type to prepare
    #[arg(long, value_enum, default_value = "bar")]
    chart: ChartKind,

    /// Print the column role classification instead of chart data
    #[arg(long)]
    classify: bool,

    /// Field delimiter (defaults to ',' or '\t' for .tsv files)
    #[arg(long)]
    delimiter: Option<char>,

    /// Category/label column for bar and pie (defaults to inference)
    #[arg(long)]
    label: Option<String>,

    /// Value column for bar and pie (defaults to inference)
    #[arg(long)]
    value: Option<String>,

    /// X axis column for line (defaults to inference)
    #[arg(long)]
    x: Option<String>,

    /// Y axis column for line (defaults to inference)
    #[arg(long)]
    y: Option<String>,

    /// Grouping column for line (defaults to inference)
    #[arg(long)]
    group: Option<String>,

    /// Restrict the line chart to one grouping value instead of splitting
    /// all groups into separate series
    #[arg(long)]
    group_value: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ChartKind {
    Bar,
    Line,
    Pie,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let delimiter = args
        .delimiter
        .map(|c| {
            u8::try_from(c).map_err(|_| anyhow!("Delimiter must be a single ASCII character"))
        })
        .transpose()?;

    let dataset = match &args.file {
        Some(path) if path.as_os_str() != "-" => csv_reader::read_from_path(path, delimiter)
            .context("Failed to read input file")?,
        _ => csv_reader::read_from_stdin(delimiter.unwrap_or(b','))
            .context("Failed to read CSV from stdin")?,
    };

    let output = if args.classify {
        let profiles = classify_columns(&dataset);
        serde_json::to_string_pretty(&profiles)?
    } else {
        let mut workspace = Workspace::new(dataset);
        apply_overrides(&mut workspace.selection, &args);

        match args.chart {
            ChartKind::Bar => serde_json::to_string_pretty(&workspace.bar_chart()?)?,
            ChartKind::Line => serde_json::to_string_pretty(&workspace.line_chart()?)?,
            ChartKind::Pie => serde_json::to_string_pretty(&workspace.pie_chart()?)?,
        }
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", output).context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}

/// Explicit column flags win over the inferred defaults.
fn apply_overrides(selection: &mut Selection, args: &Args) {
    if let Some(label) = &args.label {
        selection.label_col = Some(label.clone());
    }
    if let Some(value) = &args.value {
        selection.value_col = Some(value.clone());
    }
    if let Some(x) = &args.x {
        selection.x_col = Some(x.clone());
    }
    if let Some(y) = &args.y {
        selection.y_col = Some(y.clone());
    }
    if let Some(group) = &args.group {
        selection.group_col = Some(group.clone());
    }
    if let Some(group_value) = &args.group_value {
        selection.group_mode = GroupMode::Single(group_value.clone());
    }
}
