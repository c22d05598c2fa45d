use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;

use crate::data::Dataset;

/// Read delimited text into a Dataset. The first record is the header row
/// and fixes the column set; short records are padded with empty cells and
/// long records truncated to the header width.
pub fn read_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read record {}", idx + 2))?;
        if record.len() != headers.len() {
            warn!(
                "record {} has {} fields, expected {}",
                idx + 2,
                record.len(),
                headers.len()
            );
        }
        let mut row: Vec<String> = record.iter().map(|cell| cell.to_string()).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(Dataset::new(headers, rows))
}

/// Read a delimited file. Unless a delimiter is given, `.tsv` files read as
/// tab-separated and everything else as comma-separated.
pub fn read_from_path(path: &Path, delimiter: Option<u8>) -> Result<Dataset> {
    let delimiter = delimiter.unwrap_or_else(|| delimiter_for_path(path));
    let file =
        File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    read_from_reader(file, delimiter)
}

pub fn read_from_stdin(delimiter: u8) -> Result<Dataset> {
    read_from_reader(io::stdin(), delimiter)
}

fn delimiter_for_path(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}
