//! CSV export of the formatted summary table.

use polars::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::error::EngineResult;

/// File name offered when the user does not choose one.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "effort_summary.csv";

/// UTF-8 byte-order mark; spreadsheet tools use it to detect the encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub include_bom: bool,
    pub delimiter: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_bom: true,
            delimiter: b',',
        }
    }
}

/// Write `rows` as delimited text with a header row.
pub fn write_csv<W: Write>(rows: &DataFrame, mut writer: W, options: &ExportOptions) -> EngineResult<()> {
    if options.include_bom {
        writer.write_all(UTF8_BOM)?;
    }
    let mut df = rows.clone();
    CsvWriter::new(&mut writer)
        .with_separator(options.delimiter)
        .include_header(true)
        .finish(&mut df)?;
    writer.flush()?;
    Ok(())
}

/// The exported file contents, for callers that hand bytes to a download.
pub fn to_csv_bytes(rows: &DataFrame, options: &ExportOptions) -> EngineResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf, options)?;
    Ok(buf)
}

pub fn write_csv_file(rows: &DataFrame, path: &Path, options: &ExportOptions) -> EngineResult<()> {
    let file = File::create(path)?;
    write_csv(rows, BufWriter::new(file), options)?;
    info!(path = %path.display(), rows = rows.height(), "summary exported");
    Ok(())
}
