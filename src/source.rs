//! Loading effort tables from Excel workbooks and CSV files.
//!
//! Workbooks are read eagerly with calamine. Every worksheet contributes rows;
//! columns are matched across sheets by trimmed header name and typed once from
//! all of their cells.

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use effortview_cli::FileFormat;
use polars::prelude::*;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

/// Column type chosen from the cells of one column across all sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExcelColType {
    Int64,
    Float64,
    Boolean,
    Utf8,
}

/// Header names and data rows of one worksheet.
struct SheetRows {
    headers: Vec<String>,
    rows: Vec<Vec<Data>>,
}

/// Resolve the format from `format` or the path's extension.
pub fn detect_format(path: &Path, format: Option<FileFormat>) -> EngineResult<FileFormat> {
    format
        .or_else(|| FileFormat::from_path(path))
        .ok_or_else(|| EngineError::load(path, "unrecognized file extension; use --format"))
}

/// Load the table at `path`. The whole table is read before anything is returned.
pub fn load_table(path: &Path, format: Option<FileFormat>) -> EngineResult<DataFrame> {
    let format = detect_format(path, format)?;
    let df = match format {
        FileFormat::Excel => {
            let workbook = open_workbook_auto(path).map_err(|e| EngineError::load(path, e))?;
            read_workbook(workbook).map_err(|e| EngineError::load(path, e))?
        }
        FileFormat::Csv => read_csv_path(path).map_err(|e| EngineError::load(path, e))?,
    };
    info!(path = %path.display(), rows = df.height(), columns = df.width(), "table loaded");
    Ok(df)
}

/// Load a table from in-memory file contents, e.g. an upload. `name` is used in
/// error messages only.
pub fn load_table_from_bytes(bytes: &[u8], format: FileFormat, name: &str) -> EngineResult<DataFrame> {
    let df = match format {
        FileFormat::Excel => {
            let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
                .map_err(|e| EngineError::load(name, e))?;
            read_workbook(workbook).map_err(|e| EngineError::load(name, e))?
        }
        FileFormat::Csv => {
            let df = CsvReadOptions::default()
                .with_has_header(true)
                .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
                .finish()
                .map_err(|e| EngineError::load(name, e))?;
            trim_column_names(df).map_err(|e| EngineError::load(name, e))?
        }
    };
    info!(source = name, rows = df.height(), columns = df.width(), "table loaded");
    Ok(df)
}

fn read_csv_path(path: &Path) -> PolarsResult<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.into()))?
        .finish()?;
    trim_column_names(df)
}

fn trim_column_names(mut df: DataFrame) -> PolarsResult<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.trim().to_string())
        .collect();
    df.set_column_names(names)?;
    Ok(df)
}

fn read_workbook<RS: Read + Seek>(mut workbook: Sheets<RS>) -> Result<DataFrame, String> {
    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err("workbook has no worksheets".to_string());
    }
    let mut sheets = Vec::with_capacity(sheet_names.len());
    for (idx, name) in sheet_names.iter().enumerate() {
        let range = workbook
            .worksheet_range_at(idx)
            .ok_or_else(|| format!("no sheet at index {}", idx))?
            .map_err(|e| format!("sheet '{}': {}", name, e))?;
        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            debug!(sheet = %name, "empty worksheet skipped");
            continue;
        };
        let sheet = SheetRows {
            headers: sheet_headers(header_row),
            rows: rows.map(|r| r.to_vec()).collect(),
        };
        debug!(sheet = %name, rows = sheet.rows.len(), "worksheet read");
        sheets.push(sheet);
    }
    combine_sheets(&sheets).map_err(|e| e.to_string())
}

fn cell_text(cell: &Data) -> Option<String> {
    use calamine::DataType as CalamineTrait;
    if CalamineTrait::is_empty(cell) || matches!(cell, Data::Error(_)) {
        return None;
    }
    Some(CalamineTrait::as_string(cell).unwrap_or_else(|| cell.to_string()))
}

/// Trimmed header names. Blank headers become `column_N`; repeats get a `.N` suffix.
fn sheet_headers(row: &[Data]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(row.len());
    for (idx, cell) in row.iter().enumerate() {
        let name = cell_text(cell)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("column_{}", idx + 1));
        let mut unique = name.clone();
        let mut n = 1;
        while headers.contains(&unique) {
            unique = format!("{}.{}", name, n);
            n += 1;
        }
        headers.push(unique);
    }
    headers
}

/// Stack sheets into one table: columns in first-seen order, cells missing from a
/// sheet are null.
fn combine_sheets(sheets: &[SheetRows]) -> PolarsResult<DataFrame> {
    let mut columns: Vec<String> = Vec::new();
    for sheet in sheets {
        for h in &sheet.headers {
            if !columns.contains(h) {
                columns.push(h.clone());
            }
        }
    }
    let mut series_vec = Vec::with_capacity(columns.len());
    for name in &columns {
        let mut cells: Vec<Option<&Data>> = Vec::new();
        for sheet in sheets {
            let pos = sheet.headers.iter().position(|h| h == name);
            cells.extend(
                sheet
                    .rows
                    .iter()
                    .map(|row| pos.and_then(|p| row.get(p)).filter(|c| cell_text(c).is_some())),
            );
        }
        let inferred = excel_infer_column_type(&cells);
        series_vec.push(excel_column_to_series(name, &cells, inferred).into());
    }
    DataFrame::new(series_vec)
}

/// Prefers Int64 for whole-number floats; any string cell makes the column Utf8.
fn excel_infer_column_type(cells: &[Option<&Data>]) -> ExcelColType {
    use calamine::DataType as CalamineTrait;
    let mut has_float = false;
    let mut has_int = false;
    let mut has_bool = false;
    for cell in cells.iter().flatten() {
        if CalamineTrait::is_string(*cell) {
            return ExcelColType::Utf8;
        }
        if CalamineTrait::is_float(*cell)
            || CalamineTrait::is_datetime(*cell)
            || CalamineTrait::is_datetime_iso(*cell)
        {
            has_float = true;
        }
        if CalamineTrait::is_int(*cell) {
            has_int = true;
        }
        if CalamineTrait::is_bool(*cell) {
            has_bool = true;
        }
    }
    if has_bool && (has_float || has_int) {
        ExcelColType::Utf8
    } else if has_float {
        let all_whole = cells.iter().flatten().all(|cell| {
            CalamineTrait::as_f64(*cell).is_none_or(|f| f.is_finite() && (f - f.trunc()).abs() < 1e-10)
        });
        if all_whole {
            ExcelColType::Int64
        } else {
            ExcelColType::Float64
        }
    } else if has_int {
        ExcelColType::Int64
    } else if has_bool {
        ExcelColType::Boolean
    } else {
        ExcelColType::Utf8
    }
}

fn excel_column_to_series(name: &str, cells: &[Option<&Data>], col_type: ExcelColType) -> Series {
    use calamine::DataType as CalamineTrait;
    match col_type {
        ExcelColType::Int64 => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| CalamineTrait::as_i64(cell)))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Float64 => {
            let v: Vec<Option<f64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| CalamineTrait::as_f64(cell)))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Boolean => {
            let v: Vec<Option<bool>> = cells
                .iter()
                .map(|c| c.and_then(|cell| CalamineTrait::get_bool(cell)))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Utf8 => {
            let v: Vec<Option<String>> = cells.iter().map(|c| c.and_then(cell_text)).collect();
            Series::new(name.into(), v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn test_headers_are_trimmed_and_unique() {
        let row = vec![s(" A "), Data::Empty, s("A"), s("B")];
        assert_eq!(sheet_headers(&row), ["A", "column_2", "A.1", "B"]);
    }

    #[test]
    fn test_infer_types() {
        let f = Data::Float(1.5);
        let w = Data::Float(2.0);
        let i = Data::Int(3);
        let t = s("x");
        assert_eq!(excel_infer_column_type(&[Some(&f), Some(&w)]), ExcelColType::Float64);
        assert_eq!(excel_infer_column_type(&[Some(&w), Some(&i), None]), ExcelColType::Int64);
        assert_eq!(excel_infer_column_type(&[Some(&w), Some(&t)]), ExcelColType::Utf8);
        assert_eq!(excel_infer_column_type(&[None, None]), ExcelColType::Utf8);
    }

    #[test]
    fn test_sheets_union_by_header() {
        let first = SheetRows {
            headers: vec!["A".into(), "m".into()],
            rows: vec![vec![s("x"), Data::Float(1.5)]],
        };
        let second = SheetRows {
            headers: vec!["m".into(), "B".into()],
            rows: vec![vec![Data::Float(2.0), s("y")], vec![Data::Float(0.5), Data::Empty]],
        };
        let df = combine_sheets(&[first, second]).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, ["A", "m", "B"]);
        assert_eq!(df.height(), 3);
        assert_eq!(df.column("m").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("A").unwrap().null_count(), 2);
        assert_eq!(df.column("B").unwrap().null_count(), 2);
    }

    #[test]
    fn test_csv_bytes_load() {
        let bytes = b" A ,m\nx,1.5\ny,2\n";
        let df = load_table_from_bytes(bytes, FileFormat::Csv, "upload.csv").unwrap();
        assert!(df.column("A").is_ok());
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_unknown_extension_is_source_error() {
        let err = load_table(Path::new("/tmp/data.parquet"), None).unwrap_err();
        assert!(matches!(err, EngineError::Source { .. }));
    }

    #[test]
    fn test_invalid_workbook_bytes_fail() {
        let err = load_table_from_bytes(b"not a workbook", FileFormat::Excel, "bad.xlsx").unwrap_err();
        assert!(err.to_string().contains("bad.xlsx"));
    }
}
