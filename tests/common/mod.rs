#![allow(dead_code)]

use effortview::schema::{BLANK_LABEL, DEFAULT_MEASURE_COLUMN, DEFAULT_UNIT_COLUMN};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const MEASURE: &str = DEFAULT_MEASURE_COLUMN;
pub const UNIT: &str = DEFAULT_UNIT_COLUMN;
pub const BLANK: &str = BLANK_LABEL;

/// Two rows under the default schema: X=3.5h, Y=1.5h.
pub fn two_row_table() -> DataFrame {
    df!(
        "USER_FIELD_01" => &["X", "Y"],
        UNIT => &["h", "h"],
        MEASURE => &[3.5_f64, 1.5]
    )
    .unwrap()
}

/// A small effort log with a missing value in every category level.
pub fn effort_table() -> DataFrame {
    df!(
        "USER_FIELD_01" => &[Some("開発"), Some("開発"), Some("開発"), Some("保守"), Some("保守"), None],
        "USER_FIELD_02" => &[Some("A社"), Some("A社"), Some("B社"), Some("A社"), None, Some("B社")],
        "業務内容1" => &[Some("設計"), Some("実装"), Some("実装"), None, Some("調査"), Some("設計")],
        "業務内容2" => &[Some("基本"), None, Some("機能"), Some("障害"), Some("障害"), Some("詳細")],
        UNIT => &[Some("h"), Some("h"), Some("h"), Some("d"), None, Some("h")],
        MEASURE => &[2.0_f64, 3.5, 1.25, 0.5, 4.0, 2.75]
    )
    .unwrap()
}

/// Strings of a column, missing values as empty strings.
pub fn strings(df: &DataFrame, name: &str) -> Vec<String> {
    let (labels, _) = effortview::blank::cell_labels(df.column(name).unwrap());
    labels.into_iter().map(Option::unwrap_or_default).collect()
}

pub fn floats(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect()
}

pub fn write_csv_fixture(dir: &Path, name: &str, df: &DataFrame) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    let mut df = df.clone();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
    path
}
