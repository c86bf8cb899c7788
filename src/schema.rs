//! Names of the columns the engine knows about.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Category columns in priority order, coarse to fine: three user fields
/// followed by five work-content levels.
pub const DEFAULT_CATEGORY_COLUMNS: [&str; 8] = [
    "USER_FIELD_01",
    "USER_FIELD_02",
    "USER_FIELD_03",
    "業務内容1",
    "業務内容2",
    "業務内容3",
    "業務内容4",
    "業務内容5",
];
pub const DEFAULT_UNIT_COLUMN: &str = "UNIT";
pub const DEFAULT_MEASURE_COLUMN: &str = "作業時間(h)";
/// Display placeholder for missing values in option lists and grouped output.
pub const BLANK_LABEL: &str = "[空白]";

/// The category hierarchy, unit, measure and blank label for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    pub category_columns: Vec<String>,
    pub unit_column: String,
    pub measure_column: String,
    pub blank_label: String,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            category_columns: DEFAULT_CATEGORY_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            unit_column: DEFAULT_UNIT_COLUMN.to_string(),
            measure_column: DEFAULT_MEASURE_COLUMN.to_string(),
            blank_label: BLANK_LABEL.to_string(),
        }
    }
}

impl ColumnSchema {
    /// Category columns present in `df`, in priority order.
    pub fn available_categories(&self, df: &DataFrame) -> Vec<String> {
        self.category_columns
            .iter()
            .filter(|c| has_column(df, c))
            .cloned()
            .collect()
    }

    /// The unit column name when `df` has it.
    pub fn unit_in(&self, df: &DataFrame) -> Option<&str> {
        has_column(df, &self.unit_column).then_some(self.unit_column.as_str())
    }

    pub fn has_measure(&self, df: &DataFrame) -> bool {
        has_column(df, &self.measure_column)
    }

    /// Available category columns, then the unit column, then the measure column,
    /// skipping any the table lacks.
    pub fn known_columns(&self, df: &DataFrame) -> Vec<String> {
        let mut cols = self.available_categories(df);
        if let Some(unit) = self.unit_in(df) {
            if !cols.iter().any(|c| c == unit) {
                cols.push(unit.to_string());
            }
        }
        if self.has_measure(df) {
            cols.push(self.measure_column.clone());
        }
        cols
    }
}

pub(crate) fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}
