//! Cascading categorical filters.
//!
//! Category columns are narrowed one after another in priority order, each
//! column's option list enumerated from the rows that survived the columns
//! before it. The unit column is always handled last and AND-combined with the
//! rest; its options come from the whole table.

use polars::prelude::*;
use std::str::FromStr;
use tracing::debug;

use crate::blank::{cell_labels, column_options, BlankSplit};
use crate::error::EngineError;
use crate::schema::ColumnSchema;

/// The values chosen for each column, in the order they were set.
///
/// A column with no entry (or an empty list) is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    entries: Vec<(String, Vec<String>)>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSelection::set`].
    pub fn with<I, S>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(column, values.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the selection for `column`.
    pub fn set(&mut self, column: impl Into<String>, values: Vec<String>) {
        let column = column.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((column, values)),
        }
    }

    /// Chosen values for `column`; empty when unconstrained.
    pub fn get(&self, column: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    /// True when no column has a non-empty selection.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, v)| v.is_empty())
    }

    /// Parse repeated `COLUMN=V1,V2` arguments. Repeating a column adds to its values.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, EngineError> {
        let mut selection = Self::new();
        for arg in args {
            let filter: ColumnFilter = arg.as_ref().parse()?;
            let mut values = selection.get(&filter.column).to_vec();
            for v in filter.values {
                if !values.contains(&v) {
                    values.push(v);
                }
            }
            selection.set(filter.column, values);
        }
        Ok(selection)
    }
}

/// One `COLUMN=V1,V2` filter argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFilter {
    pub column: String,
    pub values: Vec<String>,
}

impl FromStr for ColumnFilter {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, values) = s
            .split_once('=')
            .ok_or_else(|| EngineError::InvalidFilter(s.to_string()))?;
        let column = column.trim();
        let values: Vec<String> = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        if column.is_empty() || values.is_empty() {
            return Err(EngineError::InvalidFilter(s.to_string()));
        }
        Ok(Self {
            column: column.to_string(),
            values,
        })
    }
}

/// Category columns that currently have a non-empty selection, in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedFilters {
    columns: Vec<String>,
}

impl AppliedFilters {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}

/// Option list offered for one column during a pass, with what was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOptions {
    pub column: String,
    pub options: Vec<String>,
    pub selected: Vec<String>,
    pub is_unit: bool,
}

/// Result of applying a selection to a table.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Rows that passed every filter. May be empty.
    pub frame: DataFrame,
    pub applied: AppliedFilters,
    /// True when the unit column was constrained.
    pub unit_filtered: bool,
    /// Options per column in the order they were evaluated (unit last).
    pub options: Vec<ColumnOptions>,
}

impl FilterOutcome {
    /// Number of constrained category columns. The unit filter is reported
    /// separately through `unit_filtered`.
    pub fn filter_count(&self) -> usize {
        self.applied.len()
    }
}

/// Apply `selection` to `table` as a cascade over the schema's category columns,
/// then the unit column.
///
/// Columns absent from the table, or with no options left, are skipped.
pub fn apply_filters(
    table: &DataFrame,
    schema: &ColumnSchema,
    selection: &FilterSelection,
) -> PolarsResult<FilterOutcome> {
    let available = schema.available_categories(table);
    let blank = schema.blank_label.as_str();
    let mut frame = table.clone();
    let mut applied = Vec::new();
    let mut options = Vec::new();

    for column in &available {
        let column_opts = column_options(&frame, column, blank);
        if column_opts.is_empty() {
            debug!(column = %column, "no options left; skipping filter");
            continue;
        }
        let selected = selection.get(column);
        options.push(ColumnOptions {
            column: column.clone(),
            options: column_opts,
            selected: selected.to_vec(),
            is_unit: false,
        });
        if selected.is_empty() {
            continue;
        }
        frame = filter_column(&frame, column, selected, blank)?;
        applied.push(column.clone());
        debug!(column = %column, rows = frame.height(), "category filter applied");
    }

    let mut unit_filtered = false;
    if let Some(unit) = schema.unit_in(table) {
        let unit_opts = column_options(table, unit, blank);
        let selected = selection.get(unit);
        if !unit_opts.is_empty() {
            options.push(ColumnOptions {
                column: unit.to_string(),
                options: unit_opts,
                selected: selected.to_vec(),
                is_unit: true,
            });
            if !selected.is_empty() {
                frame = filter_column(&frame, unit, selected, blank)?;
                unit_filtered = true;
                debug!(column = %unit, rows = frame.height(), "unit filter applied");
            }
        }
    }

    for column in selection.columns() {
        if !available.iter().any(|c| c == column) && schema.unit_in(table) != Some(column) {
            debug!(column = %column, "ignoring filter for column not in table");
        }
    }

    Ok(FilterOutcome {
        frame,
        applied: AppliedFilters::new(applied),
        unit_filtered,
        options,
    })
}

/// Keep rows whose `column` label is among the selected values, or is missing
/// when the blank label was selected.
fn filter_column(
    frame: &DataFrame,
    column: &str,
    selected: &[String],
    blank_label: &str,
) -> PolarsResult<DataFrame> {
    let split = BlankSplit::from_selection(selected, blank_label);
    let (labels, _) = cell_labels(frame.column(column)?);
    let keep: Vec<bool> = labels.iter().map(|l| split.matches(l.as_deref())).collect();
    let mask = BooleanChunked::new("mask".into(), keep);
    frame.filter(&mask)
}
