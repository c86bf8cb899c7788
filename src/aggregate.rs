//! Summing the measure column over the derived group key.

use polars::prelude::*;
use tracing::debug;

use crate::blank::fill_blank_labels;
use crate::error::{EngineError, EngineResult};
use crate::grouping::GroupKey;
use crate::schema::{has_column, ColumnSchema};

/// Outcome of the aggregation step for one pass.
#[derive(Debug, Clone)]
pub enum Aggregation {
    /// One row per distinct key, key columns first, summed measure last.
    Grouped { key: Vec<String>, rows: DataFrame },
    /// No key columns remained: the filtered rows as-is (category, unit and
    /// measure columns only) and their total.
    Ungrouped { total: f64, rows: DataFrame },
}

impl Aggregation {
    pub fn rows(&self) -> &DataFrame {
        match self {
            Self::Grouped { rows, .. } | Self::Ungrouped { rows, .. } => rows,
        }
    }

    /// Key columns of a grouped result; empty when ungrouped.
    pub fn key_columns(&self) -> &[String] {
        match self {
            Self::Grouped { key, .. } => key,
            Self::Ungrouped { .. } => &[],
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, Self::Grouped { .. })
    }
}

/// Fails with [`EngineError::MissingMeasure`] when `df` has no `measure` column.
pub fn require_measure(df: &DataFrame, measure: &str) -> EngineResult<()> {
    if has_column(df, measure) {
        Ok(())
    } else {
        Err(EngineError::MissingMeasure {
            column: measure.to_string(),
        })
    }
}

/// Sum of the measure column; 0.0 for an empty frame.
pub fn total_measure(df: &DataFrame, measure: &str) -> EngineResult<f64> {
    require_measure(df, measure)?;
    let values = df
        .column(measure)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(values.f64()?.sum().unwrap_or(0.0))
}

/// Group `frame` by `key` and sum `measure` per group.
///
/// Rows with a missing key value form their own group, labelled `blank_label`
/// in the output. Groups come back ordered by key ascending with blanks last.
pub fn aggregate(
    frame: &DataFrame,
    key: &[String],
    measure: &str,
    blank_label: &str,
) -> EngineResult<DataFrame> {
    require_measure(frame, measure)?;
    let keys: Vec<Expr> = key.iter().map(|c| col(c.as_str())).collect();
    let order = SortMultipleOptions {
        descending: vec![false; key.len()],
        nulls_last: vec![true; key.len()],
        maintain_order: true,
        ..Default::default()
    };
    let grouped = frame
        .clone()
        .lazy()
        .group_by(keys.clone())
        .agg([col(measure).cast(DataType::Float64).sum().alias(measure)])
        .sort_by_exprs(keys, order)
        .collect()?;
    debug!(groups = grouped.height(), key = ?key, "aggregated");
    Ok(fill_blank_labels(grouped, key, blank_label)?)
}

/// Aggregate the filtered rows by `key`, or fall back to the flat listing and
/// total when the key is empty.
pub fn summarize(
    frame: &DataFrame,
    key: &GroupKey,
    schema: &ColumnSchema,
) -> EngineResult<Aggregation> {
    let measure = schema.measure_column.as_str();
    require_measure(frame, measure)?;
    if key.is_empty() {
        let total = total_measure(frame, measure)?;
        let rows = frame.select(schema.known_columns(frame))?;
        return Ok(Aggregation::Ungrouped { total, rows });
    }
    let rows = aggregate(frame, key.columns(), measure, &schema.blank_label)?;
    Ok(Aggregation::Grouped {
        key: key.columns().to_vec(),
        rows,
    })
}
