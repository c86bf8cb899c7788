//! Presentation of aggregated rows: sort order, column order and numeric
//! precision. Formatting happens last and never feeds back into sorting.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::blank::cell_labels;
use crate::error::{EngineError, EngineResult};
use crate::schema::has_column;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    pub fn is_ascending(self) -> bool {
        self == Self::Ascending
    }

    pub fn reversed(self) -> Self {
        Self::from_ascending(!self.is_ascending())
    }
}

/// Column and direction chosen for the summary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// The measure column when `rows` has it, else the first column.
    pub fn default_for(rows: &DataFrame, measure: &str, direction: SortDirection) -> Option<Self> {
        if has_column(rows, measure) {
            return Some(Self::new(measure, direction));
        }
        rows.get_column_names()
            .first()
            .map(|name| Self::new(name.as_str(), direction))
    }
}

/// How values of the sort column are compared, chosen once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortStrategy {
    Numeric,
    /// By string form; total for any column type.
    Text,
}

impl SortStrategy {
    pub fn for_dtype(dtype: &DataType) -> Self {
        match dtype {
            DataType::Int32
            | DataType::Int64
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64 => Self::Numeric,
            _ => Self::Text,
        }
    }
}

/// Rows after sorting, plus a note when the requested sort could not be applied.
#[derive(Debug, Clone)]
pub struct SortedRows {
    pub rows: DataFrame,
    pub warning: Option<String>,
}

/// Stable sort of `rows` by `spec`. Ties keep their pre-sort order and missing
/// values go last in either direction. An unknown sort column leaves the rows
/// unsorted with a warning.
pub fn sort_rows(rows: &DataFrame, spec: &SortSpec) -> PolarsResult<SortedRows> {
    let Ok(column) = rows.column(&spec.column) else {
        let msg = format!("sort column '{}' not found; showing unsorted rows", spec.column);
        warn!("{}", msg);
        return Ok(SortedRows {
            rows: rows.clone(),
            warning: Some(msg),
        });
    };

    let ascending = spec.direction.is_ascending();
    let mut order: Vec<IdxSize> = (0..rows.height() as IdxSize).collect();
    match SortStrategy::for_dtype(column.dtype()) {
        SortStrategy::Numeric => {
            let values = column
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            let values: Vec<Option<f64>> = values.f64()?.into_iter().collect();
            order.sort_by(|&a, &b| {
                compare_missing_last(values[a as usize], values[b as usize], ascending, f64::total_cmp)
            });
        }
        SortStrategy::Text => {
            let (labels, _) = cell_labels(column);
            order.sort_by(|&a, &b| {
                compare_missing_last(
                    labels[a as usize].as_deref(),
                    labels[b as usize].as_deref(),
                    ascending,
                    |x: &&str, y: &&str| x.cmp(y),
                )
            });
        }
    }
    let idx = IdxCa::from_vec("idx".into(), order);
    Ok(SortedRows {
        rows: rows.take(&idx)?,
        warning: None,
    })
}

fn compare_missing_last<T>(
    a: Option<T>,
    b: Option<T>,
    ascending: bool,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ord = cmp(&a, &b);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Presentation order: non-measure columns as aggregated, the unit column just
/// before the measure, the measure last. Unchanged when the measure is absent.
pub fn display_column_order(columns: &[String], unit: Option<&str>, measure: &str) -> Vec<String> {
    if !columns.iter().any(|c| c == measure) {
        return columns.to_vec();
    }
    let mut order: Vec<String> = columns.iter().filter(|c| *c != measure).cloned().collect();
    if let Some(unit) = unit {
        if let Some(pos) = order.iter().position(|c| c == unit) {
            let unit_col = order.remove(pos);
            order.push(unit_col);
        }
    }
    order.push(measure.to_string());
    order
}

/// Number of decimal places for effort hours, 0 to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precision(u8);

impl Precision {
    pub const MAX: u8 = 4;

    pub fn new(places: i64) -> EngineResult<Self> {
        if (0..=i64::from(Self::MAX)).contains(&places) {
            Ok(Self(places as u8))
        } else {
            Err(EngineError::InvalidPrecision(places.to_string()))
        }
    }

    /// Nearest valid precision, for inputs that behave like a bounded spinner.
    pub fn clamped(places: i64) -> Self {
        Self(places.clamp(0, i64::from(Self::MAX)) as u8)
    }

    pub fn places(self) -> usize {
        usize::from(self.0)
    }

    pub fn format(self, value: f64) -> String {
        format!("{:.*}", self.places(), value)
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<i64> for Precision {
    type Error = EngineError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Precision {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let places: i64 = s
            .trim()
            .parse()
            .map_err(|_| EngineError::InvalidPrecision(s.to_string()))?;
        Self::new(places)
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Replace the measure column with fixed-point strings.
pub fn format_measure(rows: &DataFrame, measure: &str, precision: Precision) -> PolarsResult<DataFrame> {
    let values = rows
        .column(measure)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let formatted: Vec<Option<String>> = values
        .f64()?
        .into_iter()
        .map(|v| v.map(|v| precision.format(v)))
        .collect();
    let mut out = rows.clone();
    out.with_column(Series::new(measure.into(), formatted))?;
    Ok(out)
}

/// The summary table ready for display and export.
#[derive(Debug, Clone)]
pub struct DisplayTable {
    /// Sorted rows with numeric measure values, original column order.
    pub sorted: DataFrame,
    /// Sorted rows in presentation column order, measure as formatted text.
    pub formatted: DataFrame,
    pub columns: Vec<String>,
    pub warning: Option<String>,
}

impl DisplayTable {
    pub fn height(&self) -> usize {
        self.formatted.height()
    }

    pub fn is_empty(&self) -> bool {
        self.formatted.height() == 0
    }
}

/// Sort, reorder and format aggregated rows.
pub fn format_table(
    rows: &DataFrame,
    sort: Option<&SortSpec>,
    unit: Option<&str>,
    measure: &str,
    precision: Precision,
) -> PolarsResult<DisplayTable> {
    let SortedRows { rows: sorted, warning } = match sort {
        Some(spec) if rows.height() > 0 => sort_rows(rows, spec)?,
        _ => SortedRows {
            rows: rows.clone(),
            warning: None,
        },
    };
    let names: Vec<String> = sorted
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let columns = display_column_order(&names, unit, measure);
    let ordered = sorted.select(columns.clone())?;
    let formatted = if has_column(&ordered, measure) {
        format_measure(&ordered, measure, precision)?
    } else {
        ordered
    };
    Ok(DisplayTable {
        sorted,
        formatted,
        columns,
        warning,
    })
}
