//! Shape sorted summary rows into (label, value) bars for charting.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::blank::cell_labels;
use crate::display::SortSpec;
use crate::error::{EngineError, EngineResult};

/// Separator between key values in a bar label.
pub const LABEL_SEPARATOR: &str = " / ";
/// Bar label used when the rows have no key columns.
pub const TOTAL_LABEL: &str = "Total";

/// How many bars to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartRowCount {
    Limit(usize),
    All,
}

impl ChartRowCount {
    /// Choices offered to the user, in display order.
    pub const MENU: [Self; 5] = [
        Self::Limit(10),
        Self::Limit(20),
        Self::Limit(50),
        Self::Limit(100),
        Self::All,
    ];

    /// Number of rows to keep out of `available`.
    pub fn take(self, available: usize) -> usize {
        match self {
            Self::Limit(n) => n.min(available),
            Self::All => available,
        }
    }

    /// `None` maps to [`ChartRowCount::All`], as in the config file.
    pub fn from_option(limit: Option<usize>) -> Self {
        limit.map_or(Self::All, Self::Limit)
    }

    pub fn as_option(self) -> Option<usize> {
        match self {
            Self::Limit(n) => Some(n),
            Self::All => None,
        }
    }
}

impl Default for ChartRowCount {
    fn default() -> Self {
        Self::Limit(20)
    }
}

impl FromStr for ChartRowCount {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match trimmed.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Self::Limit(n)),
            _ => Err(EngineError::InvalidRowCount(s.to_string())),
        }
    }
}

impl fmt::Display for ChartRowCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit(n) => write!(f, "{}", n),
            Self::All => write!(f, "all"),
        }
    }
}

/// Bar direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartOrientation {
    /// Bars drawn left to right, first point at the bottom.
    #[default]
    Horizontal,
    Vertical,
}

impl ChartOrientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

impl From<effortview_cli::ChartType> for ChartOrientation {
    fn from(value: effortview_cli::ChartType) -> Self {
        match value {
            effortview_cli::ChartType::Horizontal => Self::Horizontal,
            effortview_cli::ChartType::Vertical => Self::Vertical,
        }
    }
}

/// Bars ready to draw, in drawing order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartProjection {
    pub title: String,
    pub value_label: String,
    pub orientation: ChartOrientation,
    pub points: Vec<(String, f64)>,
}

impl ChartProjection {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Describe which rows were kept: top/bottom only makes sense when ranked by the measure.
fn title_prefix(shown: usize, truncated: bool, sort: Option<&SortSpec>, measure: &str) -> String {
    if !truncated {
        return "All".to_string();
    }
    match sort {
        Some(spec) if spec.column == measure => {
            if spec.direction.is_ascending() {
                format!("Bottom {}", shown)
            } else {
                format!("Top {}", shown)
            }
        }
        _ => format!("First {} by current sort", shown),
    }
}

/// Build chart bars from `sorted` rows without re-sorting them.
///
/// Each row becomes one bar labelled by its key values joined with
/// [`LABEL_SEPARATOR`] ([`TOTAL_LABEL`] when `key_columns` is empty), valued by
/// the measure. Missing measure values count as zero.
pub fn project(
    sorted: &DataFrame,
    key_columns: &[String],
    measure: &str,
    sort: Option<&SortSpec>,
    count: ChartRowCount,
    orientation: ChartOrientation,
) -> EngineResult<ChartProjection> {
    let shown = count.take(sorted.height());
    let rows = sorted.head(Some(shown));

    let values = rows
        .column(measure)
        .map_err(|_| EngineError::MissingMeasure {
            column: measure.to_string(),
        })?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let values: Vec<f64> = values
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();

    let key_labels = key_columns
        .iter()
        .map(|c| rows.column(c).map(|col| cell_labels(col).0))
        .collect::<PolarsResult<Vec<_>>>()?;
    let labels: Vec<String> = (0..rows.height())
        .map(|i| {
            if key_labels.is_empty() {
                return TOTAL_LABEL.to_string();
            }
            key_labels
                .iter()
                .map(|col| col[i].clone().unwrap_or_default())
                .collect::<Vec<_>>()
                .join(LABEL_SEPARATOR)
        })
        .collect();

    let mut points: Vec<(String, f64)> = labels.into_iter().zip(values).collect();
    if orientation == ChartOrientation::Horizontal {
        points.reverse();
    }

    let mut title = format!(
        "{} {}",
        title_prefix(shown, shown < sorted.height(), sort, measure),
        measure
    );
    if !key_columns.is_empty() {
        title.push_str(&format!(" ({})", key_columns.join(LABEL_SEPARATOR)));
    }

    Ok(ChartProjection {
        title,
        value_label: measure.to_string(),
        orientation,
        points,
    })
}
