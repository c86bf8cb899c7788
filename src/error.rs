//! Error taxonomy for the analysis pipeline.
//!
//! Only fatal conditions live here. Absent category/unit columns, empty filter
//! results and sort fallbacks are not errors; they are reported through the
//! normal return values.

use polars::prelude::PolarsError;
use std::io;
use std::path::PathBuf;

/// Result alias for library operations that can fail with [`EngineError`].
pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The table source could not be loaded or parsed. No partial table is used.
    #[error("could not load {}: {message}", path.display())]
    Source { path: PathBuf, message: String },

    /// The measure column is missing, so nothing can be aggregated.
    #[error("column '{column}' not found in data; cannot aggregate")]
    MissingMeasure { column: String },

    /// Display precision outside the supported 0-4 range.
    #[error("decimal places must be between 0 and 4, got '{0}'")]
    InvalidPrecision(String),

    /// A filter argument that is not of the form COLUMN=VALUE[,VALUE...].
    #[error("invalid filter '{0}': expected COLUMN=VALUE[,VALUE...]")]
    InvalidFilter(String),

    /// Chart row count that is neither a positive integer nor "all".
    #[error("invalid chart row count '{0}': expected a positive number or \"all\"")]
    InvalidRowCount(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl EngineError {
    pub(crate) fn load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Source {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Source and schema errors end the current pass; everything else is an
    /// internal or I/O failure.
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::Source { .. } | Self::MissingMeasure { .. })
    }
}
