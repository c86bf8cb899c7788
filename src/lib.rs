//! Cascading categorical filters and dynamic aggregation over labor-effort tables.
//!
//! A pass runs strictly left to right: load ([`source`]), filter ([`filter`]),
//! derive the group key ([`grouping`]), sum ([`aggregate`]), sort and format
//! ([`display`]), then chart ([`chart_data`]) or export ([`export`]).
//! [`engine::Engine`] runs the whole pass from an immutable request.

pub mod aggregate;
pub mod blank;
pub mod cache;
pub mod chart_data;
pub mod chart_export;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod error_display;
pub mod export;
pub mod filter;
pub mod grouping;
pub mod logging;
pub mod schema;
pub mod source;
pub mod summary;

pub use cache::{SourceCache, SourceKey};
pub use chart_data::{ChartOrientation, ChartProjection, ChartRowCount};
pub use config::{AppConfig, ConfigManager};
pub use display::{Precision, SortDirection, SortSpec};
pub use effortview_cli::{is_bare_invocation, Args, ChartType, FileFormat};
pub use engine::{AnalysisReport, AnalysisRequest, ChartRequest, Engine};
pub use error::{EngineError, EngineResult};
pub use filter::FilterSelection;
pub use schema::ColumnSchema;

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "effortview";
