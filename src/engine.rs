//! One recomputation pass: filter, derive the key, aggregate, sort, format and
//! project a chart, all from an immutable request against a loaded table.

use polars::prelude::DataFrame;
use tracing::{debug, warn};

use crate::aggregate::{require_measure, summarize, total_measure, Aggregation};
use crate::chart_data::{project, ChartOrientation, ChartProjection, ChartRowCount};
use crate::display::{format_table, DisplayTable, Precision, SortDirection, SortSpec};
use crate::error::EngineResult;
use crate::filter::{apply_filters, ColumnOptions, FilterSelection};
use crate::grouping::{derive_group_key, GroupKey};
use crate::schema::ColumnSchema;

/// Everything the user has chosen for one pass.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub selection: FilterSelection,
    /// Sort column; `None` sorts by the measure.
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
    pub precision: Precision,
    /// `None` skips the chart projection.
    pub chart: Option<ChartRequest>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartRequest {
    pub rows: ChartRowCount,
    pub orientation: ChartOrientation,
}

impl AnalysisRequest {
    pub fn new(selection: FilterSelection) -> Self {
        Self {
            selection,
            chart: Some(ChartRequest::default()),
            ..Self::default()
        }
    }
}

/// What one pass produced.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Option lists in evaluation order, the unit column last.
    pub options: Vec<ColumnOptions>,
    pub filtered_rows: usize,
    /// Measure total over the filtered rows.
    pub total: f64,
    /// Number of constrained columns, the unit column included.
    pub filter_count: usize,
    pub key: GroupKey,
    pub aggregation: Aggregation,
    /// Columns the summary can be sorted by.
    pub sort_options: Vec<String>,
    pub sort: Option<SortSpec>,
    pub table: DisplayTable,
    pub chart: Option<ChartProjection>,
    pub warnings: Vec<String>,
}

impl AnalysisReport {
    pub fn is_empty(&self) -> bool {
        self.filtered_rows == 0
    }
}

/// Stateless pipeline over a [`ColumnSchema`].
#[derive(Debug, Clone, Default)]
pub struct Engine {
    schema: ColumnSchema,
}

impl Engine {
    pub fn new(schema: ColumnSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Run a full pass. Fails only when the measure column is missing or polars
    /// errors; an empty filter result is reported, not raised.
    pub fn analyze(&self, table: &DataFrame, request: &AnalysisRequest) -> EngineResult<AnalysisReport> {
        let measure = self.schema.measure_column.as_str();
        require_measure(table, measure)?;

        let outcome = apply_filters(table, &self.schema, &request.selection)?;
        let filter_count = outcome.filter_count();
        let filtered_rows = outcome.frame.height();
        let total = total_measure(&outcome.frame, measure)?;

        let available = self.schema.available_categories(table);
        let key = derive_group_key(&available, &outcome.applied, self.schema.unit_in(table));
        debug!(rows = filtered_rows, filters = filter_count, key = ?key.columns(), "filters applied");

        let aggregation = summarize(&outcome.frame, &key, &self.schema)?;
        let rows = aggregation.rows();
        let sort_options: Vec<String> = rows
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        let sort = match &request.sort_column {
            Some(column) => Some(SortSpec::new(column.clone(), request.sort_direction)),
            None => SortSpec::default_for(rows, measure, request.sort_direction),
        };

        let mut warnings = Vec::new();
        let display = format_table(
            rows,
            sort.as_ref(),
            self.schema.unit_in(table),
            measure,
            request.precision,
        )?;
        warnings.extend(display.warning.clone());

        let chart = match request.chart {
            Some(chart) if filtered_rows > 0 && aggregation.is_grouped() => {
                let effective_sort = sort.as_ref().filter(|_| display.warning.is_none());
                match project(
                    &display.sorted,
                    aggregation.key_columns(),
                    measure,
                    effective_sort,
                    chart.rows,
                    chart.orientation,
                ) {
                    Ok(projection) => Some(projection),
                    Err(e) => {
                        warn!(error = %e, "chart projection failed");
                        warnings.push(format!("chart unavailable: {}", e));
                        None
                    }
                }
            }
            _ => None,
        };

        Ok(AnalysisReport {
            options: outcome.options,
            filtered_rows,
            total,
            filter_count,
            key,
            aggregation,
            sort_options,
            sort,
            table: display,
            chart,
            warnings,
        })
    }
}
