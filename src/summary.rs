//! Plain-text rendering of an analysis for the command line.

use polars::prelude::DataFrame;
use unicode_width::UnicodeWidthStr;

use crate::blank::cell_labels;
use crate::display::Precision;
use crate::engine::AnalysisReport;

/// Rows printed when the user does not ask for a different count.
pub const DEFAULT_SUMMARY_ROWS: usize = 10;

const RULE_WIDTH: usize = 80;

/// Render the first `limit` rows of `df` as an aligned text table with a header.
/// Columns named in `right_aligned` are padded on the left.
pub fn render_fixed_width(df: &DataFrame, limit: usize, right_aligned: &[&str]) -> String {
    let rows = df.head(Some(limit));
    let mut columns: Vec<(String, Vec<String>, bool)> = Vec::with_capacity(rows.width());
    for column in rows.get_columns() {
        let name = column.name().to_string();
        let (labels, _) = cell_labels(column);
        let cells = labels.into_iter().map(Option::unwrap_or_default).collect();
        let right = right_aligned.contains(&name.as_str());
        columns.push((name, cells, right));
    }
    let widths: Vec<usize> = columns
        .iter()
        .map(|(name, cells, _)| {
            cells
                .iter()
                .map(|c| c.width())
                .chain(std::iter::once(name.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let line = |out: &mut String, cells: Vec<&str>| {
        let parts: Vec<String> = cells
            .iter()
            .zip(&columns)
            .zip(&widths)
            .map(|((cell, (_, _, right)), width)| pad(cell, *width, *right))
            .collect();
        out.push_str(parts.join("  ").trim_end());
        out.push('\n');
    };
    line(&mut out, columns.iter().map(|(name, _, _)| name.as_str()).collect());
    for i in 0..rows.height() {
        line(&mut out, columns.iter().map(|(_, cells, _)| cells[i].as_str()).collect());
    }
    out
}

fn pad(cell: &str, width: usize, right: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(cell.width()));
    if right {
        format!("{}{}", fill, cell)
    } else {
        format!("{}{}", cell, fill)
    }
}

/// The command-line report: top rows, grand total and row count.
pub fn render_report(report: &AnalysisReport, measure: &str, precision: Precision, limit: usize) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let shown = limit.min(report.table.height());
    let body = if report.table.is_empty() {
        "(no matching rows)\n".to_string()
    } else {
        render_fixed_width(&report.table.formatted, limit, &[measure])
    };
    format!(
        "Summary (top {} of {} groups):\n{rule}\n{body}{rule}\nTotal effort: {} h\nRows: {}\n",
        shown,
        report.table.height(),
        precision.format(report.total),
        report.filtered_rows,
    )
}
