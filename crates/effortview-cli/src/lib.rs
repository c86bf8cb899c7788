//! Shared CLI definitions for effortview.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// File format of a table source.
/// When `--format` is not specified, format is auto-detected from the file extension.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Excel workbook (.xls, .xlsx, .xlsm, .xlsb); every worksheet is read
    Excel,
    /// Comma-separated values
    Csv,
}

impl FileFormat {
    /// Detect file format from path extension. Returns None when extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse format from extension string (e.g. "xlsx", "csv").
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "xls" | "xlsx" | "xlsm" | "xlsb" => Some(Self::Excel),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Bar chart orientation
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum ChartType {
    /// Horizontal bars, highest-ranked item on top
    #[default]
    Horizontal,
    /// Vertical bars, highest-ranked item on the left
    Vertical,
}

/// Command-line arguments for effortview
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "effortview",
    version,
    about = "Effort analysis viewer",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path to the workbook or CSV file to analyze
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Number of decimal places for effort hours (0-4, default: 2)
    #[arg(short = 'd', long = "decimal", value_name = "N", allow_negative_numbers = true)]
    pub decimal: Option<i64>,

    /// Force file format (excel, csv). By default format is detected from the file extension.
    #[arg(long = "format", value_enum)]
    pub format: Option<FileFormat>,

    /// Narrow the table before aggregating. Use once per column: COLUMN=VALUE[,VALUE...].
    /// Use the blank label (default "[空白]") to match missing values. Category columns are applied in priority order, the unit column last.
    #[arg(long = "filter", value_name = "COL=VALUES")]
    pub filter: Vec<String>,

    /// Sort the summary by this column (default: the effort column)
    #[arg(long = "sort", value_name = "COL")]
    pub sort: Option<String>,

    /// Sort ascending instead of descending
    #[arg(long = "ascending", action)]
    pub ascending: bool,

    /// Number of summary rows to print (default: 10)
    #[arg(long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Write the formatted summary table to this path as CSV (UTF-8 with BOM)
    #[arg(long = "export", value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Render a bar chart of the summary to this PNG path
    #[arg(long = "chart", value_name = "PATH")]
    pub chart: Option<PathBuf>,

    /// Bar chart orientation
    #[arg(long = "chart-type", value_enum, requires = "chart")]
    pub chart_type: Option<ChartType>,

    /// Number of bars to draw: 10, 20, 50, 100 or "all" (default: 20)
    #[arg(long = "chart-rows", value_name = "N|all", requires = "chart")]
    pub chart_rows: Option<String>,

    /// Read configuration from this file instead of ~/.config/effortview/config.toml
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Generate default configuration file at ~/.config/effortview/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace). EFFORTVIEW_LOG overrides.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

/// True when the program was started with no arguments at all. Such a run prints
/// usage and succeeds; any other run without `--file` is an error.
pub fn is_bare_invocation<I: IntoIterator>(argv: I) -> bool {
    argv.into_iter().nth(1).is_none()
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
///
/// Used by the gen_docs binary; output is written to stdout.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let mut parts = Vec::new();
        if let Some(s) = arg.get_short() {
            parts.push(format!("-{s}"));
        }
        if let Some(l) = arg.get_long() {
            parts.push(format!("--{l}"));
        }
        let op = parts.join(", ");
        let placeholder: String = if arg.get_action().takes_values() {
            arg.get_value_names()
                .map(|names| {
                    names
                        .iter()
                        .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default()
        } else {
            String::new()
        };
        let option_str = if placeholder.is_empty() {
            op
        } else {
            format!("{op} {placeholder}")
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
