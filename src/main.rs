use clap::{CommandFactory, Parser};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use effortview::chart_export::write_bar_chart_png;
use effortview::engine::ChartRequest;
use effortview::error_display::user_message_from_report;
use effortview::export::{write_csv_file, DEFAULT_EXPORT_FILE_NAME};
use effortview::logging::init_logging;
use effortview::summary::render_report;
use effortview::{
    is_bare_invocation, AnalysisReport, AnalysisRequest, AppConfig, Args, ChartRowCount,
    ConfigManager, Engine, FilterSelection, Precision, SortDirection, SourceCache, APP_NAME,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Combine command-line choices with configured defaults into one request.
fn build_request(args: &Args, config: &AppConfig) -> Result<AnalysisRequest> {
    let precision = match args.decimal {
        Some(places) => Precision::new(places)?,
        None => config.precision()?,
    };
    let sort_direction = if args.ascending {
        SortDirection::Ascending
    } else {
        config.sort_direction()
    };
    let chart = match &args.chart {
        Some(_) => {
            let rows = match &args.chart_rows {
                Some(s) => s.parse::<ChartRowCount>()?,
                None => config.chart_rows()?,
            };
            let orientation = args
                .chart_type
                .map(Into::into)
                .unwrap_or(config.chart.orientation);
            Some(ChartRequest { rows, orientation })
        }
        None => None,
    };
    Ok(AnalysisRequest {
        selection: FilterSelection::from_args(&args.filter)?,
        sort_column: args.sort.clone(),
        sort_direction,
        precision,
        chart,
    })
}

/// A directory export target gets the default file name.
fn export_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(DEFAULT_EXPORT_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}

/// Write the optional outputs. Each failure is reported on its own and does not
/// stop the others; returns false if any failed.
fn write_outputs(args: &Args, config: &AppConfig, report: &AnalysisReport) -> bool {
    let mut ok = true;

    if let Some(path) = &args.export {
        let path = export_path(path);
        let result = config
            .export_options()
            .and_then(|opts| write_csv_file(&report.table.formatted, &path, &opts).map_err(Into::into));
        match result {
            Ok(()) => println!("Exported summary to {}", path.display()),
            Err(e) => {
                eprintln!("Error: export failed: {}", user_message_from_report(&e));
                ok = false;
            }
        }
    }

    if let Some(path) = &args.chart {
        let result = match &report.chart {
            Some(projection) => write_bar_chart_png(path, projection, config.chart_size()),
            None => Err(eyre!("No data to chart")),
        };
        match result {
            Ok(()) => println!("Wrote chart to {}", path.display()),
            Err(e) => {
                eprintln!("Error: chart failed: {}", user_message_from_report(&e));
                ok = false;
            }
        }
    }

    ok
}

fn run(args: &Args) -> Result<bool> {
    if args.generate_config {
        let manager = ConfigManager::new(APP_NAME)?;
        let path = manager.write_default_config(args.force)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(true);
    }

    let path = args
        .file
        .as_deref()
        .ok_or_else(|| eyre!("No input file given. Use --file PATH."))?;
    let config = AppConfig::load(APP_NAME, args.config.as_deref())?;
    let request = build_request(args, &config)?;

    println!("Analyzing '{}'...", path.display());
    let mut cache = SourceCache::new();
    let table = cache.load_file(path, args.format)?;
    let engine = Engine::new(config.columns.clone());
    let report = engine.analyze(&table, &request)?;
    info!(groups = report.table.height(), "analysis complete");

    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }
    if report.filter_count > 0 {
        println!(
            "Filters applied: {} ({} of {} rows match)",
            report.filter_count,
            report.filtered_rows,
            table.height()
        );
    }
    let limit = args.top.unwrap_or(config.display.summary_rows);
    print!(
        "{}",
        render_report(&report, &engine.schema().measure_column, request.precision, limit)
    );

    Ok(write_outputs(args, &config, &report))
}

fn main() -> Result<()> {
    if is_bare_invocation(std::env::args_os()) {
        Args::command().print_help()?;
        println!();
        return Ok(());
    }
    let args = Args::parse();

    color_eyre::install()?;
    init_logging(args.verbose);

    match run(&args) {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", user_message_from_report(&e));
            std::process::exit(1);
        }
    }
}
