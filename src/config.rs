use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::chart_data::{ChartOrientation, ChartRowCount};
use crate::chart_export::DEFAULT_CHART_SIZE;
use crate::display::{Precision, SortDirection};
use crate::export::ExportOptions;
use crate::schema::ColumnSchema;
use crate::summary::DEFAULT_SUMMARY_ROWS;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path(CONFIG_FILE_NAME);

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Read the user config file; defaults when it does not exist.
    pub fn load_user_config(&self) -> Result<AppConfig> {
        let config_path = self.config_path(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(AppConfig::default());
        }
        AppConfig::load_from(&config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub columns: ColumnSchema,
    pub display: DisplayConfig,
    pub chart: ChartConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub decimal_places: i64,
    pub sort_ascending: bool,
    pub summary_rows: usize,
}

/// Chart row count as written in the file: a number or `"all"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowCountSetting {
    Count(usize),
    Keyword(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub row_count: RowCountSetting,
    pub orientation: ChartOrientation,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub include_bom: bool,
    pub delimiter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            columns: ColumnSchema::default(),
            display: DisplayConfig::default(),
            chart: ChartConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            decimal_places: 2,
            sort_ascending: false,
            summary_rows: DEFAULT_SUMMARY_ROWS,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            row_count: RowCountSetting::Count(20),
            orientation: ChartOrientation::default(),
            width: DEFAULT_CHART_SIZE.0,
            height: DEFAULT_CHART_SIZE.1,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_bom: true,
            delimiter: ",".to_string(),
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user → explicit file)
    pub fn load(app_name: &str, explicit: Option<&Path>) -> Result<Self> {
        let mut config = AppConfig::default();

        match ConfigManager::new(app_name).and_then(|m| m.load_user_config()) {
            Ok(user_config) => config.merge(user_config),
            Err(e) => warn!(error = %e, "ignoring user config"),
        }

        if let Some(path) = explicit {
            config.merge(Self::load_from(path)?);
            debug!(path = %path.display(), "config file merged");
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a single config file without layering.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read config file at {}: {}", path.display(), e))?;

        toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse config file at {}: {}", path.display(), e))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        merge_columns(&mut self.columns, other.columns);
        self.display.merge(other.display);
        self.chart.merge(other.chart);
        self.export.merge(other.export);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        let columns = &self.columns;
        if columns.measure_column.trim().is_empty() {
            return Err(eyre!("measure_column must not be empty"));
        }
        if columns.blank_label.is_empty() {
            return Err(eyre!("blank_label must not be empty"));
        }
        if columns.category_columns.iter().any(|c| c.trim().is_empty()) {
            return Err(eyre!("category_columns must not contain empty names"));
        }
        if columns.category_columns.contains(&columns.unit_column) {
            return Err(eyre!(
                "unit_column '{}' must not also be a category column",
                columns.unit_column
            ));
        }
        if columns.category_columns.contains(&columns.measure_column) {
            return Err(eyre!(
                "measure_column '{}' must not also be a category column",
                columns.measure_column
            ));
        }

        self.precision()?;
        self.chart_rows()?;
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(eyre!("chart width and height must be greater than 0"));
        }
        if self.display.summary_rows == 0 {
            return Err(eyre!("summary_rows must be greater than 0"));
        }
        self.export_options()?;

        Ok(())
    }

    pub fn precision(&self) -> Result<Precision> {
        Ok(Precision::new(self.display.decimal_places)?)
    }

    pub fn sort_direction(&self) -> SortDirection {
        SortDirection::from_ascending(self.display.sort_ascending)
    }

    pub fn chart_rows(&self) -> Result<ChartRowCount> {
        match &self.chart.row_count {
            RowCountSetting::Count(0) => Err(eyre!("chart row_count must be greater than 0")),
            RowCountSetting::Count(n) => Ok(ChartRowCount::Limit(*n)),
            RowCountSetting::Keyword(s) => Ok(s.parse()?),
        }
    }

    pub fn chart_size(&self) -> (u32, u32) {
        (self.chart.width, self.chart.height)
    }

    pub fn export_options(&self) -> Result<ExportOptions> {
        let delimiter = match self.export.delimiter.as_bytes() {
            [b] if b.is_ascii() && *b != b'"' && *b != b'\n' => *b,
            _ => {
                return Err(eyre!(
                    "export delimiter must be a single ASCII character, got {:?}",
                    self.export.delimiter
                ))
            }
        };
        Ok(ExportOptions {
            include_bom: self.export.include_bom,
            delimiter,
        })
    }
}

// Merge implementations for each config section
fn merge_columns(this: &mut ColumnSchema, other: ColumnSchema) {
    let default = ColumnSchema::default();
    if other.category_columns != default.category_columns {
        this.category_columns = other.category_columns;
    }
    if other.unit_column != default.unit_column {
        this.unit_column = other.unit_column;
    }
    if other.measure_column != default.measure_column {
        this.measure_column = other.measure_column;
    }
    if other.blank_label != default.blank_label {
        this.blank_label = other.blank_label;
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.decimal_places != default.decimal_places {
            self.decimal_places = other.decimal_places;
        }
        if other.sort_ascending != default.sort_ascending {
            self.sort_ascending = other.sort_ascending;
        }
        if other.summary_rows != default.summary_rows {
            self.summary_rows = other.summary_rows;
        }
    }
}

impl ChartConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ChartConfig::default();
        if other.row_count != default.row_count {
            self.row_count = other.row_count;
        }
        if other.orientation != default.orientation {
            self.orientation = other.orientation;
        }
        if other.width != default.width {
            self.width = other.width;
        }
        if other.height != default.height {
            self.height = other.height;
        }
    }
}

impl ExportConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ExportConfig::default();
        if other.include_bom != default.include_bom {
            self.include_bom = other.include_bom;
        }
        if other.delimiter != default.delimiter {
            self.delimiter = other.delimiter;
        }
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
