use effortview::chart_data::{ChartOrientation, ChartRowCount};
use effortview::config::{AppConfig, ConfigManager, RowCountSetting};
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");

    assert_eq!(config.columns.category_columns.len(), 8);
    assert_eq!(config.columns.unit_column, "UNIT");
    assert_eq!(config.columns.measure_column, "作業時間(h)");
    assert_eq!(config.columns.blank_label, "[空白]");

    assert_eq!(config.display.decimal_places, 2);
    assert!(!config.display.sort_ascending);
    assert_eq!(config.display.summary_rows, 10);

    assert_eq!(config.chart_rows().unwrap(), ChartRowCount::Limit(20));
    assert_eq!(config.chart.orientation, ChartOrientation::Horizontal);

    assert!(config.export.include_bom);
    assert_eq!(config.export.delimiter, ",");
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[columns]"));
    assert!(template.contains("[display]"));
    assert!(template.contains("[chart]"));
    assert!(template.contains("[export]"));
    assert!(template.contains("version = \"0.1\""));
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");

    assert!(config_path.exists());
    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[display]"));
}

#[test]
fn test_write_config_without_force_fails_if_exists() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    config_manager
        .write_default_config(false)
        .expect("First write should succeed");

    let result = config_manager.write_default_config(false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("already exists"));
}

#[test]
fn test_write_config_with_force_overwrites() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let first_path = config_manager
        .write_default_config(false)
        .expect("First write should succeed");
    let second_path = config_manager
        .write_default_config(true)
        .expect("Second write with force should succeed");

    assert_eq!(first_path, second_path);
}

#[test]
fn test_user_config_missing_gives_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = config_manager.load_user_config().expect("Should load default config");
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_load_and_parse_minimal_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager
        .ensure_config_dir()
        .expect("Failed to create config dir");
    let config_path = config_manager.config_path("config.toml");

    let minimal_config = r#"
version = "0.1"

[columns]
measure_column = "hours"

[chart]
row_count = "all"
orientation = "vertical"
"#;
    fs::write(&config_path, minimal_config).expect("Failed to write minimal config");

    let config = config_manager.load_user_config().expect("Failed to parse config");
    assert_eq!(config.columns.measure_column, "hours");
    assert_eq!(config.chart_rows().unwrap(), ChartRowCount::All);
    assert_eq!(config.chart.orientation, ChartOrientation::Vertical);

    // unspecified values keep their defaults
    assert_eq!(config.columns.unit_column, "UNIT");
    assert_eq!(config.display.decimal_places, 2);
}

#[test]
fn test_explicit_config_file_is_layered_last() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("project.toml");
    fs::write(&path, "[display]\ndecimal_places = 4\nsort_ascending = true\n").unwrap();

    let app_name = format!("effortview_test_{}", std::process::id());
    let config = AppConfig::load(&app_name, Some(&path)).expect("Should load config");
    assert_eq!(config.precision().unwrap().places(), 4);
    assert!(config.display.sort_ascending);
}

#[test]
fn test_unparseable_explicit_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "[display\n").unwrap();
    let err = AppConfig::load("effortview_test_broken", Some(&path)).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"));
}

#[test]
fn test_merge_configs() {
    let mut base = AppConfig::default();
    let mut override_config = AppConfig::default();

    override_config.display.decimal_places = 0;
    override_config.chart.row_count = RowCountSetting::Count(50);
    override_config.export.include_bom = false;

    base.merge(override_config);

    assert_eq!(base.display.decimal_places, 0);
    assert_eq!(base.chart_rows().unwrap(), ChartRowCount::Limit(50));
    assert!(!base.export.include_bom);
    assert_eq!(base.display.summary_rows, 10);
}

#[test]
fn test_validate_config_valid() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = AppConfig::default();
    config.version = "1.0".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.display.decimal_places = 5;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.columns.unit_column = "USER_FIELD_01".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.chart.row_count = RowCountSetting::Keyword("many".to_string());
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.chart.width = 0;
    assert!(config.validate().is_err());
}
