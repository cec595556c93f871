//! Tests for layered configuration loading
//!
//! Note: These tests pass the global config path and environment explicitly,
//! so the user's real config and process environment never leak in.

use std::collections::HashMap;
use std::path::PathBuf;

use tempfile::TempDir;

use famtree::config::{OutputFormat, Settings};

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("famtree.toml");
    std::fs::write(&path, content).expect("write config");
    path
}

fn no_env() -> Option<HashMap<String, String>> {
    Some(HashMap::new())
}

#[test]
fn given_global_config_when_loading_then_overrides_defaults() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        r#"
deceased_marker = "(d.)"
format = "json"
"#,
    );

    // Act
    let settings = Settings::load_with(Some(&path), no_env()).unwrap();

    // Assert
    assert_eq!(settings.deceased_marker, "(d.)");
    assert_eq!(settings.format, OutputFormat::Json);
    assert_eq!(settings.couple_separator, " & ");
    assert_eq!(settings.data_file, None);
}

#[test]
fn given_env_and_global_config_when_loading_then_env_wins() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "couple_separator = \" / \"\n");
    let env: HashMap<String, String> =
        [("FAMTREE_COUPLE_SEPARATOR".to_string(), " ~ ".to_string())].into();

    let settings = Settings::load_with(Some(&path), Some(env)).unwrap();

    assert_eq!(settings.couple_separator, " ~ ");
}

#[test]
fn given_data_file_with_env_var_when_loading_then_expanded() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "data_file = \"$HOME/famtree/families.json\"\n");

    let settings = Settings::load_with(Some(&path), no_env()).unwrap();

    let data_file = settings.data_file.unwrap();
    assert!(!data_file.to_string_lossy().contains("$HOME"));
    assert!(data_file.ends_with("famtree/families.json"));
}

#[test]
fn given_missing_global_config_when_loading_then_defaults() {
    let temp = TempDir::new().unwrap();

    let settings = Settings::load_with(Some(&temp.path().join("absent.toml")), no_env()).unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_invalid_toml_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "format = [not toml");

    let err = Settings::load_with(Some(&path), no_env()).unwrap_err();

    assert!(err.to_string().starts_with("config error"));
}

#[test]
fn given_settings_when_rendering_toml_then_round_trips_through_loader() {
    let temp = TempDir::new().unwrap();
    let settings = Settings {
        deceased_marker: "✝".into(),
        format: OutputFormat::Json,
        ..Settings::default()
    };
    let path = write_config(&temp, &settings.to_toml().unwrap());

    let loaded = Settings::load_with(Some(&path), no_env()).unwrap();

    assert_eq!(loaded, settings);
    assert_eq!(loaded.render_options().deceased_marker, "✝");
}
