//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/famtree/famtree.toml`
//! 3. Environment variables: `FAMTREE_*` prefix
//!
//! A `--file` given on the command line overrides `data_file` afterwards.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DEFAULT_COUPLE_SEPARATOR;
use crate::render::{RenderOptions, DEFAULT_DECEASED_MARKER};

const ENV_PREFIX: &str = "FAMTREE";

/// How trees and listings are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Snapshot read when no `--file` is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    /// Appended to deceased members' names
    pub deceased_marker: String,
    /// Between the two names of a couple
    pub couple_separator: String,
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: None,
            deceased_marker: DEFAULT_DECEASED_MARKER.to_string(),
            couple_separator: DEFAULT_COUPLE_SEPARATOR.to_string(),
            format: OutputFormat::default(),
        }
    }
}

/// Settings as written in a config file; absent keys keep the lower layer.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_file: Option<PathBuf>,
    pub deceased_marker: Option<String>,
    pub couple_separator: Option<String>,
    pub format: Option<OutputFormat>,
}

/// Get the global config directory path.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "famtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("famtree.toml"))
}

fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {e}", path.display()),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {e}", path.display()),
    })
}

impl Settings {
    /// Load settings from defaults, the global config file and `FAMTREE_*` variables.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_with(global_config_path().as_deref(), None)
    }

    /// Load with an explicit global config path and environment.
    ///
    /// `env` replaces the process environment when given.
    pub fn load_with(
        global_path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = global_path {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.apply(&raw);
            }
        }

        current = Self::apply_env_overrides(current, env)?;
        current.expand_paths();
        Ok(current)
    }

    fn apply(&self, raw: &RawSettings) -> Self {
        Self {
            data_file: raw.data_file.clone().or_else(|| self.data_file.clone()),
            deceased_marker: raw
                .deceased_marker
                .clone()
                .unwrap_or_else(|| self.deceased_marker.clone()),
            couple_separator: raw
                .couple_separator
                .clone()
                .unwrap_or_else(|| self.couple_separator.clone()),
            format: raw.format.unwrap_or(self.format),
        }
    }

    /// Apply FAMTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_file") {
            settings.data_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("deceased_marker") {
            settings.deceased_marker = val;
        }
        if let Ok(val) = config.get_string("couple_separator") {
            settings.couple_separator = val;
        }
        if let Ok(val) = config.get_string("format") {
            settings.format =
                OutputFormat::from_str(&val, true).map_err(|e| ApplicationError::Config {
                    message: format!("{ENV_PREFIX}_FORMAT: {e}"),
                })?;
        }
        Ok(settings)
    }

    /// Expand `~` and `$VAR` in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(path) = &self.data_file {
            let raw = path.to_string_lossy();
            if let Ok(expanded) = shellexpand::full(raw.as_ref()) {
                self.data_file = Some(PathBuf::from(expanded.as_ref()));
            }
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            deceased_marker: self.deceased_marker.clone(),
            couple_separator: self.couple_separator.clone(),
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_with(None, env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.deceased_marker, "†");
        assert_eq!(settings.format, OutputFormat::Text);
    }

    #[test]
    fn given_env_overrides_when_loading_then_they_replace_defaults() {
        let settings = Settings::load_with(
            None,
            env(&[
                ("FAMTREE_COUPLE_SEPARATOR", " + "),
                ("FAMTREE_FORMAT", "JSON"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.couple_separator, " + ");
        assert_eq!(settings.format, OutputFormat::Json);
    }

    #[test]
    fn given_single_underscore_data_file_var_when_loading_then_data_file_set() {
        let settings =
            Settings::load_with(None, env(&[("FAMTREE_DATA_FILE", "/srv/families.json")]))
                .unwrap();
        assert_eq!(settings.data_file, Some(PathBuf::from("/srv/families.json")));
    }

    #[test]
    fn given_unknown_format_in_env_when_loading_then_config_error() {
        let err = Settings::load_with(None, env(&[("FAMTREE_FORMAT", "yaml")])).unwrap_err();
        assert!(matches!(err, ApplicationError::Config { .. }));
    }

    #[test]
    fn given_tilde_in_data_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_file: Some(PathBuf::from("~/families.json")),
            ..Settings::default()
        };
        settings.expand_paths();
        let expanded = settings.data_file.unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("families.json"));
    }
}
