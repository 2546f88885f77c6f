//! Application settings loading from `lakein.toml`
//!
//! The file is optional: a missing file yields the defaults, a malformed one is a
//! configuration error. Environment variables take precedence over file values.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;

/// Settings file looked up in the working directory.
pub const DEFAULT_SETTINGS_PATH: &str = "lakein.toml";

/// Database used when neither the environment nor the settings file names one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/lakein.sqlite?mode=rwc";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration structure representing the entire settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

/// `[database]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive string
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    /// Replaces file values with the ones given by the environment.
    #[must_use]
    pub fn with_overrides(mut self, database_url: Option<String>) -> Self {
        if let Some(url) = database_url.filter(|u| !u.trim().is_empty()) {
            self.database.url = url;
        }
        self
    }

    /// Applies `DATABASE_URL` from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(std::env::var("DATABASE_URL").ok())
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid or a value has the wrong type
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = match std::fs::read_to_string(path.as_ref()) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => {
            return Err(Error::Config {
                message: format!("Failed to read settings file: {e}"),
            });
        }
    };

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.as_ref().display()),
    })
}

/// Loads settings from the default location with environment overrides applied
pub fn load_default_settings() -> Result<Settings> {
    Ok(load_settings(DEFAULT_SETTINGS_PATH)?.with_env_overrides())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            [database]
            url = "sqlite://planner.db?mode=rwc"

            [logging]
            filter = "lakein=debug,sea_orm=warn"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.database.url, "sqlite://planner.db?mode=rwc");
        assert_eq!(settings.logging.filter, "lakein=debug,sea_orm=warn");
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings: Settings = toml::from_str("[logging]\nfilter = \"warn\"\n").unwrap();
        assert_eq!(settings.database.url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.logging.filter, "warn");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = load_settings("does/not/exist/lakein.toml").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let path = std::env::temp_dir().join(format!("lakein-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[database]\nurl = 42\n").unwrap();
        let result = load_settings(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_environment_overrides_file() {
        let settings = Settings::default().with_overrides(Some("sqlite::memory:".to_string()));
        assert_eq!(settings.database.url, "sqlite::memory:");

        let settings = Settings::default().with_overrides(Some("  ".to_string()));
        assert_eq!(settings.database.url, DEFAULT_DATABASE_URL);
        let settings = Settings::default().with_overrides(None);
        assert_eq!(settings.database.url, DEFAULT_DATABASE_URL);
    }
}
