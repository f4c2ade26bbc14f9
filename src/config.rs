use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sync::DEFAULT_CONCURRENCY;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the SQLite document database
    pub database_path: ConfigValue<PathBuf>,
    /// Port the HTTP server listens on
    pub port: ConfigValue<u16>,
    /// Snapshot synchronized when `sync` is run without a path
    pub snapshot_path: Option<ConfigValue<PathBuf>>,
    /// Upserts in flight per kind during a bulk sync
    pub sync_concurrency: ConfigValue<usize>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    port: Option<u16>,
    snapshot_path: Option<PathBuf>,
    sync_concurrency: Option<usize>,
}

pub const DEFAULT_PORT: u16 = 8080;

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut database_path = ConfigValue::new(
            Self::default_data_dir().join("foodstore.db"),
            ConfigSource::Default,
        );
        let mut port = ConfigValue::new(DEFAULT_PORT, ConfigSource::Default);
        let mut snapshot_path = None;
        let mut sync_concurrency = ConfigValue::new(DEFAULT_CONCURRENCY, ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            if let Some(db_path) = file_config.database_path {
                database_path = ConfigValue::new(resolve(&path, db_path), ConfigSource::File);
            }
            if let Some(p) = file_config.port {
                port = ConfigValue::new(p, ConfigSource::File);
            }
            if let Some(snapshot) = file_config.snapshot_path {
                snapshot_path = Some(ConfigValue::new(
                    resolve(&path, snapshot),
                    ConfigSource::File,
                ));
            }
            if let Some(n) = file_config.sync_concurrency {
                sync_concurrency = ConfigValue::new(n, ConfigSource::File);
            }

            config_file = Some(path);
        }

        // Apply environment variable overrides
        if let Ok(db_path) = std::env::var("FOODSTORE_DATABASE_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Ok(value) = std::env::var("FOODSTORE_PORT") {
            let p = value
                .parse()
                .map_err(|_| ConfigError::InvalidValue("FOODSTORE_PORT", value))?;
            port = ConfigValue::new(p, ConfigSource::Environment);
        }
        if let Ok(snapshot) = std::env::var("FOODSTORE_SNAPSHOT") {
            snapshot_path = Some(ConfigValue::new(
                PathBuf::from(snapshot),
                ConfigSource::Environment,
            ));
        }
        if let Ok(value) = std::env::var("FOODSTORE_SYNC_CONCURRENCY") {
            let n = value
                .parse()
                .map_err(|_| ConfigError::InvalidValue("FOODSTORE_SYNC_CONCURRENCY", value))?;
            sync_concurrency = ConfigValue::new(n, ConfigSource::Environment);
        }

        Ok(Self {
            database_path,
            port,
            snapshot_path,
            sync_concurrency,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/foodstore/
    /// - macOS: ~/Library/Application Support/foodstore/
    /// - Windows: %APPDATA%/foodstore/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("foodstore")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/foodstore/
    /// - macOS: ~/Library/Application Support/foodstore/
    /// - Windows: %APPDATA%/foodstore/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("foodstore")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

/// Relative paths in a config file are relative to the file itself.
fn resolve(config_path: &Path, value: PathBuf) -> PathBuf {
    if value.is_relative() {
        config_path
            .parent()
            .map(|dir| dir.join(&value))
            .unwrap_or(value)
    } else {
        value
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(var, value) => {
                write!(f, "Invalid value '{}' for {}", value, var)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_no_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config
            .database_path
            .value
            .to_string_lossy()
            .ends_with("foodstore.db"));
        assert_eq!(config.sync_concurrency.value, DEFAULT_CONCURRENCY);
        assert_eq!(config.sync_concurrency.source, ConfigSource::Default);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: /custom/path/store.db").unwrap();
        writeln!(file, "sync_concurrency: 4").unwrap();
        writeln!(file, "snapshot_path: seed/data.json").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(
            config.database_path.value,
            PathBuf::from("/custom/path/store.db")
        );
        assert_eq!(config.database_path.source, ConfigSource::File);
        assert_eq!(config.sync_concurrency.value, 4);
        let snapshot = config.snapshot_path.unwrap();
        assert_eq!(snapshot.value, temp_dir.path().join("seed/data.json"));
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_resolve_keeps_absolute_paths() {
        let config_path = Path::new("/etc/foodstore/config.yaml");
        assert_eq!(
            resolve(config_path, PathBuf::from("/var/db.sqlite")),
            PathBuf::from("/var/db.sqlite")
        );
        assert_eq!(
            resolve(config_path, PathBuf::from("db.sqlite")),
            PathBuf::from("/etc/foodstore/db.sqlite")
        );
    }
}
