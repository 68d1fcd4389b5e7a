use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How long a write waits on a locked database before failing (5 seconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Log level used when neither the config file nor RUST_LOG set one
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub log: LogConfig,
}

/// Database-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DatabaseConfig {
    /// Overrides the default database location
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. "info" or "oss_manager=debug"
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Database path from the config, or the default location
    pub fn db_path(&self) -> PathBuf {
        self.database.path.clone().unwrap_or_else(db_path)
    }
}

/// Returns the path to the data directory for oss-manager.
/// Uses $XDG_DATA_HOME/oss-manager if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/oss-manager,
/// or ./oss-manager if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the database file.
pub fn db_path() -> PathBuf {
    data_dir().join("registry.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("oss-manager.log")
}

/// Returns the path to the optional config file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("oss-manager")
}
