//! Daemon configuration.
//!
//! Read once at startup from `config.toml` in the data directory. Every
//! field has a default, so a missing file (or a file with only some
//! sections) still yields a working configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// RPC service settings.
    #[serde(default)]
    pub service: ServiceConfig,
}

/// Where the database lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory root; when empty the platform default is used.
    #[serde(default)]
    pub data_dir: String,
    /// Database filename, resolved relative to the data directory.
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

fn default_database_file() -> String {
    "merit.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            database_file: default_database_file(),
        }
    }
}

/// How the RPC endpoint is exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Unix socket filename, resolved relative to the data directory.
    #[serde(default = "default_socket_file")]
    pub socket_file: String,
}

fn default_socket_file() -> String {
    "merit.sock".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            socket_file: default_socket_file(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration, treating a missing file as all-defaults.
    pub fn load() -> anyhow::Result<Self> {
        match std::fs::read_to_string(Self::config_path()) {
            Ok(raw) => Ok(toml::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve the data directory: explicit config wins over the
    /// platform default.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    /// The config file always sits in the default data directory;
    /// `storage.data_dir` can relocate the database but not the file
    /// that names it.
    fn config_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    /// Platform default data directory. `MERIT_DATA_DIR` overrides it,
    /// which the tests and multi-instance setups rely on.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("MERIT_DATA_DIR") {
            return PathBuf::from(dir);
        }
        let subpath = if cfg!(target_os = "macos") {
            "Library/Application Support/Merit"
        } else if cfg!(target_os = "windows") {
            "Merit"
        } else {
            ".merit"
        };
        home_relative(subpath)
    }
}

/// Resolve a path under `$HOME`, with a `/tmp` fallback for
/// environments that lack one.
fn home_relative(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| PathBuf::from("/tmp/merit"))
}
