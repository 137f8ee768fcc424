//! Service configuration
//!
//! Loaded from a JSON file. Every section and every field is optional and
//! falls back to its default:
//!
//! ```json
//! {
//!   "http":    { "host": "0.0.0.0", "port": 5000, "cors_origins": ["http://localhost:3000"] },
//!   "storage": { "backend": "file", "data_dir": "./tabula-data" },
//!   "schema":  { "unknown_fields": "reject" },
//!   "catalog": { "default_page_limit": 10, "max_page_limit": 100, "max_write_retries": 5 },
//!   "log":     { "filter": "tabula=info,tower_http=info", "json": false }
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::UnknownFieldPolicy;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl ServiceConfig {
    /// Loads and validates a config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ServiceConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, but a missing file yields the default configuration.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Checks cross-field constraints serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.http.port == 0 {
            return Err(ConfigError::Invalid("http.port must be > 0".into()));
        }

        let catalog = &self.catalog;
        if catalog.max_page_limit == 0 {
            return Err(ConfigError::Invalid(
                "catalog.max_page_limit must be > 0".into(),
            ));
        }
        if catalog.default_page_limit == 0 || catalog.default_page_limit > catalog.max_page_limit
        {
            return Err(ConfigError::Invalid(format!(
                "catalog.default_page_limit must be between 1 and {}",
                catalog.max_page_limit
            )));
        }

        if self.storage.backend == StorageBackend::File
            && self.storage.data_dir.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid(
                "storage.data_dir is required for the file backend".into(),
            ));
        }

        Ok(())
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Tables live only as long as the process
    #[default]
    Memory,
    /// One JSON file per table under `data_dir`
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./tabula-data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind host (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port (default: 5000)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty allows any (default: ["http://localhost:3000"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl HttpConfig {
    /// `host:port` as given to the listener
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Row validation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Policy for row keys that name no column (default: reject)
    #[serde(default)]
    pub unknown_fields: UnknownFieldPolicy,
}

/// Listing and write-retry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Page size when the caller gives none (default: 10)
    #[serde(default = "default_page_limit")]
    pub default_page_limit: usize,
    /// Largest accepted page size (default: 100)
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: usize,
    /// Retries after losing an optimistic write race (default: 5)
    #[serde(default = "default_max_write_retries")]
    pub max_write_retries: u32,
}

fn default_page_limit() -> usize {
    10
}

fn default_max_page_limit() -> usize {
    100
}

fn default_max_write_retries() -> u32 {
    5
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
            max_write_retries: default_max_write_retries(),
        }
    }
}

/// Logging settings; `RUST_LOG` takes precedence over `filter`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "tabula=info,tower_http=info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}
