use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use argo_core::{Category, QueryParameters};
use argo_engine::{TransportKind, TransportSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "argo.ron";
pub const DEFAULT_HTTP_ENDPOINT: &str = "http://127.0.0.1:8000/api/process";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid value for {field}: {message}")]
    Value { field: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Transport {
    #[default]
    WebSocket,
    Http,
}

impl From<Transport> for TransportKind {
    fn from(value: Transport) -> Self {
        match value {
            Transport::WebSocket => TransportKind::WebSocket,
            Transport::Http => TransportKind::Http,
        }
    }
}

/// Initial query values; `None` depths start the form with the field unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDefaults {
    pub start_date: String,
    pub end_date: String,
    pub min_depth: Option<f64>,
    pub max_depth: Option<f64>,
    pub category: Category,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        let params = QueryParameters::default();
        Self {
            start_date: params.start_date,
            end_date: params.end_date,
            min_depth: params.min_depth,
            max_depth: params.max_depth,
            category: params.category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub transport: Transport,
    pub output_dir: PathBuf,
    pub log_destination: LogDestination,
    pub verbose: bool,
    pub idle_timeout_secs: Option<u64>,
    pub connect_timeout_secs: u64,
    pub max_payload_bytes: u64,
    pub defaults: QueryDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        let transport = TransportSettings::default();
        Self {
            endpoint: transport.endpoint,
            transport: Transport::WebSocket,
            output_dir: PathBuf::from("./downloads"),
            log_destination: LogDestination::File,
            verbose: false,
            idle_timeout_secs: None,
            connect_timeout_secs: transport.connect_timeout.as_secs(),
            max_payload_bytes: transport.max_payload_bytes,
            defaults: QueryDefaults::default(),
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Value {
                field: "endpoint",
                message: "must not be empty".to_string(),
            });
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Value {
                field: "connect_timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        if self.idle_timeout_secs == Some(0) {
            return Err(ConfigError::Value {
                field: "idle_timeout_secs",
                message: "use None to disable, or at least 1".to_string(),
            });
        }
        if self.max_payload_bytes == 0 {
            return Err(ConfigError::Value {
                field: "max_payload_bytes",
                message: "must be positive".to_string(),
            });
        }
        let depths = [self.defaults.min_depth, self.defaults.max_depth];
        if depths.into_iter().flatten().any(|depth| !depth.is_finite()) {
            return Err(ConfigError::Value {
                field: "defaults",
                message: "depths must be finite numbers".to_string(),
            });
        }
        Ok(())
    }

    /// Switches to the plain HTTP transport. The stock websocket endpoint is
    /// swapped for its HTTP counterpart; a custom endpoint is kept.
    pub fn use_http(&mut self) {
        self.transport = Transport::Http;
        if self.endpoint == TransportSettings::default().endpoint {
            self.endpoint = DEFAULT_HTTP_ENDPOINT.to_string();
        }
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            kind: self.transport.into(),
            endpoint: self.endpoint.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            idle_timeout: self.idle_timeout_secs.map(Duration::from_secs),
            max_payload_bytes: self.max_payload_bytes,
        }
    }

    pub fn query_defaults(&self) -> QueryParameters {
        QueryParameters {
            start_date: self.defaults.start_date.clone(),
            end_date: self.defaults.end_date.clone(),
            min_depth: self.defaults.min_depth,
            max_depth: self.defaults.max_depth,
            category: self.defaults.category,
        }
    }
}
