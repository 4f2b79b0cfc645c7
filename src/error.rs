/// Error taxonomy for configuration, data sources and the sampling loop
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which data source produced a reading or a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Sensor,
    Weather,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Sensor => f.write_str("sensor"),
            SourceKind::Weather => f.write_str("weather"),
        }
    }
}

/// A failed read from one data source
#[derive(Debug, Error)]
#[error("{origin} read failed: {cause}")]
pub struct SourceError {
    pub origin: SourceKind,
    #[source]
    pub cause: SourceCause,
}

impl SourceError {
    pub fn new(origin: SourceKind, cause: impl Into<SourceCause>) -> Self {
        Self {
            origin,
            cause: cause.into(),
        }
    }

    pub fn sensor(cause: impl Into<SourceCause>) -> Self {
        Self::new(SourceKind::Sensor, cause)
    }

    pub fn weather(cause: impl Into<SourceCause>) -> Self {
        Self::new(SourceKind::Weather, cause)
    }
}

#[derive(Debug, Error)]
pub enum SourceCause {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("no DHT device found under {0}")]
    DeviceNotFound(PathBuf),

    #[error("{quantity} {value} outside sensor range {min}..={max}")]
    OutOfRange {
        quantity: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed weather document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("humidity {0:?} has no leading number")]
    Humidity(String),

    #[error("sysfs value {0:?} is not an integer")]
    SysfsValue(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("sampling is already running")]
    AlreadyRunning,

    #[error("sampling is not running")]
    NotRunning,

    #[error("sampler was lost when the sampling task failed")]
    SamplerLost,

    #[error("sampling task ended abnormally: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
