// Domain errors - Dropped samples and rejected configuration/commands
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Why an inbound telemetry record could not be turned into a Sample.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SampleError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{0}' is not numeric")]
    NonNumeric(&'static str),

    #[error("unparseable timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// A record the engine refused to append to the window.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IngestError {
    #[error("malformed sample: {0}")]
    Malformed(#[from] SampleError),

    #[error("out-of-order sample at {received} (window already reaches {latest})")]
    OutOfOrder {
        received: DateTime<Utc>,
        latest: DateTime<Utc>,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DashboardError {
    #[error("metric '{0}' not found")]
    UnknownMetric(String),

    #[error("chart '{0}' not found")]
    UnknownChart(String),

    #[error("metric source '{0}' is not a sample field")]
    UnknownMetricSource(String),

    #[error("metric '{0}' is declared more than once")]
    DuplicateMetric(String),

    #[error("chart '{0}' is declared more than once")]
    DuplicateChart(String),

    #[error("chart '{chart}' has an empty value domain [{min}, {max}]")]
    EmptyValueDomain { chart: String, min: f64, max: f64 },

    #[error("dashboard engine is not running")]
    EngineStopped,

    #[error("failed to render chart '{chart}': {reason}")]
    RenderFailed { chart: String, reason: String },
}
