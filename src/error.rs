//! Error types shared across the fetch, parse, and aggregation layers.
//!
//! Per-source failures ([`FetchError`], [`ParseError`]) never reach callers of
//! the aggregator or the news fetcher: they are folded into a
//! [`crate::models::SourceStatus`] and logged. [`AggregationDegraded`] is a
//! signal derived from a finished report, not something that is raised.

use thiserror::Error;

/// Why a single HTTP fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchFailure {
    /// Transient failures are worth another attempt after a backoff.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchFailure::Timeout | FetchFailure::Connect(_) => true,
            FetchFailure::Status(code) => *code == 429 || (500..600).contains(code),
            FetchFailure::Body(_) | FetchFailure::InvalidUrl(_) => false,
        }
    }
}

/// A failed GET against one source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_name} fetch of {url} failed: {reason}")]
pub struct FetchError {
    pub source_name: String,
    pub url: String,
    pub reason: FetchFailure,
}

impl FetchError {
    pub fn new(
        source_name: impl Into<String>,
        url: impl Into<String>,
        reason: FetchFailure,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            url: url.into(),
            reason,
        }
    }

    pub(crate) fn from_reqwest(source_name: &str, url: &str, err: &reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            FetchFailure::Timeout
        } else if let Some(status) = err.status() {
            FetchFailure::Status(status.as_u16())
        } else if err.is_body() || err.is_decode() {
            FetchFailure::Body(err.to_string())
        } else if err.is_builder() {
            FetchFailure::InvalidUrl(err.to_string())
        } else {
            FetchFailure::Connect(err.to_string())
        };
        Self::new(source_name, url, reason)
    }
}

/// The markup of a source no longer looks like what its parser expects.
///
/// "Zero rows found" is not a parse error; parsers return an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_name} markup not recognised: {reason}")]
pub struct ParseError {
    pub source_name: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

/// Outcome of one source inside a multi-source call.
#[derive(Debug, Clone, Error)]
pub enum SourceFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Every source failed for a given call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("all {} sources failed: {}", .failures.len(), describe_failures(.failures))]
pub struct AggregationDegraded {
    /// `(source name, reason)` for each failed source.
    pub failures: Vec<(String, String)>,
}

fn describe_failures(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(source, reason)| format!("{source} ({reason})"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Malformed caller input, rejected before any network access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ticker symbol is empty")]
    EmptyTicker,

    #[error("invalid ticker symbol \"{0}\"")]
    InvalidTicker(String),

    #[error("date range start {start} is after end {end}")]
    InvalidDateRange { start: String, end: String },
}

/// Failure loading the YAML configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown source \"{0}\" in config")]
    UnknownSource(String),
}

/// Failure rendering or writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output was not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
