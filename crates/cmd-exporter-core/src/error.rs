//! Shared error type across cmd_exporter crates.

use thiserror::Error;

/// Stable error codes (used by tests and log fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Configuration missing, malformed or invalid.
    Config,
    /// Command line could not be tokenized.
    CommandLine,
    /// Metric descriptor or registry failure.
    Metrics,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Config => "CONFIG",
            ErrorCode::CommandLine => "COMMAND_LINE",
            ErrorCode::Metrics => "METRICS",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Unified error type used by core and the exporter binary.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("config: {0}")]
    Config(String),
    #[error("invalid command line: {0}")]
    CommandLine(String),
    #[error("metrics: {0}")]
    Metrics(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ExporterError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ExporterError::Config(_) => ErrorCode::Config,
            ExporterError::CommandLine(_) => ErrorCode::CommandLine,
            ExporterError::Metrics(_) => ErrorCode::Metrics,
            ExporterError::Internal(_) => ErrorCode::Internal,
        }
    }
}
