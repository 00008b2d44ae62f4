//! Unified error hierarchy for hrtrace
//!
//! Parsing failures are fatal to a single load and surface as [`ParseError`].
//! Analyses never fail on an unremarkable workout: a precondition that is not
//! met is reported as [`InsufficientData`] inside an `Insight::NotApplicable`.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all hrtrace operations
#[derive(Debug, Error)]
pub enum HrTraceError {
    /// Workout file parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Invalid parameters passed to a calculation
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors raised while turning raw workout content into a `Series`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// XML is not well-formed
    #[error("Malformed XML: {reason}")]
    MalformedXml { reason: String },

    /// JSON workout record could not be decoded
    #[error("Invalid JSON workout: {reason}")]
    InvalidJson { reason: String },

    /// No trackpoint carried both a timestamp and a heart rate
    #[error("No usable heart-rate samples in {format} content")]
    NoUsableSamples { format: String },

    /// Samples violate the series invariants
    #[error("Invalid series: {reason}")]
    InvalidSeries { reason: String },

    /// No importer handles this file
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },
}

/// Invalid parameters for a calculation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("Invalid parameter for {calculation}: {parameter}={value}")]
    InvalidParameter {
        calculation: String,
        parameter: String,
        value: String,
    },
}

impl CalculationError {
    pub fn invalid_parameter(
        calculation: &str,
        parameter: &str,
        value: impl ToString,
    ) -> Self {
        CalculationError::InvalidParameter {
            calculation: calculation.to_string(),
            parameter: parameter.to_string(),
            value: value.to_string(),
        }
    }
}

/// An analysis precondition that the series does not meet.
///
/// This is an expected data-shape gap (a short workout, no peaks above the
/// threshold) rather than malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("Insufficient data for {calculation}: {reason}")]
pub struct InsufficientData {
    pub calculation: String,
    pub reason: String,
}

impl InsufficientData {
    pub fn new(calculation: &str, reason: impl Into<String>) -> Self {
        Self {
            calculation: calculation.to_string(),
            reason: reason.into(),
        }
    }
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Export failed to {path}: {reason}")]
    Failed { path: PathBuf, reason: String },

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

/// Result type alias for hrtrace operations
pub type Result<T> = std::result::Result<T, HrTraceError>;

impl HrTraceError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, HrTraceError::Io(_) | HrTraceError::Export(ExportError::Io(_)))
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HrTraceError::Parse(ParseError::UnsupportedFormat { .. }) => ErrorSeverity::Warning,
            HrTraceError::Parse(ParseError::NoUsableSamples { .. }) => ErrorSeverity::Warning,
            HrTraceError::Calculation(_) => ErrorSeverity::Warning,
            HrTraceError::Configuration(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            HrTraceError::Parse(ParseError::MalformedXml { .. }) => {
                "The workout file is not valid XML. Please check the file and try again."
                    .to_string()
            }
            HrTraceError::Parse(ParseError::NoUsableSamples { .. }) => {
                "No heart rate data found in this file.".to_string()
            }
            HrTraceError::Parse(ParseError::UnsupportedFormat { format }) => {
                format!("Files of type '{}' are not supported. Use .tcx or .json.", format)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical error requiring immediate attention
    Critical,
    /// Error that prevents the operation
    Error,
    /// Warning that doesn't prevent other operations
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
