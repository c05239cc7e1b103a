//! Custom error types for the forecast data pipeline.
//!
//! This module provides the error hierarchy for the pipeline using `thiserror`.
//! Errors are serializable, allowing them to be sent across an IPC boundary
//! (e.g., to a desktop frontend) for display.
//!
//! All pipeline errors are unrecoverable for the current invocation: there is
//! no internal retry. The caller is expected to surface the message, let the
//! user adjust the configuration, and re-run the pipeline from the top.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the forecast data pipeline.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// Pipeline was cancelled by user.
    #[error("Pipeline cancelled")]
    Cancelled,

    /// Malformed splitter, imputer, normalizer, or window parameters.
    ///
    /// Raised eagerly at construction time, before any data is touched.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A requested split window is larger than the available data.
    #[error("split window of {window} rows does not fit in {rows} available rows")]
    WindowOverflow { window: usize, rows: usize },

    /// A label window requested by the window transformer runs past the end
    /// of the parent table. Aborts the whole transform call.
    #[error(
        "label window [{start}, {end}) runs past the end of the parent table ({rows} rows)"
    )]
    TimeseriesWindowOverflow {
        start: usize,
        end: usize,
        rows: usize,
    },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// A sample or label window did not match the shape established by the
    /// first append to a sample set.
    #[error("window shape {got:?} does not match the sample set's established shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// The model-fit collaborator failed to produce predictions.
    #[error("Model prediction failed: {0}")]
    PredictionFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            Self::WindowOverflow { .. } => "WINDOW_OVERFLOW",
            Self::TimeseriesWindowOverflow { .. } => "TIMESERIES_WINDOW_OVERFLOW",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            Self::PredictionFailed(_) => "PREDICTION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error represents a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Serialize implementation for IPC compatibility.
///
/// Errors are serialized as a struct with `code` and `message` fields,
/// making them easy to handle in a frontend.
impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}
