//! Error types for the nimbus-learning crate.
//!
//! This module defines [`LearningError`], the main error type used throughout
//! the crate. All public API functions return `Result<T, LearningError>`.

use thiserror::Error;

/// The main error type for training and inference operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// Invalid configuration provided to the trainer.
    ///
    /// Check the error message for details on which configuration value is
    /// invalid and what values are accepted.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data provided for training or inference.
    ///
    /// Common causes:
    /// - No split contributed any training samples
    /// - Sample sets with mismatched input or label shapes across splits
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Training failed.
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    /// Training was cancelled by the user.
    ///
    /// Not a failure; training was intentionally stopped between epochs.
    #[error("Training cancelled")]
    Cancelled,

    /// The specified model file was not found.
    #[error("Model not found: {path}")]
    ModelNotFound {
        /// The path that was not found.
        path: String,
    },

    /// An error surfaced by the data-processing layer.
    #[error(transparent)]
    Processing(#[from] nimbus_processing::ProcessingError),

    /// I/O error during model save/load operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LearningError {
    /// Check if this error represents a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias for learning operations.
pub type Result<T> = std::result::Result<T, LearningError>;
