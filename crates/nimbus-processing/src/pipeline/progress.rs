//! Progress reporting and cancellation support for the pipeline.
//!
//! The pipeline runs synchronously; callers that need a responsive surface
//! run it on a background thread and observe it through these types. A
//! [`CancellationToken`] can be cancelled from any thread and is checked
//! between stages.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Stages of the forecast data pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Filling missing values
    Imputation,
    /// Partitioning the table into train/validation/test splits
    Splitting,
    /// Rescaling split partitions from training statistics
    Normalization,
    /// Sliding supervised windows over the partitions
    Windowing,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline was cancelled by user
    Cancelled,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Imputation => "Imputing Values",
            Self::Splitting => "Splitting Table",
            Self::Normalization => "Normalizing Splits",
            Self::Windowing => "Windowing Samples",
            Self::Complete => "Complete",
            Self::Cancelled => "Cancelled",
            Self::Failed => "Failed",
        }
    }

    /// Weight of this stage in the overall pipeline (0.0 - 1.0).
    ///
    /// Weights sum to ~1.0 for the processing stages; terminal states carry
    /// no weight.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Imputation => 0.15,
            Self::Splitting => 0.25,
            Self::Normalization => 0.15,
            Self::Windowing => 0.45,
            Self::Complete | Self::Cancelled | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Imputation => 0.0,
            Self::Splitting => 0.15,
            Self::Normalization => 0.40,
            Self::Windowing => 0.55,
            Self::Complete => 1.0,
            Self::Cancelled | Self::Failed => 0.0,
        }
    }
}

/// A progress update emitted while the pipeline runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within the current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a progress update for a stage.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a completion update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a cancelled update.
    pub fn cancelled() -> Self {
        Self {
            stage: PipelineStage::Cancelled,
            progress: 0.0,
            stage_progress: 0.0,
            message: "Pipeline cancelled by user".to_string(),
        }
    }

    /// Creates a failed update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates from the pipeline.
///
/// Implementations must be `Send + Sync` so the pipeline can run on a
/// background thread while the observer lives on another.
pub trait ProgressReporter: Send + Sync {
    /// Called when progress is made during processing.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

/// Token for cancelling a running pipeline.
///
/// Clones share state through an atomic flag, so the token can be handed to
/// another thread and cancelled there. The pipeline checks the token between
/// stages and returns
/// [`ProcessingError::Cancelled`](crate::error::ProcessingError::Cancelled)
/// when cancellation was requested.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

// Progress and cancellation types cross thread boundaries.
static_assertions::assert_impl_all!(CancellationToken: Send, Sync);
static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Thread-safe; visible to all clones.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused for another run.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_cancellation_token_cancel_and_reset() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancellation_token_clone_shares_state() {
        let token1 = CancellationToken::new();
        let token2 = token1.clone();
        token1.cancel();
        assert!(token2.is_cancelled());
    }

    #[test]
    fn test_cancellation_visible_across_threads() {
        let token = CancellationToken::new();
        let token_clone = token.clone();
        token.cancel();
        let handle = std::thread::spawn(move || token_clone.is_cancelled());
        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_progress_update_weighted() {
        let update = ProgressUpdate::new(PipelineStage::Splitting, 0.5, "Splitting...");
        assert_eq!(update.stage, PipelineStage::Splitting);
        assert!((update.progress - 0.275).abs() < 1e-6);
    }

    #[test]
    fn test_progress_update_complete() {
        let update = ProgressUpdate::complete("Done");
        assert_eq!(update.stage, PipelineStage::Complete);
        assert_eq!(update.progress, 1.0);
    }

    #[test]
    fn test_stage_weights_sum_to_one() {
        let stages = [
            PipelineStage::Imputation,
            PipelineStage::Splitting,
            PipelineStage::Normalization,
            PipelineStage::Windowing,
        ];
        let total: f32 = stages.iter().map(|s| s.weight()).sum();
        assert!((total - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&PipelineStage::Windowing).unwrap();
        assert_eq!(json, "\"windowing\"");
    }

    #[test]
    fn test_closure_progress_reporter() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let reporter = ClosureProgressReporter::new(move |_update| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        reporter.report(ProgressUpdate::new(PipelineStage::Imputation, 0.0, "go"));
        reporter.report(ProgressUpdate::complete("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
