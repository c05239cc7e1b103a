//! Pipeline module.
//!
//! This module provides the main pipeline orchestration and related
//! components.

mod builder;
pub mod progress;

pub use builder::{ForecastPipeline, ForecastPipelineBuilder, PipelineOutput};
pub use progress::{
    CancellationToken, ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
