//! Forecast Data Pipeline Library
//!
//! A deterministic data-splitting and timeseries-sample-construction
//! pipeline built with Rust and Polars, for preparing tabular time-indexed
//! weather/climate data for sequence-prediction models.
//!
//! # Overview
//!
//! The pipeline turns a raw table into shaped (input, label) sample arrays
//! ready for model fitting, in a fixed order:
//!
//! - **Imputation**: Fill missing values (constant, per-column mean, or
//!   iterative column modeling)
//! - **Splitting**: Partition the table into train/validation/test splits
//!   (straight, rolling window, or expanding window)
//! - **Normalization**: Rescale each split's partitions from statistics of
//!   its training partition only (z-standardization or min-max)
//! - **Windowing**: Slide supervised (input, label) windows over each
//!   partition, with label lookups against the split's parent table
//! - **Reporting**: Pair stored ground truth with a trained model's
//!   predictions into tabular fit reports
//!
//! Every stage is a pure transformation: re-running the pipeline with
//! identical inputs and configuration yields bit-identical samples. Model
//! fitting itself is an external collaborator reached through the
//! [`Forecaster`] trait.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use nimbus_processing::{
//!     ForecastPipeline, PipelineConfig, SplitStrategy, WindowSpec,
//! };
//!
//! let config = PipelineConfig::builder()
//!     .split(SplitStrategy::Rolling {
//!         train_size: 48,
//!         test_size: 12,
//!         validation_size: 12,
//!         stride: 12,
//!         gap: 0,
//!     })
//!     .window(WindowSpec {
//!         input_columns: vec!["t_mean".into(), "humidity".into()],
//!         output_columns: vec!["t_mean".into()],
//!         input_width: 24,
//!         output_width: 1,
//!         stride: 1,
//!         label_offset: 1,
//!     })
//!     .build()?;
//!
//! let output = ForecastPipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(&dataframe)?;
//!
//! for series in &output.timeseries {
//!     println!("training samples: {}", series.training.len());
//! }
//! ```
//!
//! # Cancellation
//!
//! Long runs can be cancelled between stages from another thread:
//!
//! ```rust,ignore
//! use nimbus_processing::{CancellationToken, ForecastPipeline, ProcessingError};
//!
//! let token = CancellationToken::new();
//! let token_for_cancel = token.clone();
//!
//! std::thread::spawn(move || token_for_cancel.cancel());
//!
//! let result = ForecastPipeline::builder()
//!     .config(config)
//!     .cancellation_token(token)
//!     .build()?
//!     .process(&dataframe);
//!
//! match result {
//!     Err(ProcessingError::Cancelled) => println!("Cancelled by user"),
//!     Ok(output) => println!("{} splits", output.splits),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

pub mod config;
pub mod error;
pub mod imputers;
pub mod normalizers;
pub mod pipeline;
pub mod reporting;
pub mod splitters;
pub mod transformer;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{PipelineConfig, PipelineConfigBuilder, SplitStrategy};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use imputers::{ImputeStrategy, Imputer};
pub use normalizers::{MinMaxNormalizer, NormalizeStrategy, ZStandardizer};
pub use pipeline::{
    CancellationToken, ClosureProgressReporter, ForecastPipeline, ForecastPipelineBuilder,
    PipelineOutput, PipelineStage, ProgressReporter, ProgressUpdate,
};
pub use reporting::{EvaluationReport, EvaluationReporter, Forecaster};
pub use splitters::{ExpandingSplit, RollingSplit, StraightSplit};
pub use transformer::{WindowSpec, WindowTransformer};
pub use types::{Partition, SampleSet, SampleWindow, Split, TimeseriesData};
