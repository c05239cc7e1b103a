//! Forecast model training boundary.
//!
//! This crate implements the model-fit side of the forecast pipeline: a
//! trainer with the contract
//! `fit(training samples, epochs, learning rate, validation data, progress
//! callback) -> trained model`, and a trained model that predicts label rows
//! for the sample sets produced by `nimbus-processing`.
//!
//! The pipeline core treats model fitting as an opaque, potentially slow,
//! synchronous call. This crate keeps that boundary honest:
//!
//! - [`TrainingConfig`]: validated epochs and learning rate
//! - [`EpochObserver`]: synchronous per-epoch metrics callback, decoupled
//!   from any presentation mechanism
//! - [`CancellationToken`]: caller-level cancellation observed between
//!   epochs
//! - [`LinearForecaster`]: the trained model; implements
//!   [`nimbus_processing::Forecaster`] so it plugs into the evaluation
//!   reporter, and saves/loads as JSON
//!
//! # Example
//!
//! ```rust,ignore
//! use nimbus_learning::{Trainer, TrainingConfig};
//! use nimbus_processing::EvaluationReporter;
//!
//! let model = Trainer::builder()
//!     .config(TrainingConfig::builder().epochs(50).learning_rate(0.01).build()?)
//!     .on_epoch(|update| {
//!         println!("epoch {}: loss {:.4}", update.epoch, update.metrics["loss"]);
//!     })
//!     .build()?
//!     .train(&output.timeseries)?;
//!
//! let report = EvaluationReporter::new(&model)
//!     .report(&output.timeseries, true, true)?;
//! report.save("runs/weather")?;
//! ```

pub mod cancellation;
pub mod config;
pub mod error;
pub mod model;
pub mod progress;
pub mod trainer;

// Re-exports for convenient access
pub use cancellation::CancellationToken;
pub use config::{TrainingConfig, TrainingConfigBuilder};
pub use error::{LearningError, Result};
pub use model::LinearForecaster;
pub use progress::{ClosureEpochObserver, EpochObserver, EpochUpdate};
pub use trainer::{Trainer, TrainerBuilder};
