//! The model-fit capability.
//!
//! [`Trainer`] fits one [`LinearForecaster`] sequentially over every split's
//! training samples, honoring the configured epoch count and learning rate,
//! invoking the epoch observer after each pass, and checking the
//! cancellation token between epochs.

use std::collections::HashMap;
use std::sync::Arc;

use nimbus_processing::{SampleSet, TimeseriesData};
use tracing::{debug, info};

use crate::cancellation::CancellationToken;
use crate::config::TrainingConfig;
use crate::error::{LearningError, Result};
use crate::model::LinearForecaster;
use crate::progress::{ClosureEpochObserver, EpochObserver, EpochUpdate};

/// Fits a forecaster over windowed sample sets.
///
/// Use [`Trainer::builder()`] to configure epochs, learning rate, progress
/// observation, and cancellation.
///
/// # Example
///
/// ```rust,ignore
/// use nimbus_learning::{Trainer, TrainingConfig};
///
/// let model = Trainer::builder()
///     .config(TrainingConfig::builder().epochs(50).learning_rate(0.01).build()?)
///     .on_epoch(|update| {
///         println!("epoch {}: loss {:.4}", update.epoch, update.metrics["loss"]);
///     })
///     .build()?
///     .train(&output.timeseries)?;
///
/// model.save("forecaster.json")?;
/// ```
pub struct Trainer {
    config: TrainingConfig,
    observer: Option<Arc<dyn EpochObserver>>,
    cancellation_token: CancellationToken,
}

static_assertions::assert_impl_all!(Trainer: Send);

impl Trainer {
    /// Create a new trainer builder.
    pub fn builder() -> TrainerBuilder {
        TrainerBuilder::default()
    }

    /// Fit one model across every split's training sample set, in order.
    ///
    /// Validation metrics are computed per epoch for splits that carry
    /// validation samples. Returns
    /// [`LearningError::Cancelled`] if the token is cancelled between
    /// epochs, and [`LearningError::InvalidData`] when no split contributed
    /// training samples or the sample shapes disagree across splits.
    pub fn train(&self, series: &[TimeseriesData]) -> Result<LinearForecaster> {
        let (input_len, output_len) = self.sample_lengths(series)?;
        let mut model = LinearForecaster::zeroed(input_len, output_len);
        info!(
            splits = series.len(),
            epochs = self.config.epochs,
            learning_rate = self.config.learning_rate,
            "fitting forecaster"
        );

        for (split_idx, data) in series.iter().enumerate() {
            let training = &data.training;
            if training.is_empty() {
                debug!(split = split_idx, "skipping split without training samples");
                continue;
            }
            for epoch in 0..self.config.epochs {
                if self.cancellation_token.is_cancelled() {
                    info!(split = split_idx, epoch, "fit cancelled");
                    return Err(LearningError::Cancelled);
                }
                model.apply_gradient_step(
                    training.inputs(),
                    training.labels(),
                    self.config.learning_rate,
                );
                let mut metrics = evaluate(&model, training, "");
                if !data.validation.is_empty() {
                    metrics.extend(evaluate(&model, &data.validation, "val_"));
                }
                debug!(split = split_idx, epoch, loss = metrics["loss"], "epoch complete");
                if let Some(observer) = &self.observer {
                    observer.on_epoch_end(EpochUpdate::new(epoch, metrics));
                }
            }
        }
        Ok(model)
    }

    /// Flattened input/label lengths shared by every non-empty sample set.
    fn sample_lengths(&self, series: &[TimeseriesData]) -> Result<(usize, usize)> {
        let mut lengths = None;
        for data in series {
            let training = &data.training;
            let (Some(input_shape), Some(label_shape)) =
                (training.input_shape(), training.label_shape())
            else {
                continue;
            };
            let found = (input_shape.0 * input_shape.1, label_shape.0 * label_shape.1);
            match lengths {
                None => lengths = Some(found),
                Some(expected) if expected != found => {
                    return Err(LearningError::InvalidData(format!(
                        "sample lengths {found:?} disagree with {expected:?} across splits"
                    )));
                }
                Some(_) => {}
            }
        }
        lengths.ok_or_else(|| {
            LearningError::InvalidData("no split contributed training samples".to_string())
        })
    }
}

/// Mean squared error and mean absolute error over a sample set.
fn evaluate(model: &LinearForecaster, samples: &SampleSet, prefix: &str) -> HashMap<String, f64> {
    let mut squared = 0.0;
    let mut absolute = 0.0;
    let mut count = 0usize;
    for (window, label) in samples.inputs().iter().zip(samples.labels()) {
        let prediction = model.predict_row(window);
        for (p, y) in prediction.iter().zip(label) {
            let residual = p - y;
            squared += residual * residual;
            absolute += residual.abs();
            count += 1;
        }
    }
    let n = count.max(1) as f64;
    let mut metrics = HashMap::new();
    metrics.insert(format!("{prefix}loss"), squared / n);
    metrics.insert(format!("{prefix}mae"), absolute / n);
    metrics
}

/// Builder for [`Trainer`].
#[derive(Default)]
pub struct TrainerBuilder {
    config: Option<TrainingConfig>,
    observer: Option<Arc<dyn EpochObserver>>,
    cancellation_token: Option<CancellationToken>,
}

impl TrainerBuilder {
    /// Set the training configuration.
    pub fn config(mut self, config: TrainingConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set an epoch observer.
    pub fn observer(mut self, observer: Arc<dyn EpochObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Set an epoch callback closure.
    ///
    /// Convenience over [`observer`](Self::observer) for simple handlers.
    pub fn on_epoch<F>(mut self, callback: F) -> Self
    where
        F: Fn(EpochUpdate) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(ClosureEpochObserver::new(callback)));
        self
    }

    /// Set a cancellation token checked between epochs.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Build the trainer, validating the configuration eagerly.
    pub fn build(self) -> Result<Trainer> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(Trainer {
            config,
            observer: self.observer,
            cancellation_token: self.cancellation_token.unwrap_or_default(),
        })
    }
}
