//! Per-epoch progress reporting.
//!
//! The trainer invokes an [`EpochObserver`] synchronously at the end of every
//! epoch with the metrics computed for that epoch. The observer is a plain
//! callback interface, decoupled from any presentation mechanism; a GUI
//! forwards updates to its event system, a CLI prints them, tests count them.

use std::collections::HashMap;

/// Metrics snapshot delivered at the end of one epoch.
///
/// `metrics` always carries `loss` (mean squared error over the training
/// samples) and `mae`; when the split has a validation set, `val_loss` and
/// `val_mae` are present too.
#[derive(Debug, Clone)]
pub struct EpochUpdate {
    /// Zero-based epoch index within the current fit.
    pub epoch: usize,
    /// Metric name to value.
    pub metrics: HashMap<String, f64>,
}

impl EpochUpdate {
    pub fn new(epoch: usize, metrics: HashMap<String, f64>) -> Self {
        Self { epoch, metrics }
    }
}

/// Trait for observing training progress, one call per epoch.
///
/// Implementations must be `Send + Sync` so the fit can run on a background
/// thread while the observer lives on another.
pub trait EpochObserver: Send + Sync {
    /// Called synchronously at the end of each epoch.
    fn on_epoch_end(&self, update: EpochUpdate);
}

/// Wrapper that implements [`EpochObserver`] using a closure.
pub struct ClosureEpochObserver<F>
where
    F: Fn(EpochUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureEpochObserver<F>
where
    F: Fn(EpochUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> EpochObserver for ClosureEpochObserver<F>
where
    F: Fn(EpochUpdate) + Send + Sync,
{
    fn on_epoch_end(&self, update: EpochUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(EpochUpdate: Send, Sync);
