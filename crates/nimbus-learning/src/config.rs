//! Configuration for the training boundary.
//!
//! # Example
//!
//! ```
//! use nimbus_learning::TrainingConfig;
//!
//! let config = TrainingConfig::builder()
//!     .epochs(25)
//!     .learning_rate(0.005)
//!     .build()
//!     .expect("valid config");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{LearningError, Result};

/// Configuration for a model fit.
///
/// Use [`TrainingConfig::builder()`] to construct a configuration with the
/// builder pattern.
///
/// # Validation
///
/// [`build()`](TrainingConfigBuilder::build) enforces:
/// - `epochs` must be at least 1
/// - `learning_rate` must be finite and greater than 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of passes over each split's training samples.
    pub epochs: usize,

    /// Gradient-descent step size.
    pub learning_rate: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            learning_rate: 0.001,
        }
    }
}

impl TrainingConfig {
    /// Create a new configuration builder.
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(LearningError::InvalidConfig(
                "epochs must be at least 1".to_string(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(LearningError::InvalidConfig(format!(
                "learning rate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.config.epochs = epochs;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.config.learning_rate = learning_rate;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<TrainingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
