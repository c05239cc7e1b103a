//! Pipeline configuration.
//!
//! [`PipelineConfig`] gathers the strategy choices for every stage and is
//! validated as a whole before any data is touched. Strategy parameters that
//! can be rejected eagerly (fractions out of range, zero strides, unknown
//! strategy names) surface as
//! [`ProcessingError::InvalidConfiguration`](crate::error::ProcessingError::InvalidConfiguration)
//! from [`PipelineConfigBuilder::build`].

use std::sync::Arc;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::imputers::ImputeStrategy;
use crate::normalizers::NormalizeStrategy;
use crate::splitters::{ExpandingSplit, RollingSplit, StraightSplit};
use crate::transformer::{WindowSpec, WindowTransformer};
use crate::types::Split;

fn default_step() -> usize {
    1
}

/// Windowing strategy used to partition the table into splits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SplitStrategy {
    /// One sequential train/validation/test split by fractions.
    Straight {
        train_fraction: f64,
        validation_fraction: f64,
    },
    /// Fixed-width window sliding by `stride` rows.
    Rolling {
        train_size: usize,
        test_size: usize,
        #[serde(default)]
        validation_size: usize,
        #[serde(default = "default_step")]
        stride: usize,
        #[serde(default)]
        gap: usize,
    },
    /// Training window anchored at row 0, growing by `expansion_rate` rows.
    Expanding {
        train_size: usize,
        test_size: usize,
        #[serde(default)]
        validation_size: usize,
        #[serde(default = "default_step")]
        expansion_rate: usize,
        #[serde(default)]
        gap: usize,
    },
}

impl SplitStrategy {
    /// Dead-zone rows between validation and test, when the strategy has one.
    pub fn gap(&self) -> usize {
        match self {
            Self::Straight { .. } => 0,
            Self::Rolling { gap, .. } | Self::Expanding { gap, .. } => *gap,
        }
    }

    /// Validate the strategy parameters without running a split.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Straight {
                train_fraction,
                validation_fraction,
            } => StraightSplit::new(train_fraction, validation_fraction).map(|_| ()),
            Self::Rolling {
                train_size,
                test_size,
                validation_size,
                stride,
                gap,
            } => RollingSplit::new(train_size, test_size, validation_size, stride, gap)
                .map(|_| ()),
            Self::Expanding {
                train_size,
                test_size,
                validation_size,
                expansion_rate,
                gap,
            } => ExpandingSplit::new(train_size, test_size, validation_size, expansion_rate, gap)
                .map(|_| ()),
        }
    }

    /// Run the configured splitter over the table.
    pub fn split(&self, data: &Arc<DataFrame>) -> Result<Vec<Split>> {
        match *self {
            Self::Straight {
                train_fraction,
                validation_fraction,
            } => StraightSplit::new(train_fraction, validation_fraction)?.split(data),
            Self::Rolling {
                train_size,
                test_size,
                validation_size,
                stride,
                gap,
            } => RollingSplit::new(train_size, test_size, validation_size, stride, gap)?
                .split(data),
            Self::Expanding {
                train_size,
                test_size,
                validation_size,
                expansion_rate,
                gap,
            } => {
                ExpandingSplit::new(train_size, test_size, validation_size, expansion_rate, gap)?
                    .split(data)
            }
        }
    }
}

/// Configuration for the full forecast data pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Missing-value strategy applied before splitting.
    pub impute: ImputeStrategy,

    /// Windowing strategy producing the train/validation/test splits.
    pub split: SplitStrategy,

    /// Optional rescaling of split partitions; `None` skips the stage.
    pub normalize: Option<NormalizeStrategy>,

    /// Supervised window geometry and column selection.
    pub window: WindowSpec,
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate every stage's parameters eagerly.
    pub fn validate(&self) -> Result<()> {
        self.split.validate()?;
        WindowTransformer::new(self.window.clone()).map(|_| ())
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    impute: ImputeStrategy,
    split: Option<SplitStrategy>,
    normalize: Option<NormalizeStrategy>,
    window: Option<WindowSpec>,
}

impl PipelineConfigBuilder {
    pub fn impute(mut self, strategy: ImputeStrategy) -> Self {
        self.impute = strategy;
        self
    }

    pub fn split(mut self, strategy: SplitStrategy) -> Self {
        self.split = Some(strategy);
        self
    }

    pub fn normalize(mut self, strategy: NormalizeStrategy) -> Self {
        self.normalize = Some(strategy);
        self
    }

    pub fn window(mut self, spec: WindowSpec) -> Self {
        self.window = Some(spec);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<PipelineConfig> {
        let config = PipelineConfig {
            impute: self.impute,
            split: self.split.unwrap_or(SplitStrategy::Straight {
                train_fraction: 0.8,
                validation_fraction: 0.0,
            }),
            normalize: self.normalize,
            window: self.window.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
