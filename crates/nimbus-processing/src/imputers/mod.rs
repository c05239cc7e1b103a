//! Missing-value imputation.
//!
//! The imputer is the entry stage of the pipeline: it casts the table to
//! Float64 and fills every missing cell (null or NaN) according to the
//! configured strategy. Output shape and column order are identical to the
//! input.

mod iterative;
mod statistical;

use std::str::FromStr;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::utils;

/// Strategy for filling missing values.
///
/// Strategy names accepted by [`FromStr`] follow the configuration surface:
/// `"None"`, `"Simple"`, and `"Iterative"`. Anything else is rejected with
/// [`ProcessingError::InvalidConfiguration`] before any data is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ImputeStrategy {
    /// Replace missing values with the constant 0.0 (strategy name `"None"`).
    #[default]
    Zero,
    /// Replace missing values with the per-column mean of observed values
    /// (strategy name `"Simple"`).
    Mean,
    /// Iteratively model each column as a function of the others, initialized
    /// from the most frequent observed value (strategy name `"Iterative"`).
    Iterative,
}

impl FromStr for ImputeStrategy {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "None" => Ok(Self::Zero),
            "Simple" => Ok(Self::Mean),
            "Iterative" => Ok(Self::Iterative),
            other => Err(ProcessingError::InvalidConfiguration(format!(
                "imputer strategy \"{other}\" was not recognized (expected None, Simple, or Iterative)"
            ))),
        }
    }
}

/// Fills missing values in a raw table.
#[derive(Debug, Clone)]
pub struct Imputer {
    strategy: ImputeStrategy,
    max_iter: usize,
}

impl Imputer {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            max_iter: 10,
        }
    }

    /// Construct from a strategy name (`"None"`, `"Simple"`, `"Iterative"`).
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// Maximum refinement rounds for the iterative strategy.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    /// Fill every missing cell of the table.
    ///
    /// The table is cast to Float64 first; missing means null or NaN. A
    /// column with no observed values at all falls back to 0.0 under every
    /// strategy.
    pub fn impute(&self, df: &DataFrame) -> Result<DataFrame> {
        let df = utils::to_f64_table(df)?;
        debug!(
            strategy = ?self.strategy,
            rows = df.height(),
            columns = df.width(),
            "imputing missing values"
        );
        match self.strategy {
            ImputeStrategy::Zero => statistical::fill_constant(&df, 0.0),
            ImputeStrategy::Mean => statistical::fill_mean(&df),
            ImputeStrategy::Iterative => iterative::impute(&df, self.max_iter),
        }
    }
}
