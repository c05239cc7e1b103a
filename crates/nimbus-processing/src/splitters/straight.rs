//! Single sequential split.

use std::sync::Arc;

use polars::prelude::DataFrame;
use tracing::debug;

use super::make_split;
use crate::error::{ProcessingError, Result};
use crate::types::Split;

/// A single sequential split: the training partition takes the first rows of
/// the table, validation the middle rows, and test everything after.
///
/// `train_fraction` and `validation_fraction` are fractions of the overall
/// row count; a validation fraction of 0.0 yields an empty validation
/// partition for callers that only want a train/test split.
#[derive(Debug, Clone)]
pub struct StraightSplit {
    train_fraction: f64,
    validation_fraction: f64,
}

impl StraightSplit {
    /// Errors with [`ProcessingError::InvalidConfiguration`] when either
    /// fraction is negative, not finite, or the two sum past 1.
    pub fn new(train_fraction: f64, validation_fraction: f64) -> Result<Self> {
        if !train_fraction.is_finite()
            || !validation_fraction.is_finite()
            || train_fraction < 0.0
            || validation_fraction < 0.0
            || train_fraction + validation_fraction > 1.0
        {
            return Err(ProcessingError::InvalidConfiguration(format!(
                "split fractions must satisfy 0 <= train + validation <= 1 \
                 (train: {train_fraction}, validation: {validation_fraction})"
            )));
        }
        Ok(Self {
            train_fraction,
            validation_fraction,
        })
    }

    pub fn split(&self, data: &Arc<DataFrame>) -> Result<Vec<Split>> {
        let n = data.height();
        let train_at = ((n as f64) * self.train_fraction) as usize;
        let val_at = (train_at + ((n as f64) * self.validation_fraction) as usize).min(n);
        debug!(rows = n, train_at, val_at, "straight split");
        Ok(vec![make_split(
            data,
            (0, train_at),
            (train_at, val_at - train_at),
            (val_at, n - val_at),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: usize) -> Arc<DataFrame> {
        let values: Vec<f64> = (1..=n).map(|v| v as f64).collect();
        Arc::new(polars::df!["col0" => values].unwrap())
    }

    #[test]
    fn test_default_fractions_on_20_rows() {
        let splits = StraightSplit::new(0.8, 0.0).unwrap().split(&frame(20)).unwrap();
        assert_eq!(splits.len(), 1);
        let split = &splits[0];
        assert_eq!(split.train.len(), 16);
        assert_eq!(split.train.offset(), 0);
        assert!(split.validation.is_empty());
        assert!(!split.has_validation());
        assert_eq!(split.test.len(), 4);
        assert_eq!(split.test.offset(), 16);
    }

    #[test]
    fn test_with_validation_partition() {
        let splits = StraightSplit::new(0.5, 0.25).unwrap().split(&frame(20)).unwrap();
        let split = &splits[0];
        assert_eq!(split.train.len(), 10);
        assert_eq!(split.validation.len(), 5);
        assert_eq!(split.validation.offset(), 10);
        assert_eq!(split.test.len(), 5);
        assert!(split.has_validation());
    }

    #[test]
    fn test_fractions_summing_past_one_rejected() {
        let err = StraightSplit::new(0.9, 0.2).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_negative_fraction_rejected() {
        assert!(StraightSplit::new(-0.1, 0.0).is_err());
        assert!(StraightSplit::new(0.5, -0.2).is_err());
    }

    #[test]
    fn test_nan_fraction_rejected() {
        assert!(StraightSplit::new(f64::NAN, 0.0).is_err());
    }
}
