//! Z-standardization.

use std::sync::Arc;

use polars::prelude::*;
use tracing::debug;

use super::map_partition;
use crate::error::Result;
use crate::types::Split;

/// Rescales each split to zero mean and unit variance, with statistics from
/// that split's training partition only.
///
/// Standard deviation uses one delta degree of freedom (sample std). A
/// zero-variance column divides by zero and propagates NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZStandardizer;

impl ZStandardizer {
    pub fn normalize(&self, splits: &[Split]) -> Result<Vec<Split>> {
        splits.iter().map(|split| self.normalize_split(split)).collect()
    }

    fn normalize_split(&self, split: &Split) -> Result<Split> {
        let train = split.train.rows();
        let stats: Vec<(f64, f64)> = train
            .get_columns()
            .iter()
            .map(|col| {
                let ca = col.as_materialized_series().f64().expect("f64 table");
                (
                    ca.mean().unwrap_or(f64::NAN),
                    ca.std(1).unwrap_or(f64::NAN),
                )
            })
            .collect();
        debug!(columns = stats.len(), "z-standardizing split");
        let rescale = |col: usize, x: f64| (x - stats[col].0) / stats[col].1;
        Ok(Split {
            parent: Arc::clone(&split.parent),
            train: map_partition(&split.train, rescale)?,
            validation: map_partition(&split.validation, rescale)?,
            test: map_partition(&split.test, rescale)?,
        })
    }
}
