//! Expanding window splits.

use std::sync::Arc;

use polars::prelude::DataFrame;
use tracing::debug;

use super::make_split;
use crate::error::{ProcessingError, Result};
use crate::types::Split;

/// Grows the training partition from the start of the table while the
/// validation/test tail walks forward.
///
/// Unlike [`RollingSplit`](super::RollingSplit), the training partition
/// always starts at row 0 and gains `expansion_rate` rows per step; only the
/// `validation | gap | test` tail has a fixed width.
///
/// Overflow is strict: the minimum window (initial training size plus tail)
/// must be strictly smaller than the table, so a table the window exactly
/// covers is rejected. The `gap` caveat of the rolling splitter applies here
/// too.
#[derive(Debug, Clone)]
pub struct ExpandingSplit {
    train_size: usize,
    test_size: usize,
    validation_size: usize,
    expansion_rate: usize,
    gap: usize,
}

impl ExpandingSplit {
    pub fn new(
        train_size: usize,
        test_size: usize,
        validation_size: usize,
        expansion_rate: usize,
        gap: usize,
    ) -> Result<Self> {
        if expansion_rate == 0 {
            return Err(ProcessingError::InvalidConfiguration(
                "expanding split expansion rate must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            train_size,
            test_size,
            validation_size,
            expansion_rate,
            gap,
        })
    }

    /// Width of the fixed tail that follows the training partition.
    fn tail(&self) -> usize {
        self.validation_size + self.test_size + self.gap
    }

    pub fn gap(&self) -> usize {
        self.gap
    }

    /// Errors with [`ProcessingError::WindowOverflow`] when the minimum
    /// window is not strictly smaller than the table.
    pub fn split(&self, data: &Arc<DataFrame>) -> Result<Vec<Split>> {
        let n = data.height();
        let window = self.train_size + self.tail();
        if window >= n {
            return Err(ProcessingError::WindowOverflow { window, rows: n });
        }
        let mut splits = Vec::new();
        let mut train_end = self.train_size;
        while train_end + self.tail() <= n {
            let val_end = train_end + self.validation_size;
            splits.push(make_split(
                data,
                (0, train_end),
                (train_end, self.validation_size),
                (val_end + self.gap, self.test_size),
            ));
            train_end += self.expansion_rate;
        }
        debug!(
            rows = n,
            window,
            expansion_rate = self.expansion_rate,
            splits = splits.len(),
            "expanding split"
        );
        Ok(splits)
    }
}
