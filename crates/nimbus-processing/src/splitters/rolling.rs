//! Fixed-width rolling window splits.

use std::sync::Arc;

use polars::prelude::DataFrame;
use tracing::debug;

use super::make_split;
use crate::error::{ProcessingError, Result};
use crate::types::Split;

/// Slides a fixed-width window over the table, producing one split per
/// admissible window start.
///
/// Each window is laid out as `train | validation | gap | test`; the `gap`
/// rows sit between validation and test and belong to no partition, enforcing
/// temporal separation.
///
/// A non-zero `gap` breaks the partition contiguity the window transformer
/// relies on for label lookups; the pipeline surfaces a warning for that
/// combination rather than changing either component's semantics.
#[derive(Debug, Clone)]
pub struct RollingSplit {
    train_size: usize,
    test_size: usize,
    validation_size: usize,
    stride: usize,
    gap: usize,
}

impl RollingSplit {
    pub fn new(
        train_size: usize,
        test_size: usize,
        validation_size: usize,
        stride: usize,
        gap: usize,
    ) -> Result<Self> {
        if stride == 0 {
            return Err(ProcessingError::InvalidConfiguration(
                "rolling split stride must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            train_size,
            test_size,
            validation_size,
            stride,
            gap,
        })
    }

    /// Total rows one window spans, gap included.
    pub fn window(&self) -> usize {
        self.train_size + self.validation_size + self.test_size + self.gap
    }

    pub fn gap(&self) -> usize {
        self.gap
    }

    /// Errors with [`ProcessingError::WindowOverflow`] when the window does
    /// not fit in the table.
    pub fn split(&self, data: &Arc<DataFrame>) -> Result<Vec<Split>> {
        let n = data.height();
        let window = self.window();
        if window > n {
            return Err(ProcessingError::WindowOverflow { window, rows: n });
        }
        let mut splits = Vec::new();
        let mut start = 0;
        while start + window <= n {
            let train_end = start + self.train_size;
            let val_end = train_end + self.validation_size;
            splits.push(make_split(
                data,
                (start, self.train_size),
                (train_end, self.validation_size),
                (val_end + self.gap, self.test_size),
            ));
            start += self.stride;
        }
        debug!(rows = n, window, stride = self.stride, splits = splits.len(), "rolling split");
        Ok(splits)
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
    fn test_unit_parameters_on_20_rows() {
        let splits = RollingSplit::new(1, 1, 1, 1, 1).unwrap().split(&frame(20)).unwrap();
        assert_eq!(splits.len(), 17);
        for split in &splits {
            assert_eq!(split.train.len(), 1);
            assert_eq!(split.validation.len(), 1);
            assert_eq!(split.test.len(), 1);
        }
        let last = splits.last().unwrap();
        assert_eq!(last.train.offset(), 16);
        // The gap row sits between validation and test.
        assert_eq!(last.validation.offset(), 17);
        assert_eq!(last.test.offset(), 19);
    }

    #[test]
    fn test_partitions_are_adjacent_without_gap() {
        let splits = RollingSplit::new(5, 1, 2, 1, 0).unwrap().split(&frame(20)).unwrap();
        assert_eq!(splits.len(), 13);
        let last = splits.last().unwrap();
        assert_eq!(last.train.offset(), 12);
        assert_eq!(last.train.len(), 5);
        assert_eq!(last.validation.offset(), 17);
        assert_eq!(last.test.offset(), 19);
    }

    #[test]
    fn test_stride_skips_window_starts() {
        let splits = RollingSplit::new(5, 1, 2, 3, 0).unwrap().split(&frame(20)).unwrap();
        assert_eq!(splits.len(), 5);
        assert_eq!(splits.last().unwrap().train.offset(), 12);
    }

    #[test]
    fn test_window_overflow() {
        let err = RollingSplit::new(15, 15, 0, 1, 0).unwrap().split(&frame(20)).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::WindowOverflow { window: 30, rows: 20 }
        ));
    }

    #[test]
    fn test_window_exactly_fits() {
        let splits = RollingSplit::new(15, 5, 0, 1, 0).unwrap().split(&frame(20)).unwrap();
        assert_eq!(splits.len(), 1);
    }

    #[test]
    fn test_zero_stride_rejected() {
        let err = RollingSplit::new(5, 5, 0, 0, 0).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidConfiguration(_)));
    }
}
