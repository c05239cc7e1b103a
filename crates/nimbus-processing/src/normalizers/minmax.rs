//! Min-max rescaling.

use std::sync::Arc;

use polars::prelude::*;
use tracing::debug;

use super::map_partition;
use crate::error::Result;
use crate::types::Split;

/// Rescales each split onto a target range, with the per-column minimum and
/// maximum taken from that split's training partition only.
///
/// The transform is `a + (x - min) * (b - a) / (max - min)` for a target
/// range `(a, b)`. A constant column has `max == min` and divides by zero,
/// propagating ±inf/NaN.
#[derive(Debug, Clone, Copy)]
pub struct MinMaxNormalizer {
    a: f64,
    b: f64,
}

impl Default for MinMaxNormalizer {
    fn default() -> Self {
        Self::new((0.0, 1.0))
    }
}

impl MinMaxNormalizer {
    pub fn new(scale_range: (f64, f64)) -> Self {
        Self {
            a: scale_range.0,
            b: scale_range.1,
        }
    }

    pub fn normalize(&self, splits: &[Split]) -> Result<Vec<Split>> {
        splits.iter().map(|split| self.normalize_split(split)).collect()
    }

    fn normalize_split(&self, split: &Split) -> Result<Split> {
        let train = split.train.rows();
        let ranges: Vec<(f64, f64)> = train
            .get_columns()
            .iter()
            .map(|col| {
                let ca = col.as_materialized_series().f64().expect("f64 table");
                (
                    ca.min().unwrap_or(f64::NAN),
                    ca.max().unwrap_or(f64::NAN),
                )
            })
            .collect();
        debug!(columns = ranges.len(), a = self.a, b = self.b, "min-max rescaling split");
        let span = self.b - self.a;
        let rescale = |col: usize, x: f64| {
            let (min, max) = ranges[col];
            self.a + (x - min) * span / (max - min)
        };
        Ok(Split {
            parent: Arc::clone(&split.parent),
            train: map_partition(&split.train, rescale)?,
            validation: map_partition(&split.validation, rescale)?,
            test: map_partition(&split.test, rescale)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitters::StraightSplit;

    fn make_splits(values: Vec<f64>) -> Vec<Split> {
        let df = Arc::new(polars::df!["col0" => values].unwrap());
        StraightSplit::new(0.5, 0.0).unwrap().split(&df).unwrap()
    }

    fn train_values(split: &Split) -> Vec<f64> {
        split
            .train
            .rows()
            .column("col0")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn test_training_partition_spans_unit_range() {
        let splits = make_splits(vec![2.0, 4.0, 6.0, 8.0, 1.0, 9.0]);
        let normalized = MinMaxNormalizer::default().normalize(&splits).unwrap();
        let values = train_values(&normalized[0]);
        assert_eq!(values.first().copied(), Some(0.0));
        assert_eq!(values.last().copied(), Some(1.0));
    }

    #[test]
    fn test_custom_scale_range() {
        let splits = make_splits(vec![0.0, 10.0, 5.0, 20.0]);
        let normalized = MinMaxNormalizer::new((-1.0, 1.0)).normalize(&splits).unwrap();
        let values = train_values(&normalized[0]);
        assert_eq!(values, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_test_partition_may_leave_range() {
        // Training range is [2, 4]; the test row 8.0 maps past 1.0.
        let splits = make_splits(vec![2.0, 4.0, 8.0, 3.0]);
        let normalized = MinMaxNormalizer::default().normalize(&splits).unwrap();
        let test_value = normalized[0]
            .test
            .rows()
            .column("col0")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .get(0)
            .unwrap();
        assert_eq!(test_value, 3.0);
    }

    #[test]
    fn test_constant_column_propagates_non_finite() {
        let splits = make_splits(vec![5.0, 5.0, 5.0, 6.0]);
        let normalized = MinMaxNormalizer::default().normalize(&splits).unwrap();
        let test_value = normalized[0]
            .test
            .rows()
            .column("col0")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .get(0)
            .unwrap();
        assert!(!test_value.is_finite());
    }
}
