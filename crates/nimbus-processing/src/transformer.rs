//! Supervised timeseries window transformer.
//!
//! Slides a window over each partition of each split to emit paired
//! (input, label) samples for sequence prediction. Input windows are cut from
//! the partition itself; label windows are read from the split's **parent**
//! table, anchored at the partition's offset. A label window near the end of
//! a training or validation partition may therefore legitimately reach past
//! the partition boundary into subsequent parent rows, which is what makes
//! continuous rolling prediction across the boundary possible. The lookup is
//! never confined to the partition.
//!
//! The test partition is stricter: iteration stops as soon as a label window
//! would extend past the partition, so every test label is fully contained in
//! held-out rows.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::types::{Partition, SampleSet, SampleWindow, Split, TimeseriesData};
use crate::utils;

/// Window geometry and column selection for the transformer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Columns fed to the model, in order.
    pub input_columns: Vec<String>,
    /// Columns the model predicts, in order.
    pub output_columns: Vec<String>,
    /// Rows per input window.
    pub input_width: usize,
    /// Rows per label window.
    pub output_width: usize,
    /// Row offset between consecutive window starts.
    pub stride: usize,
    /// Rows between the start of an input window and the end of its label
    /// window, counted from `input start + output_width`.
    pub label_offset: usize,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            input_columns: Vec::new(),
            output_columns: Vec::new(),
            input_width: 1,
            output_width: 1,
            stride: 1,
            label_offset: 1,
        }
    }
}

/// Turns splits into supervised (input, label) sample sets.
#[derive(Debug, Clone)]
pub struct WindowTransformer {
    spec: WindowSpec,
}

impl WindowTransformer {
    /// Errors with [`ProcessingError::InvalidConfiguration`] on degenerate
    /// geometry before any data is touched.
    pub fn new(spec: WindowSpec) -> Result<Self> {
        if spec.input_columns.is_empty() {
            return Err(ProcessingError::InvalidConfiguration(
                "window input_columns must not be empty".to_string(),
            ));
        }
        if spec.output_columns.is_empty() {
            return Err(ProcessingError::InvalidConfiguration(
                "window output_columns must not be empty".to_string(),
            ));
        }
        if spec.input_width == 0 || spec.output_width == 0 {
            return Err(ProcessingError::InvalidConfiguration(
                "window widths must be at least 1".to_string(),
            ));
        }
        if spec.stride == 0 {
            return Err(ProcessingError::InvalidConfiguration(
                "window stride must be at least 1".to_string(),
            ));
        }
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &WindowSpec {
        &self.spec
    }

    /// Total rows one (input, label) pair spans. Informational only.
    pub fn window_width(&self) -> usize {
        let reach = self.spec.output_width + self.spec.label_offset;
        self.spec.input_width + reach.saturating_sub(self.spec.input_width)
    }

    /// Transform every split, independently for each of its partitions.
    ///
    /// A label window that runs past the end of the parent table raises
    /// [`ProcessingError::TimeseriesWindowOverflow`] and aborts the whole
    /// call; no partial results are returned.
    pub fn transform(&self, splits: &[Split]) -> Result<Vec<TimeseriesData>> {
        debug!(
            splits = splits.len(),
            window_width = self.window_width(),
            "windowing splits"
        );
        splits.iter().map(|split| self.window_split(split)).collect()
    }

    fn window_split(&self, split: &Split) -> Result<TimeseriesData> {
        let mut series =
            TimeseriesData::new(self.spec.output_columns.clone(), self.spec.output_width);
        self.window_partition(split, &split.train, &mut series.training, false)?;
        self.window_partition(split, &split.validation, &mut series.validation, false)?;
        self.window_partition(split, &split.test, &mut series.test, true)?;
        Ok(series)
    }

    fn window_partition(
        &self,
        split: &Split,
        partition: &Partition,
        samples: &mut SampleSet,
        is_test: bool,
    ) -> Result<()> {
        let spec = &self.spec;
        let m = partition.len();
        let parent: &DataFrame = &split.parent;
        let parent_rows = parent.height();

        let mut idx = 0;
        while idx + spec.input_width <= m {
            let end = idx + spec.output_width + spec.label_offset;
            if is_test && end > m {
                // The last test label window must fit inside the partition.
                break;
            }
            let label_start = partition.offset() + end - spec.output_width;
            let label_end = partition.offset() + end;
            if label_end > parent_rows {
                return Err(ProcessingError::TimeseriesWindowOverflow {
                    start: label_start,
                    end: label_end,
                    rows: parent_rows,
                });
            }

            let input_start = partition.offset() + idx;
            let input = SampleWindow {
                values: utils::window_values(
                    partition.rows(),
                    &spec.input_columns,
                    idx,
                    spec.input_width,
                )?,
                shape: (spec.input_width, spec.input_columns.len()),
                rows: input_start..input_start + spec.input_width,
            };
            let label = SampleWindow {
                values: utils::window_values(
                    parent,
                    &spec.output_columns,
                    label_start,
                    spec.output_width,
                )?,
                shape: (spec.output_width, spec.output_columns.len()),
                rows: label_start..label_end,
            };
            samples.push(input, label)?;
            idx += spec.stride;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitters::StraightSplit;
    use std::sync::Arc;

    fn spec(input_width: usize, output_width: usize, stride: usize, label_offset: usize) -> WindowSpec {
        WindowSpec {
            input_columns: vec!["col0".to_string()],
            output_columns: vec!["col0".to_string()],
            input_width,
            output_width,
            stride,
            label_offset,
        }
    }

    fn splits(n: usize) -> Vec<Split> {
        let values: Vec<f64> = (1..=n).map(|v| v as f64).collect();
        let df = Arc::new(polars::df!["col0" => values].unwrap());
        StraightSplit::new(0.8, 0.0).unwrap().split(&df).unwrap()
    }

    #[test]
    fn test_empty_columns_rejected() {
        let mut bad = spec(1, 1, 1, 1);
        bad.input_columns.clear();
        assert!(WindowTransformer::new(bad).is_err());
    }

    #[test]
    fn test_window_width_formula() {
        let t = WindowTransformer::new(spec(3, 3, 1, 2)).unwrap();
        assert_eq!(t.window_width(), 5);
        let t = WindowTransformer::new(spec(5, 1, 1, 1)).unwrap();
        assert_eq!(t.window_width(), 5);
    }

    #[test]
    fn test_training_labels_reach_past_partition_boundary() {
        // 20 rows, train is rows [0, 16). The window starting at 15 has
        // end = 17, so its label is parent row 16, the first test row.
        let t = WindowTransformer::new(spec(1, 1, 1, 1)).unwrap();
        let data = t.transform(&splits(20)).unwrap();
        let training = &data[0].training;
        assert_eq!(training.len(), 16);
        let last = training.len() - 1;
        assert_eq!(training.labels()[last], vec![17.0]);
        assert_eq!(training.label_rows()[last], 16..17);
    }

    #[test]
    fn test_test_partition_stops_at_boundary() {
        // Test partition is rows [16, 20), values 17..=20. With width 1 and
        // offset 1 the window starting at idx 3 would need end = 5 > 4, so
        // only three samples are emitted and every label stays inside.
        let t = WindowTransformer::new(spec(1, 1, 1, 1)).unwrap();
        let data = t.transform(&splits(20)).unwrap();
        let test = &data[0].test;
        assert_eq!(test.len(), 3);
        assert_eq!(test.labels()[0], vec![18.0]);
        assert_eq!(test.labels()[2], vec![20.0]);
    }

    #[test]
    fn test_sample_count_formula_on_test_partition() {
        // m = 4, w = 2, s = 1: floor((4 - 2) / 1) + 1 = 3 starts, and the
        // label windows fit, so all three survive the test-partition rule.
        let t = WindowTransformer::new(spec(2, 1, 1, 1)).unwrap();
        let data = t.transform(&splits(20)).unwrap();
        assert_eq!(data[0].test.len(), 3);
    }

    #[test]
    fn test_parent_overflow_is_hard_error() {
        // Training rows [0, 16): the window starting at 15 needs parent rows
        // up to 15 + 5 + 1 = 21, past the 20-row parent.
        let t = WindowTransformer::new(spec(1, 5, 1, 1)).unwrap();
        let err = t.transform(&splits(20)).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::TimeseriesWindowOverflow { .. }
        ));
    }

    #[test]
    fn test_multi_step_labels_keep_window_shape() {
        let t = WindowTransformer::new(spec(3, 3, 1, 2)).unwrap();
        let data = t.transform(&splits(20)).unwrap();
        let training = &data[0].training;
        assert_eq!(training.label_shape(), Some((3, 1)));
        // First window: idx 0, end = 5, labels are parent rows [2, 5).
        assert_eq!(training.labels()[0], vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_stride_thins_samples() {
        let t = WindowTransformer::new(spec(2, 1, 3, 1)).unwrap();
        let data = t.transform(&splits(20)).unwrap();
        // Training m = 16, w = 2, s = 3: admissible starts are 0, 3, 6, 9, 12.
        let training = &data[0].training;
        assert_eq!(training.len(), 5);
        assert_eq!(training.input_rows()[1], 3..5);
    }
}
