//! Core data containers shared by the pipeline stages.
//!
//! A [`Split`] is one {train, validation, test} partitioning of a parent
//! table. A [`SampleSet`] accumulates the paired (input, label) windows the
//! transformer slides out of a partition, and [`TimeseriesData`] groups the
//! three sample sets produced for a single split.

use std::ops::Range;
use std::sync::Arc;

use polars::prelude::*;

use crate::error::{ProcessingError, Result};

/// One contiguous run of parent-table rows.
///
/// The partition keeps its starting position in the parent so that later
/// stages can translate partition-relative row indices back into parent
/// coordinates (the window transformer reads label windows from the parent).
#[derive(Debug, Clone)]
pub struct Partition {
    rows: DataFrame,
    offset: usize,
}

impl Partition {
    /// Slice `len` rows out of `parent` starting at `offset`.
    ///
    /// Polars clamps slices that reach past the end of the frame, so the
    /// resulting partition may be shorter than `len` near the table tail.
    pub(crate) fn slice(parent: &DataFrame, offset: usize, len: usize) -> Self {
        Self {
            rows: parent.slice(offset as i64, len),
            offset,
        }
    }

    /// Wrap an already-materialized frame, keeping an existing offset.
    ///
    /// Used by the normalizers, which rebuild partition frames with rescaled
    /// values but leave the row ranges unchanged.
    pub(crate) fn from_frame(rows: DataFrame, offset: usize) -> Self {
        Self { rows, offset }
    }

    pub fn rows(&self) -> &DataFrame {
        &self.rows
    }

    /// First row position of this partition within the parent table.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.rows.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One {train, validation, test} partitioning of a table plus a reference to
/// the full parent table.
///
/// The three partitions are disjoint, contiguous row ranges of `parent`;
/// validation may be empty. The parent reference is used by the window
/// transformer to fetch label slices that may lie just past a partition's own
/// rows but within the parent.
#[derive(Debug, Clone)]
pub struct Split {
    pub parent: Arc<DataFrame>,
    pub train: Partition,
    pub validation: Partition,
    pub test: Partition,
}

impl Split {
    pub fn has_validation(&self) -> bool {
        !self.validation.is_empty()
    }
}

/// A window of values cut from a table, with its originating row range.
///
/// `values` is row-major: `shape.0` rows of `shape.1` features each.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    pub values: Vec<f64>,
    pub shape: (usize, usize),
    pub rows: Range<usize>,
}

/// Append-only accumulator of paired (input, label) samples.
///
/// The first append fixes the input and label shapes; every subsequent append
/// must match them. A single-timestep, single-feature label window degenerates
/// to a length-1 row, which is the flattened form downstream consumers expect.
/// Sample sets are never mutated after the transform that filled them.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    input_shape: Option<(usize, usize)>,
    label_shape: Option<(usize, usize)>,
    inputs: Vec<Vec<f64>>,
    labels: Vec<Vec<f64>>,
    input_rows: Vec<Range<usize>>,
    label_rows: Vec<Range<usize>>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one (input, label) pair.
    ///
    /// Errors with [`ProcessingError::ShapeMismatch`] when a window does not
    /// match the shape established by the first append.
    pub fn push(&mut self, input: SampleWindow, label: SampleWindow) -> Result<()> {
        match self.input_shape {
            None => self.input_shape = Some(input.shape),
            Some(expected) if expected != input.shape => {
                return Err(ProcessingError::ShapeMismatch {
                    expected,
                    got: input.shape,
                });
            }
            Some(_) => {}
        }
        match self.label_shape {
            None => self.label_shape = Some(label.shape),
            Some(expected) if expected != label.shape => {
                return Err(ProcessingError::ShapeMismatch {
                    expected,
                    got: label.shape,
                });
            }
            Some(_) => {}
        }
        self.inputs.push(input.values);
        self.labels.push(label.values);
        self.input_rows.push(input.rows);
        self.label_rows.push(label.rows);
        Ok(())
    }

    /// Number of samples collected.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Flattened row-major input windows, one per sample.
    pub fn inputs(&self) -> &[Vec<f64>] {
        &self.inputs
    }

    /// Flattened row-major label windows, one per sample.
    pub fn labels(&self) -> &[Vec<f64>] {
        &self.labels
    }

    /// (rows, features) of a single input window, once established.
    pub fn input_shape(&self) -> Option<(usize, usize)> {
        self.input_shape
    }

    /// (rows, features) of a single label window, once established.
    pub fn label_shape(&self) -> Option<(usize, usize)> {
        self.label_shape
    }

    /// Originating parent row range of each input window.
    pub fn input_rows(&self) -> &[Range<usize>] {
        &self.input_rows
    }

    /// Originating parent row range of each label window.
    pub fn label_rows(&self) -> &[Range<usize>] {
        &self.label_rows
    }

    /// Concatenation of the originating input row ranges, used to align
    /// predictions with ground truth when reporting.
    pub fn index(&self) -> Vec<usize> {
        self.input_rows.iter().flat_map(|r| r.clone()).collect()
    }
}

/// The supervised samples produced for one [`Split`], one sample set per
/// partition, plus the output column names and the number of predicted steps.
#[derive(Debug, Clone)]
pub struct TimeseriesData {
    pub output_columns: Vec<String>,
    pub num_output_steps: usize,
    pub training: SampleSet,
    pub validation: SampleSet,
    pub test: SampleSet,
}

impl TimeseriesData {
    pub fn new(output_columns: Vec<String>, num_output_steps: usize) -> Self {
        Self {
            output_columns,
            num_output_steps,
            training: SampleSet::new(),
            validation: SampleSet::new(),
            test: SampleSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(values: Vec<f64>, shape: (usize, usize), rows: Range<usize>) -> SampleWindow {
        SampleWindow { values, shape, rows }
    }

    #[test]
    fn test_partition_slice_clamps() {
        let df = df!["a" => [1.0, 2.0, 3.0]].unwrap();
        let part = Partition::slice(&df, 2, 5);
        assert_eq!(part.len(), 1);
        assert_eq!(part.offset(), 2);
    }

    #[test]
    fn test_first_push_establishes_shapes() {
        let mut set = SampleSet::new();
        set.push(
            window(vec![1.0, 2.0], (2, 1), 0..2),
            window(vec![3.0], (1, 1), 2..3),
        )
        .unwrap();
        assert_eq!(set.input_shape(), Some((2, 1)));
        assert_eq!(set.label_shape(), Some((1, 1)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_mismatched_push_rejected() {
        let mut set = SampleSet::new();
        set.push(
            window(vec![1.0, 2.0], (2, 1), 0..2),
            window(vec![3.0], (1, 1), 2..3),
        )
        .unwrap();
        let err = set
            .push(
                window(vec![1.0, 2.0, 3.0], (3, 1), 0..3),
                window(vec![4.0], (1, 1), 3..4),
            )
            .unwrap_err();
        assert!(matches!(err, ProcessingError::ShapeMismatch { .. }));
        // Nothing was appended by the failed push.
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_index_concatenates_input_ranges() {
        let mut set = SampleSet::new();
        set.push(
            window(vec![1.0, 2.0], (2, 1), 4..6),
            window(vec![3.0], (1, 1), 6..7),
        )
        .unwrap();
        set.push(
            window(vec![2.0, 3.0], (2, 1), 5..7),
            window(vec![4.0], (1, 1), 7..8),
        )
        .unwrap();
        assert_eq!(set.index(), vec![4, 5, 5, 6]);
    }
}
