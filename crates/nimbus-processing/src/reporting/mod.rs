//! Model-fit evaluation reporting.
//!
//! The reporter pairs the ground-truth labels stored in each sample set with
//! the predictions of a trained model, producing one tabular report for the
//! training fit and one for the test fit.

mod evaluation;

pub use evaluation::{EvaluationReport, EvaluationReporter};

use crate::error::Result;
use crate::types::SampleSet;

/// The predict half of the model-fit boundary.
///
/// The pipeline does not define the model's internals; anything that can map
/// a sample set to one prediction row per sample (row length equal to the
/// set's flattened label length) can be evaluated and reported against.
pub trait Forecaster {
    fn predict(&self, inputs: &SampleSet) -> Result<Vec<Vec<f64>>>;
}
