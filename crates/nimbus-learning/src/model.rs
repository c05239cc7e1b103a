//! Trained forecaster for inference and serialization.
//!
//! [`LinearForecaster`] is a linear readout over a flattened input window:
//! one weight row and bias per label element. It is created by
//! [`Trainer::train()`](crate::Trainer::train) or loaded from disk with
//! [`LinearForecaster::load()`].
//!
//! The model implements
//! [`nimbus_processing::Forecaster`], so it plugs directly into the
//! evaluation reporter.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use nimbus_processing::{Forecaster, ProcessingError, SampleSet};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LearningError, Result};

/// A trained linear forecast model ready for inference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearForecaster {
    /// One weight row per label element, each of input length.
    weights: Vec<Vec<f64>>,
    /// One bias per label element.
    bias: Vec<f64>,
    input_len: usize,
    output_len: usize,
}

impl LinearForecaster {
    /// Zero-initialized model for the given flattened window lengths.
    pub(crate) fn zeroed(input_len: usize, output_len: usize) -> Self {
        Self {
            weights: vec![vec![0.0; input_len]; output_len],
            bias: vec![0.0; output_len],
            input_len,
            output_len,
        }
    }

    /// Flattened input window length the model expects.
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// Flattened label length the model produces.
    pub fn output_len(&self) -> usize {
        self.output_len
    }

    /// Predict one flattened label row for a single flattened input window.
    pub fn predict_row(&self, window: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| b + row.iter().zip(window).map(|(w, x)| w * x).sum::<f64>())
            .collect()
    }

    pub(crate) fn apply_gradient_step(
        &mut self,
        inputs: &[Vec<f64>],
        labels: &[Vec<f64>],
        learning_rate: f64,
    ) {
        let n = inputs.len() as f64;
        for j in 0..self.output_len {
            let mut grad_bias = 0.0;
            let mut grad_weights = vec![0.0; self.input_len];
            for (window, label) in inputs.iter().zip(labels) {
                let residual = self.predict_row_single(window, j) - label[j];
                grad_bias += residual;
                for (g, x) in grad_weights.iter_mut().zip(window) {
                    *g += residual * x;
                }
            }
            self.bias[j] -= learning_rate * 2.0 * grad_bias / n;
            for (w, g) in self.weights[j].iter_mut().zip(&grad_weights) {
                *w -= learning_rate * 2.0 * g / n;
            }
        }
    }

    fn predict_row_single(&self, window: &[f64], output: usize) -> f64 {
        self.bias[output]
            + self.weights[output]
                .iter()
                .zip(window)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }

    /// Persist the model as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "saving model");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a model previously written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LearningError::ModelNotFound {
                path: path.display().to_string(),
            });
        }
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl Forecaster for LinearForecaster {
    fn predict(&self, inputs: &SampleSet) -> nimbus_processing::ProcessingResult<Vec<Vec<f64>>> {
        inputs
            .inputs()
            .iter()
            .map(|window| {
                if window.len() != self.input_len {
                    return Err(ProcessingError::PredictionFailed(format!(
                        "input window of length {} does not match model input length {}",
                        window.len(),
                        self.input_len
                    )));
                }
                Ok(self.predict_row(window))
            })
            .collect()
    }
}
