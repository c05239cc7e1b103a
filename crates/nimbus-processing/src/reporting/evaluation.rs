//! Ground-truth versus model-fit report tables.

use std::fs::File;
use std::path::Path;

use chrono::Local;
use polars::prelude::*;
use tracing::info;

use super::Forecaster;
use crate::error::{ProcessingError, Result};
use crate::types::{SampleSet, TimeseriesData};

/// Builds fit reports by running a trained model over stored sample sets.
pub struct EvaluationReporter<'a> {
    model: &'a dyn Forecaster,
}

impl<'a> EvaluationReporter<'a> {
    pub fn new(model: &'a dyn Forecaster) -> Self {
        Self { model }
    }

    /// Pair ground truth with predictions across every split's sample sets.
    ///
    /// Report rows carry a `row` column with the parent row index of each
    /// label timestep, then one column per output (ground truth) and one
    /// `<output>_fit` column per output (prediction). A single-step output
    /// yields exactly one row per sample; a multi-step label window
    /// contributes one row per timestep.
    pub fn report(
        &self,
        series: &[TimeseriesData],
        training: bool,
        testing: bool,
    ) -> Result<EvaluationReport> {
        let mut training_frames = Vec::new();
        let mut testing_frames = Vec::new();
        for data in series {
            if training {
                training_frames.push(self.fit_frame(&data.training, &data.output_columns)?);
            }
            if testing {
                testing_frames.push(self.fit_frame(&data.test, &data.output_columns)?);
            }
        }
        Ok(EvaluationReport {
            training_fit: stack(training_frames)?,
            testing_fit: stack(testing_frames)?,
            generated_at: Local::now().to_rfc3339(),
        })
    }

    fn fit_frame(&self, samples: &SampleSet, output_columns: &[String]) -> Result<DataFrame> {
        let predictions = self.model.predict(samples)?;
        if predictions.len() != samples.len() {
            return Err(ProcessingError::PredictionFailed(format!(
                "expected {} prediction rows, got {}",
                samples.len(),
                predictions.len()
            )));
        }
        let (steps, features) = samples.label_shape().unwrap_or((0, output_columns.len()));
        let label_len = steps * features;

        let mut rows: Vec<u64> = Vec::new();
        let mut truth: Vec<Vec<f64>> = vec![Vec::new(); features];
        let mut fit: Vec<Vec<f64>> = vec![Vec::new(); features];
        for (i, prediction) in predictions.iter().enumerate() {
            if prediction.len() != label_len {
                return Err(ProcessingError::PredictionFailed(format!(
                    "prediction row of length {} does not match label length {}",
                    prediction.len(),
                    label_len
                )));
            }
            let labels = &samples.labels()[i];
            let label_rows = &samples.label_rows()[i];
            for step in 0..steps {
                rows.push((label_rows.start + step) as u64);
                for feature in 0..features {
                    truth[feature].push(labels[step * features + feature]);
                    fit[feature].push(prediction[step * features + feature]);
                }
            }
        }

        let mut columns: Vec<Column> =
            vec![Series::new("row".into(), rows).into_column()];
        for (feature, name) in output_columns.iter().enumerate() {
            columns.push(
                Series::new(name.as_str().into(), std::mem::take(&mut truth[feature]))
                    .into_column(),
            );
        }
        for (feature, name) in output_columns.iter().enumerate() {
            columns.push(
                Series::new(
                    format!("{name}_fit").as_str().into(),
                    std::mem::take(&mut fit[feature]),
                )
                .into_column(),
            );
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Vertically stack per-split frames; `None` when nothing was requested.
fn stack(frames: Vec<DataFrame>) -> Result<Option<DataFrame>> {
    let mut iter = frames.into_iter();
    let Some(mut acc) = iter.next() else {
        return Ok(None);
    };
    for frame in iter {
        acc = acc.vstack(&frame)?;
    }
    Ok(Some(acc))
}

/// The training-fit and test-fit tables produced by a report call.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub training_fit: Option<DataFrame>,
    pub testing_fit: Option<DataFrame>,
    pub generated_at: String,
}

impl EvaluationReport {
    /// Persist the requested reports as CSV files suffixed
    /// `_training_report` and `_testing_report`.
    pub fn save(&self, prefix: impl AsRef<Path>) -> Result<()> {
        let prefix = prefix.as_ref();
        if let Some(frame) = &self.training_fit {
            write_csv(frame, &suffixed(prefix, "_training_report.csv"))?;
        }
        if let Some(frame) = &self.testing_fit {
            write_csv(frame, &suffixed(prefix, "_testing_report.csv"))?;
        }
        Ok(())
    }
}

fn suffixed(prefix: &Path, suffix: &str) -> std::path::PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(suffix);
    std::path::PathBuf::from(name)
}

fn write_csv(frame: &DataFrame, path: &Path) -> Result<()> {
    info!(path = %path.display(), rows = frame.height(), "writing report");
    let file = File::create(path)?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut frame.clone())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SampleWindow;

    /// Echoes the last value of each input window for every label slot.
    struct LastValueModel;

    impl Forecaster for LastValueModel {
        fn predict(&self, inputs: &SampleSet) -> Result<Vec<Vec<f64>>> {
            let (steps, features) = inputs.label_shape().unwrap_or((0, 0));
            Ok(inputs
                .inputs()
                .iter()
                .map(|window| {
                    let last = window.last().copied().unwrap_or(f64::NAN);
                    vec![last; steps * features]
                })
                .collect())
        }
    }

    fn sample_data() -> TimeseriesData {
        let mut data = TimeseriesData::new(vec!["t_mean".to_string()], 1);
        for i in 0..3u64 {
            let start = i as usize;
            data.training
                .push(
                    SampleWindow {
                        values: vec![start as f64, start as f64 + 1.0],
                        shape: (2, 1),
                        rows: start..start + 2,
                    },
                    SampleWindow {
                        values: vec![start as f64 + 2.0],
                        shape: (1, 1),
                        rows: start + 2..start + 3,
                    },
                )
                .unwrap();
        }
        data
    }

    #[test]
    fn test_report_columns_and_rows() {
        let data = sample_data();
        let report = EvaluationReporter::new(&LastValueModel)
            .report(std::slice::from_ref(&data), true, true)
            .unwrap();

        let training = report.training_fit.as_ref().unwrap();
        let names: Vec<String> = training
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, vec!["row", "t_mean", "t_mean_fit"]);
        // One row per sample for a single-step output.
        assert_eq!(training.height(), 3);

        // Empty test sample set still yields an (empty) frame.
        let testing = report.testing_fit.as_ref().unwrap();
        assert_eq!(testing.height(), 0);
    }

    #[test]
    fn test_report_pairs_truth_with_predictions() {
        let data = sample_data();
        let report = EvaluationReporter::new(&LastValueModel)
            .report(std::slice::from_ref(&data), true, false)
            .unwrap();
        let training = report.training_fit.unwrap();

        let rows = training.column("row").unwrap().as_materialized_series().u64().unwrap();
        assert_eq!(rows.get(0), Some(2));
        let truth = training.column("t_mean").unwrap().as_materialized_series().f64().unwrap();
        assert_eq!(truth.get(0), Some(2.0));
        // The last-value model predicts the final input value, 1.0.
        let fit = training.column("t_mean_fit").unwrap().as_materialized_series().f64().unwrap();
        assert_eq!(fit.get(0), Some(1.0));

        assert!(report.testing_fit.is_none());
    }

    #[test]
    fn test_prediction_count_mismatch_rejected() {
        struct ShortModel;
        impl Forecaster for ShortModel {
            fn predict(&self, _inputs: &SampleSet) -> Result<Vec<Vec<f64>>> {
                Ok(vec![])
            }
        }
        let data = sample_data();
        let err = EvaluationReporter::new(&ShortModel)
            .report(std::slice::from_ref(&data), true, false)
            .unwrap_err();
        assert!(matches!(err, ProcessingError::PredictionFailed(_)));
    }
}
