//! End-to-end tests: pipeline output through fit, predict, and reporting.

use nimbus_learning::{CancellationToken, LinearForecaster, Trainer, TrainingConfig};
use nimbus_processing::{
    EvaluationReporter, Forecaster, ForecastPipeline, ImputeStrategy, PipelineConfig,
    SplitStrategy, WindowSpec,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;

/// Ramp table the linear model can fit exactly: col1 = col0 + 20.
fn weather_frame(n: usize) -> DataFrame {
    let col0: Vec<f64> = (1..=n).map(|v| v as f64).collect();
    let col1: Vec<f64> = (1..=n).map(|v| (v + 20) as f64).collect();
    df!["t_mean" => col0, "humidity" => col1].unwrap()
}

fn pipeline_output(n: usize) -> nimbus_processing::PipelineOutput {
    let config = PipelineConfig::builder()
        .impute(ImputeStrategy::Zero)
        .split(SplitStrategy::Straight {
            train_fraction: 0.8,
            validation_fraction: 0.1,
        })
        .window(WindowSpec {
            input_columns: vec!["t_mean".to_string(), "humidity".to_string()],
            output_columns: vec!["t_mean".to_string()],
            input_width: 2,
            output_width: 1,
            stride: 1,
            label_offset: 1,
        })
        .build()
        .unwrap();
    ForecastPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(&weather_frame(n))
        .unwrap()
}

#[test]
fn test_fit_over_pipeline_output() {
    let output = pipeline_output(40);
    let model = Trainer::builder()
        .config(
            TrainingConfig::builder()
                .epochs(50)
                .learning_rate(0.0001)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
        .train(&output.timeseries)
        .unwrap();
    assert_eq!(model.input_len(), 4);
    assert_eq!(model.output_len(), 1);
}

#[test]
fn test_validation_metrics_present_when_split_has_validation() {
    let output = pipeline_output(40);
    assert!(output.timeseries[0].validation.len() > 0);
    let saw_val = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let saw_val_clone = saw_val.clone();
    Trainer::builder()
        .config(TrainingConfig::builder().epochs(3).learning_rate(0.0001).build().unwrap())
        .on_epoch(move |update| {
            if update.metrics.contains_key("val_loss") && update.metrics.contains_key("val_mae") {
                saw_val_clone.store(true, std::sync::atomic::Ordering::SeqCst);
            }
        })
        .build()
        .unwrap()
        .train(&output.timeseries)
        .unwrap();
    assert!(saw_val.load(std::sync::atomic::Ordering::SeqCst));
}

#[test]
fn test_cancelled_fit_returns_no_model() {
    let output = pipeline_output(40);
    let token = CancellationToken::new();
    token.cancel();
    let err = Trainer::builder()
        .cancellation_token(token)
        .build()
        .unwrap()
        .train(&output.timeseries)
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn test_save_load_round_trip_predicts_identically() {
    let output = pipeline_output(40);
    let model = Trainer::builder()
        .config(TrainingConfig::builder().epochs(20).learning_rate(0.0001).build().unwrap())
        .build()
        .unwrap()
        .train(&output.timeseries)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forecaster.json");
    model.save(&path).unwrap();
    let loaded = LinearForecaster::load(&path).unwrap();
    assert_eq!(model, loaded);

    let samples = &output.timeseries[0].test;
    assert_eq!(
        model.predict(samples).unwrap(),
        loaded.predict(samples).unwrap()
    );
}

#[test]
fn test_report_from_trained_model() {
    let output = pipeline_output(40);
    let model = Trainer::builder()
        .config(TrainingConfig::builder().epochs(30).learning_rate(0.0001).build().unwrap())
        .build()
        .unwrap()
        .train(&output.timeseries)
        .unwrap();

    let report = EvaluationReporter::new(&model)
        .report(&output.timeseries, true, true)
        .unwrap();
    let training = report.training_fit.as_ref().unwrap();
    let names: Vec<String> = training
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, vec!["row", "t_mean", "t_mean_fit"]);
    assert_eq!(training.height(), output.timeseries[0].training.len());

    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("weather");
    report.save(&prefix).unwrap();
    assert!(dir.path().join("weather_training_report.csv").exists());
    assert!(dir.path().join("weather_testing_report.csv").exists());
}
