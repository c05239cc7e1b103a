//! CLI entry point for the forecast data pipeline.

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use nimbus_processing::{
    ForecastPipeline, ImputeStrategy, NormalizeStrategy, PipelineConfig, SplitStrategy,
    WindowSpec, utils,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use tracing::{info, warn};

/// CLI-compatible imputation strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliImputeStrategy {
    /// Replace missing values with 0
    None,
    /// Replace missing values with the per-column mean
    Simple,
    /// Iteratively model each column from the others
    Iterative,
}

impl From<CliImputeStrategy> for ImputeStrategy {
    fn from(cli: CliImputeStrategy) -> Self {
        match cli {
            CliImputeStrategy::None => ImputeStrategy::Zero,
            CliImputeStrategy::Simple => ImputeStrategy::Mean,
            CliImputeStrategy::Iterative => ImputeStrategy::Iterative,
        }
    }
}

/// CLI-compatible split strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSplitStrategy {
    /// One sequential split by fractions
    Straight,
    /// Fixed-width sliding window
    Rolling,
    /// Training window growing from row 0
    Expanding,
}

/// CLI-compatible normalization strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliNormalizeStrategy {
    /// Keep raw values
    None,
    /// Z-standardization from training statistics
    Zscore,
    /// Min-max rescaling of the training range
    Minmax,
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Forecast data pipeline",
    long_about = "Splits tabular time-indexed data into train/validation/test windows and \
                  emits supervised (input, label) samples for sequence prediction.\n\n\
                  EXAMPLES:\n  \
                  # Straight 80/20 split, one-step-ahead samples\n  \
                  nimbus-processing -i weather.csv --output-columns t_mean\n\n  \
                  # Rolling windows with z-standardization\n  \
                  nimbus-processing -i weather.csv --split rolling --train-size 48 \\\n      \
                  --test-size 12 --normalize zscore --output-columns t_mean\n\n  \
                  # Preview the plan without transforming\n  \
                  nimbus-processing -i weather.csv --output-columns t_mean --dry-run"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long)]
    input: String,

    /// Missing-value strategy
    #[arg(long, value_enum, default_value_t = CliImputeStrategy::None)]
    impute: CliImputeStrategy,

    /// Split strategy
    #[arg(long, value_enum, default_value_t = CliSplitStrategy::Straight)]
    split: CliSplitStrategy,

    /// Training fraction (straight split)
    #[arg(long, default_value_t = 0.8)]
    train_fraction: f64,

    /// Validation fraction (straight split)
    #[arg(long, default_value_t = 0.0)]
    validation_fraction: f64,

    /// Training rows per window (rolling/expanding split)
    #[arg(long, default_value_t = 10)]
    train_size: usize,

    /// Test rows per window (rolling/expanding split)
    #[arg(long, default_value_t = 5)]
    test_size: usize,

    /// Validation rows per window (rolling/expanding split)
    #[arg(long, default_value_t = 0)]
    validation_size: usize,

    /// Row offset between window starts (rolling) or training growth per
    /// step (expanding)
    #[arg(long, default_value_t = 1)]
    stride: usize,

    /// Dead-zone rows between validation and test
    #[arg(long, default_value_t = 0)]
    gap: usize,

    /// Normalization strategy
    #[arg(long, value_enum, default_value_t = CliNormalizeStrategy::None)]
    normalize: CliNormalizeStrategy,

    /// Target range for min-max normalization
    #[arg(long, default_value_t = 0.0)]
    scale_min: f64,
    #[arg(long, default_value_t = 1.0)]
    scale_max: f64,

    /// Input columns (defaults to every numeric column)
    #[arg(long, value_delimiter = ',')]
    input_columns: Vec<String>,

    /// Output columns the model should predict
    #[arg(long, value_delimiter = ',', required = true)]
    output_columns: Vec<String>,

    /// Rows per input window
    #[arg(long, default_value_t = 1)]
    input_width: usize,

    /// Rows per label window
    #[arg(long, default_value_t = 1)]
    output_width: usize,

    /// Row offset between consecutive sample windows
    #[arg(long, default_value_t = 1)]
    window_stride: usize,

    /// Gap between input window end and label window, in rows
    #[arg(long, default_value_t = 1)]
    label_offset: usize,

    /// Validate the configuration and print the plan without transforming
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&args.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(args.input.clone().into()))
        .with_context(|| format!("failed to open {}", args.input))?
        .finish()
        .with_context(|| format!("failed to read {}", args.input))?;
    info!(rows = df.height(), columns = df.width(), "loaded {}", args.input);

    // Non-numeric columns are an upstream concern; keep only numeric ones.
    let numeric = utils::numeric_columns(&df);
    if numeric.is_empty() {
        bail!("{} contains no numeric columns", args.input);
    }
    if numeric.len() < df.width() {
        warn!(
            dropped = df.width() - numeric.len(),
            "ignoring non-numeric columns"
        );
    }
    let df = df.select(numeric.iter().map(String::as_str))?;

    let split = match args.split {
        CliSplitStrategy::Straight => SplitStrategy::Straight {
            train_fraction: args.train_fraction,
            validation_fraction: args.validation_fraction,
        },
        CliSplitStrategy::Rolling => SplitStrategy::Rolling {
            train_size: args.train_size,
            test_size: args.test_size,
            validation_size: args.validation_size,
            stride: args.stride,
            gap: args.gap,
        },
        CliSplitStrategy::Expanding => SplitStrategy::Expanding {
            train_size: args.train_size,
            test_size: args.test_size,
            validation_size: args.validation_size,
            expansion_rate: args.stride,
            gap: args.gap,
        },
    };

    let input_columns = if args.input_columns.is_empty() {
        numeric
    } else {
        args.input_columns
    };

    let mut builder = PipelineConfig::builder().impute(args.impute.into()).split(split);
    builder = match args.normalize {
        CliNormalizeStrategy::None => builder,
        CliNormalizeStrategy::Zscore => builder.normalize(NormalizeStrategy::ZScore),
        CliNormalizeStrategy::Minmax => builder.normalize(NormalizeStrategy::MinMax {
            min: args.scale_min,
            max: args.scale_max,
        }),
    };
    let config = builder
        .window(WindowSpec {
            input_columns,
            output_columns: args.output_columns,
            input_width: args.input_width,
            output_width: args.output_width,
            stride: args.window_stride,
            label_offset: args.label_offset,
        })
        .build()?;

    if args.dry_run {
        println!("Configuration is valid:");
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let mut pipeline = ForecastPipeline::builder().config(config);
    if !args.quiet {
        pipeline = pipeline.on_progress(|update| {
            println!("[{:>3.0}%] {}", update.progress * 100.0, update.message);
        });
    }
    let output = pipeline.build()?.process(&df)?;

    for warning in &output.warnings {
        warn!("{warning}");
    }
    println!("Produced {} split(s)", output.splits);
    for (i, series) in output.timeseries.iter().enumerate() {
        println!(
            "split {i}: train {} / validation {} / test {} samples (input {:?}, label {:?})",
            series.training.len(),
            series.validation.len(),
            series.test.len(),
            series.training.input_shape().unwrap_or((0, 0)),
            series.training.label_shape().unwrap_or((0, 0)),
        );
    }
    Ok(())
}
