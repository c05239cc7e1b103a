//! Partition rescaling.
//!
//! Normalizers compute per-column statistics from a split's **training
//! partition only** and apply them to all three partitions of that split.
//! Splits are normalized independently; statistics never leak across splits
//! or into rows outside the training partition.
//!
//! Both normalizers are pure: they return new [`Split`] values with rebuilt
//! partition frames and leave their inputs untouched. Row ranges are
//! unchanged, and the parent table is never rescaled, so label windows read
//! from the parent stay in the original units.
//!
//! A zero-variance or zero-range column produces NaN/±inf values rather than
//! an error; nothing downstream silently corrects the data, so the model fit
//! fails loudly instead.

mod minmax;
mod zscore;

pub use minmax::MinMaxNormalizer;
pub use zscore::ZStandardizer;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Partition, Split};

/// Normalization strategy selected in the pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum NormalizeStrategy {
    /// Z-standardization from training mean and standard deviation.
    ZScore,
    /// Min-max rescaling of training range onto `[min, max]`.
    MinMax { min: f64, max: f64 },
}

/// Apply the configured strategy to every split.
pub fn apply(strategy: NormalizeStrategy, splits: &[Split]) -> Result<Vec<Split>> {
    match strategy {
        NormalizeStrategy::ZScore => ZStandardizer.normalize(splits),
        NormalizeStrategy::MinMax { min, max } => {
            MinMaxNormalizer::new((min, max)).normalize(splits)
        }
    }
}

/// Rebuild a partition frame by mapping each column's values, keeping the
/// partition's row offset.
pub(crate) fn map_partition(
    part: &Partition,
    mut map: impl FnMut(usize, f64) -> f64,
) -> Result<Partition> {
    let columns = part
        .rows()
        .get_columns()
        .iter()
        .enumerate()
        .map(|(col_idx, col)| {
            let ca = col.as_materialized_series().f64().expect("f64 table");
            let values: Vec<Option<f64>> = ca
                .into_iter()
                .map(|v| v.map(|x| map(col_idx, x)))
                .collect();
            Series::new(col.name().clone(), values).into_column()
        })
        .collect::<Vec<Column>>();
    Ok(Partition::from_frame(DataFrame::new(columns)?, part.offset()))
}
