//! Constant and mean imputation.

use polars::prelude::*;

use crate::error::Result;

/// True when a cell counts as missing.
#[inline]
pub(crate) fn is_missing(value: Option<f64>) -> bool {
    match value {
        None => true,
        Some(v) => v.is_nan(),
    }
}

/// Replace every missing cell with a constant.
pub(crate) fn fill_constant(df: &DataFrame, fill: f64) -> Result<DataFrame> {
    rebuild(df, |_, _| fill)
}

/// Replace every missing cell with its column's mean of observed values.
///
/// A column with no observed values falls back to 0.0.
pub(crate) fn fill_mean(df: &DataFrame) -> Result<DataFrame> {
    let means: Vec<f64> = df
        .get_columns()
        .iter()
        .map(|col| {
            let ca = col.as_materialized_series().f64().expect("f64 table");
            let observed: Vec<f64> = ca.into_iter().flatten().filter(|v| !v.is_nan()).collect();
            if observed.is_empty() {
                0.0
            } else {
                observed.iter().sum::<f64>() / observed.len() as f64
            }
        })
        .collect();
    rebuild(df, |col_idx, _| means[col_idx])
}

/// Rebuild the frame, replacing missing cells via `fill(col_idx, row_idx)`.
fn rebuild(df: &DataFrame, fill: impl Fn(usize, usize) -> f64) -> Result<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .enumerate()
        .map(|(col_idx, col)| {
            let ca = col.as_materialized_series().f64().expect("f64 table");
            let values: Vec<f64> = ca
                .into_iter()
                .enumerate()
                .map(|(row_idx, value)| {
                    if is_missing(value) {
                        fill(col_idx, row_idx)
                    } else {
                        value.unwrap()
                    }
                })
                .collect();
            Series::new(col.name().clone(), values).into_column()
        })
        .collect::<Vec<Column>>();
    Ok(DataFrame::new(columns)?)
}
