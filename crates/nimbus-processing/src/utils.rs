//! Shared utilities for the forecast data pipeline.

use polars::prelude::*;

use crate::error::{ProcessingError, Result};

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Names of the numeric columns of a frame, in frame order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Cast every column of the frame to Float64.
///
/// The pipeline operates on Float64 throughout; the imputer applies this at
/// the entry of the pipeline so later stages can assume the dtype.
pub fn to_f64_table(df: &DataFrame) -> Result<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(|col| {
            col.as_materialized_series()
                .cast(&DataType::Float64)
                .map(|s| s.into_column())
        })
        .collect::<PolarsResult<Vec<Column>>>()?;
    Ok(DataFrame::new(columns)?)
}

/// Borrow a column as a Float64 chunked array.
pub fn f64_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Float64Chunked> {
    let column = df
        .column(name)
        .map_err(|_| ProcessingError::ColumnNotFound(name.to_string()))?;
    Ok(column.as_materialized_series().f64()?)
}

/// Materialize a row-major window of values from the named columns.
///
/// Null cells surface as NaN.
pub fn window_values(
    df: &DataFrame,
    columns: &[String],
    start: usize,
    len: usize,
) -> Result<Vec<f64>> {
    let mut cas = Vec::with_capacity(columns.len());
    for name in columns {
        cas.push(f64_column(df, name)?);
    }
    let mut values = Vec::with_capacity(len * cas.len());
    for row in start..start + len {
        for ca in &cas {
            values.push(ca.get(row).unwrap_or(f64::NAN));
        }
    }
    Ok(values)
}
