//! Iterative imputation.
//!
//! Each column with missing cells is modeled as a linear function of the
//! other columns, fit on the rows where the column was observed. Missing
//! cells start from the column's most frequent observed value and are
//! refined over a bounded number of rounds, processing columns right to
//! left each round (a fixed, deterministic order).

use polars::prelude::*;
use tracing::debug;

use super::statistical::is_missing;
use crate::error::Result;

const CONVERGENCE_TOL: f64 = 1e-3;

pub(crate) fn impute(df: &DataFrame, max_iter: usize) -> Result<DataFrame> {
    let n_rows = df.height();
    let n_cols = df.width();

    // Column-major copy of the table plus the original missing mask.
    let mut matrix: Vec<Vec<f64>> = Vec::with_capacity(n_cols);
    let mut missing: Vec<Vec<bool>> = Vec::with_capacity(n_cols);
    for col in df.get_columns() {
        let ca = col.as_materialized_series().f64().expect("f64 table");
        let mask: Vec<bool> = ca.into_iter().map(is_missing).collect();
        let init = most_frequent(ca);
        let values: Vec<f64> = ca
            .into_iter()
            .enumerate()
            .map(|(row, v)| if mask[row] { init } else { v.unwrap() })
            .collect();
        matrix.push(values);
        missing.push(mask);
    }

    for round in 0..max_iter {
        let mut max_change = 0.0f64;
        // Right-to-left column order, fixed across rounds.
        for target in (0..n_cols).rev() {
            if !missing[target].iter().any(|&m| m) {
                continue;
            }
            let predictors: Vec<usize> = (0..n_cols).filter(|&j| j != target).collect();
            let observed_rows: Vec<usize> =
                (0..n_rows).filter(|&r| !missing[target][r]).collect();
            if observed_rows.is_empty() || predictors.is_empty() {
                continue;
            }
            let (coefficients, intercept) =
                fit_linear(&matrix, &predictors, target, &observed_rows);
            for row in 0..n_rows {
                if !missing[target][row] {
                    continue;
                }
                let mut pred = intercept;
                for (k, &j) in predictors.iter().enumerate() {
                    pred += coefficients[k] * matrix[j][row];
                }
                max_change = max_change.max((pred - matrix[target][row]).abs());
                matrix[target][row] = pred;
            }
        }
        if max_change < CONVERGENCE_TOL {
            debug!(round, max_change, "iterative imputation converged");
            break;
        }
    }

    let columns = df
        .get_columns()
        .iter()
        .zip(matrix)
        .map(|(col, values)| Series::new(col.name().clone(), values).into_column())
        .collect::<Vec<Column>>();
    Ok(DataFrame::new(columns)?)
}

/// Most frequent observed value of a column; ties break toward the smallest
/// value. Falls back to 0.0 for an all-missing column.
fn most_frequent(ca: &Float64Chunked) -> f64 {
    let mut observed: Vec<f64> = ca
        .into_iter()
        .filter(|v| !is_missing(*v))
        .map(|v| v.unwrap())
        .collect();
    if observed.is_empty() {
        return 0.0;
    }
    observed.sort_by(|a, b| a.partial_cmp(b).expect("no NaN after filter"));
    let mut best = observed[0];
    let mut best_count = 0usize;
    let mut run_value = observed[0];
    let mut run_count = 0usize;
    for &v in &observed {
        if v == run_value {
            run_count += 1;
        } else {
            run_value = v;
            run_count = 1;
        }
        if run_count > best_count {
            best = run_value;
            best_count = run_count;
        }
    }
    best
}

/// Per-predictor univariate slopes plus a shared intercept.
///
/// The same estimator the simple linear case of an iterative imputer uses:
/// slope_k = cov(x_k, y) / var(x_k) over the observed rows, intercept chosen
/// so the fit passes through the means.
fn fit_linear(
    matrix: &[Vec<f64>],
    predictors: &[usize],
    target: usize,
    rows: &[usize],
) -> (Vec<f64>, f64) {
    let n = rows.len() as f64;
    let y_mean = rows.iter().map(|&r| matrix[target][r]).sum::<f64>() / n;
    let x_means: Vec<f64> = predictors
        .iter()
        .map(|&j| rows.iter().map(|&r| matrix[j][r]).sum::<f64>() / n)
        .collect();

    let mut coefficients = Vec::with_capacity(predictors.len());
    for (k, &j) in predictors.iter().enumerate() {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for &r in rows {
            let xc = matrix[j][r] - x_means[k];
            numerator += xc * (matrix[target][r] - y_mean);
            denominator += xc * xc;
        }
        coefficients.push(if denominator > 1e-10 {
            numerator / denominator
        } else {
            0.0
        });
    }

    let intercept = y_mean
        - coefficients
            .iter()
            .zip(&x_means)
            .map(|(c, m)| c * m)
            .sum::<f64>();
    (coefficients, intercept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlated_column_recovered() {
        // humidity tracks t_mean exactly; the missing cell should land near
        // the value the linear relation implies.
        let df = df![
            "t_mean" => [1.0, 2.0, 3.0, 4.0, 5.0],
            "humidity" => [Some(10.0), Some(20.0), None, Some(40.0), Some(50.0)],
        ]
        .unwrap();
        let out = impute(&df, 10).unwrap();
        let ca = out.column("humidity").unwrap().as_materialized_series().f64().unwrap();
        let filled = ca.get(2).unwrap();
        assert!((filled - 30.0).abs() < 1.0, "got {filled}");
    }

    #[test]
    fn test_observed_cells_untouched() {
        let df = df![
            "t_mean" => [1.0, 2.0, 3.0],
            "humidity" => [Some(10.0), None, Some(30.0)],
        ]
        .unwrap();
        let out = impute(&df, 10).unwrap();
        let ca = out.column("humidity").unwrap().as_materialized_series().f64().unwrap();
        assert_eq!(ca.get(0), Some(10.0));
        assert_eq!(ca.get(2), Some(30.0));
    }

    #[test]
    fn test_deterministic_across_runs() {
        let df = df![
            "t_mean" => [Some(1.0), None, Some(3.0), Some(4.0)],
            "humidity" => [Some(10.0), Some(20.0), None, Some(40.0)],
        ]
        .unwrap();
        let a = impute(&df, 10).unwrap();
        let b = impute(&df, 10).unwrap();
        for name in ["t_mean", "humidity"] {
            let col_a: Vec<f64> = a
                .column(name)
                .unwrap()
                .as_materialized_series()
                .f64()
                .unwrap()
                .into_iter()
                .flatten()
                .collect();
            let col_b: Vec<f64> = b
                .column(name)
                .unwrap()
                .as_materialized_series()
                .f64()
                .unwrap()
                .into_iter()
                .flatten()
                .collect();
            assert_eq!(col_a, col_b);
        }
    }

    #[test]
    fn test_most_frequent_tie_breaks_smallest() {
        let series = Series::new("x".into(), vec![2.0, 1.0, 2.0, 1.0, 3.0]);
        let ca = series.f64().unwrap();
        assert_eq!(most_frequent(ca), 1.0);
    }
}
