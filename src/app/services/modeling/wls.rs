//! Weighted least squares
//!
//! Dense WLS via the normal equations with Gaussian elimination and partial
//! pivoting. The design matrices in this crate are small (a few hundred
//! columns at most), so the direct solve is both simple and fast enough.

use crate::{Error, Result};

/// Relative pivot tolerance below which a system is treated as singular
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Result of a weighted least squares fit
#[derive(Debug, Clone, PartialEq)]
pub struct WlsFit {
    /// Coefficient per design matrix column
    pub coefficients: Vec<f64>,

    /// Fitted response values, aligned with the input rows
    pub fitted: Vec<f64>,

    /// Residuals (observed minus fitted), aligned with the input rows
    pub residuals: Vec<f64>,
}

/// Fit a weighted least squares model
///
/// `design` holds one row per observation; all rows must share the same
/// width. Weights must be finite and non-negative. Returns an error for
/// empty, malformed, non-finite, or singular systems.
pub fn fit_wls(design: &[Vec<f64>], response: &[f64], weights: &[f64]) -> Result<WlsFit> {
    let n = design.len();
    if n == 0 {
        return Err(Error::model_fitting("Cannot fit model with no rows"));
    }
    if response.len() != n || weights.len() != n {
        return Err(Error::model_fitting(format!(
            "Row count mismatch: {} design rows, {} responses, {} weights",
            n,
            response.len(),
            weights.len()
        )));
    }

    let p = design[0].len();
    if p == 0 {
        return Err(Error::model_fitting("Cannot fit model with no columns"));
    }
    if n < p {
        return Err(Error::model_fitting(format!(
            "Underdetermined system: {} rows for {} columns",
            n, p
        )));
    }

    for (i, row) in design.iter().enumerate() {
        if row.len() != p {
            return Err(Error::model_fitting(format!(
                "Design row {} has {} columns, expected {}",
                i,
                row.len(),
                p
            )));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(Error::model_fitting(format!(
                "Non-finite value in design row {}",
                i
            )));
        }
    }
    if response.iter().any(|v| !v.is_finite()) {
        return Err(Error::model_fitting("Non-finite value in response"));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(Error::model_fitting(
            "Weights must be finite and non-negative",
        ));
    }

    // Normal equations: (X'WX) beta = X'Wy
    let mut xtwx = vec![vec![0.0; p]; p];
    let mut xtwy = vec![0.0; p];
    for (row, (&y, &w)) in design.iter().zip(response.iter().zip(weights)) {
        for j in 0..p {
            let wxj = w * row[j];
            xtwy[j] += wxj * y;
            for k in j..p {
                xtwx[j][k] += wxj * row[k];
            }
        }
    }
    // Mirror the upper triangle
    for j in 0..p {
        for k in 0..j {
            xtwx[j][k] = xtwx[k][j];
        }
    }

    let coefficients = solve_linear_system(xtwx, xtwy)?;

    let fitted: Vec<f64> = design
        .iter()
        .map(|row| row.iter().zip(&coefficients).map(|(x, b)| x * b).sum())
        .collect();
    let residuals: Vec<f64> = response
        .iter()
        .zip(&fitted)
        .map(|(y, f)| y - f)
        .collect();

    Ok(WlsFit {
        coefficients,
        fitted,
        residuals,
    })
}

/// Solve `A x = b` by Gaussian elimination with partial pivoting
///
/// Consumes its inputs; `A` must be square and match `b` in size.
pub fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let p = b.len();

    // Scale for the relative singularity check
    let max_entry = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(1.0);

    for col in 0..p {
        // Partial pivot
        let pivot_row = (col..p)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() < PIVOT_TOLERANCE * max_entry {
            return Err(Error::singular_system(format!(
                "Pivot {} below tolerance at column {}",
                a[pivot_row][col], col
            )));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..p {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..p {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution
    let mut x = vec![0.0; p];
    for col in (0..p).rev() {
        let mut sum = b[col];
        for k in (col + 1)..p {
            sum -= a[col][k] * x[k];
        }
        x[col] = sum / a[col][col];
    }

    Ok(x)
}
