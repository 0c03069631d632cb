//! Ordinary least squares on a sparse design matrix.
//!
//! With an intercept the problem is solved on centered data:
//!
//! ```text
//! G = XᵀX - n·x̄x̄ᵀ        b = Xᵀy - n·x̄·ȳ
//! w = G⁺ b                intercept = ȳ - x̄·w
//! ```
//!
//! `G⁺` is the pseudo-inverse, so when one-hot blocks make `G` singular the
//! minimum-norm coefficients are returned. The Gram matrix is accumulated
//! from the sparse rows directly, costing `O(nnz_per_row²)` per row.

use crate::error::ModelError;
use crate::linalg::pseudo_solve;
use ndarray::{Array1, Array2};
use ridetime_features::SparseMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for least squares fitting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionConfig {
    /// Whether to fit an intercept (default: true)
    pub fit_intercept: bool,
    /// Relative eigenvalue cutoff for the pseudo-inverse (default: 1e-10)
    pub rcond: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            fit_intercept: true,
            rcond: 1e-10,
        }
    }
}

/// Fitted linear regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    /// Fit with the default configuration.
    pub fn fit(x: &SparseMatrix, y: &[f64]) -> Result<Self, ModelError> {
        Self::fit_with_config(x, y, &RegressionConfig::default())
    }

    /// Fit with an explicit configuration.
    pub fn fit_with_config(
        x: &SparseMatrix,
        y: &[f64],
        config: &RegressionConfig,
    ) -> Result<Self, ModelError> {
        let (n_rows, n_cols) = x.shape();
        if n_rows != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: n_rows,
                actual: y.len(),
            });
        }
        if n_rows == 0 {
            return Err(ModelError::EmptyData(
                "cannot fit regression on zero rows".to_string(),
            ));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("regression target".to_string()));
        }

        let n = n_rows as f64;

        let mut x_mean = Array1::<f64>::zeros(n_cols);
        let mut y_mean = 0.0;
        if config.fit_intercept {
            for row in x.rows() {
                for (c, v) in row {
                    x_mean[c] += v;
                }
            }
            x_mean /= n;
            y_mean = y.iter().sum::<f64>() / n;
        }

        let mut gram = Array2::<f64>::zeros((n_cols, n_cols));
        let mut xty = Array1::<f64>::zeros(n_cols);
        for (i, target) in y.iter().enumerate() {
            let entries: Vec<(usize, f64)> = x.row(i).collect();
            for &(a, va) in &entries {
                xty[a] += va * target;
                for &(b, vb) in &entries {
                    gram[[a, b]] += va * vb;
                }
            }
        }

        if config.fit_intercept {
            for a in 0..n_cols {
                xty[a] -= n * x_mean[a] * y_mean;
                for b in 0..n_cols {
                    gram[[a, b]] -= n * x_mean[a] * x_mean[b];
                }
            }
        }

        let weights = pseudo_solve(&gram, &xty, config.rcond)?;
        let intercept = if config.fit_intercept {
            y_mean - x_mean.dot(&weights)
        } else {
            0.0
        };

        debug!(rows = n_rows, features = n_cols, intercept, "fitted linear regression");

        Ok(Self {
            coefficients: weights.to_vec(),
            intercept,
        })
    }

    /// Predict one value per row.
    pub fn predict(&self, x: &SparseMatrix) -> Result<Vec<f64>, ModelError> {
        if x.n_cols() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: x.n_cols(),
            });
        }
        Ok((0..x.n_rows())
            .map(|i| self.intercept + x.dot_row(i, &self.coefficients))
            .collect())
    }

    /// Coefficients in feature order.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Intercept term.
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn one_hot(n_cols: usize, hot: &[&[usize]]) -> SparseMatrix {
        SparseMatrix::from_rows(
            n_cols,
            hot.iter()
                .map(|cols| cols.iter().map(|&c| (c, 1.0)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_exact_linear_relationship() {
        // y = 2 + 3x
        let x = SparseMatrix::from_rows(1, (0..5).map(|i| vec![(0, i as f64)]).collect());
        let y: Vec<f64> = (0..5).map(|i| 2.0 + 3.0 * i as f64).collect();

        let model = LinearRegression::fit(&x, &y).unwrap();
        assert_abs_diff_eq!(model.coefficients()[0], 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(model.intercept(), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_one_hot_group_means() {
        // Two categories; OLS predictions are the per-category means.
        let x = one_hot(2, &[&[0], &[0], &[1], &[1]]);
        let y = [10.0, 20.0, 30.0, 50.0];

        let model = LinearRegression::fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();

        assert_abs_diff_eq!(pred[0], 15.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pred[1], 15.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pred[2], 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pred[3], 40.0, epsilon = 1e-9);

        // Minimum-norm: the two coefficients are symmetric around zero.
        let c = model.coefficients();
        assert_abs_diff_eq!(c[0] + c[1], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_without_intercept() {
        let x = SparseMatrix::from_rows(1, vec![vec![(0, 1.0)], vec![(0, 2.0)]]);
        let config = RegressionConfig {
            fit_intercept: false,
            ..Default::default()
        };
        let model = LinearRegression::fit_with_config(&x, &[2.0, 4.0], &config).unwrap();
        assert_abs_diff_eq!(model.coefficients()[0], 2.0, epsilon = 1e-10);
        assert_eq!(model.intercept(), 0.0);
    }

    #[test]
    fn test_no_features_predicts_mean() {
        let x = SparseMatrix::from_rows(0, vec![vec![], vec![]]);
        let model = LinearRegression::fit(&x, &[3.0, 5.0]).unwrap();
        assert_eq!(model.predict(&x).unwrap(), vec![4.0, 4.0]);
    }

    #[test]
    fn test_deterministic_fit() {
        let x = one_hot(4, &[&[0, 2], &[1, 2], &[0, 3], &[1, 3], &[0, 2]]);
        let y = [5.0, 7.5, 12.0, 3.0, 8.0];
        let a = LinearRegression::fit(&x, &y).unwrap();
        let b = LinearRegression::fit(&x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fit_errors() {
        let x = one_hot(1, &[&[0], &[0]]);
        assert!(matches!(
            LinearRegression::fit(&x, &[1.0]),
            Err(ModelError::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            LinearRegression::fit(&one_hot(1, &[]), &[]),
            Err(ModelError::EmptyData(_))
        ));
        assert!(matches!(
            LinearRegression::fit(&x, &[1.0, f64::NAN]),
            Err(ModelError::NonFinite(_))
        ));
    }

    #[test]
    fn test_predict_width_mismatch() {
        let model = LinearRegression::fit(&one_hot(2, &[&[0], &[1]]), &[1.0, 2.0]).unwrap();
        assert!(model.predict(&one_hot(3, &[&[2]])).is_err());
    }
}
