//! Ordinary least squares regression with an intercept.
//!
//! The normal equations are never formed. The design matrix (with a leading
//! column of ones) is decomposed by SVD and solved in the least-squares sense,
//! which stays well behaved when lagged closes are almost collinear, as they
//! usually are.

use crate::{validate_design, validate_row, MathError, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// SVD tolerances, relative to the largest singular value, tried in order
/// until one yields a finite solution.
const SVD_TOLERANCES: [f64; 3] = [1e-12, 1e-10, 1e-8];

/// A fitted linear model `y = intercept + Σ coefficients[j] * x[j]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegression {
    /// Build a model from known parameters
    pub fn from_parameters(intercept: f64, coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(MathError::InvalidInput(
                "A linear model needs at least one coefficient".to_string(),
            ));
        }
        Ok(Self {
            intercept,
            coefficients,
        })
    }

    /// Fit the model by least squares
    pub fn fit(features: &[Vec<f64>], labels: &[f64]) -> Result<Self> {
        let width = validate_design(features, labels)?;
        let n = features.len();

        let x = DMatrix::from_fn(n, width + 1, |i, j| {
            if j == 0 {
                1.0
            } else {
                features[i][j - 1]
            }
        });
        let y = DVector::from_column_slice(labels);

        let beta = solve_least_squares(&x, &y).ok_or_else(|| {
            MathError::CalculationError("Least squares system could not be solved".to_string())
        })?;

        Ok(Self {
            intercept: beta[0],
            coefficients: beta.iter().skip(1).copied().collect(),
        })
    }

    /// Predict a single value from one feature row
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        validate_row(row, self.coefficients.len())?;
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Number of features the model expects
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

/// Solve `min ||x * beta - y||` with SVD.
///
/// Returns `None` if no tolerance produces a finite solution.
fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);
    let scale = svd.singular_values.max().max(1.0);

    for &tol in &SVD_TOLERANCES {
        if let Ok(beta) = svd.solve(y, tol * scale) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
