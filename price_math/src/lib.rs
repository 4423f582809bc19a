//! # Price Math
//!
//! Regression models for single-step price prediction.
//! Every model is fitted on a design matrix (one row per sample) and a label
//! vector, and predicts a single value from one feature row.
//!
//! The crate knows nothing about dates, tickers or lag conventions; it only
//! sees rows of `f64`.

use thiserror::Error;

pub mod forest;
pub mod linear;
pub mod tree;

pub use forest::{ForestConfig, RandomForestRegressor};
pub use linear::LinearRegression;
pub use tree::{DecisionTreeRegressor, TreeConfig};

/// Errors that can occur while fitting or evaluating a regression model
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for regression operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Check that `features` is a non-empty rectangular matrix matching `labels`.
///
/// Returns the row width.
pub(crate) fn validate_design(features: &[Vec<f64>], labels: &[f64]) -> Result<usize> {
    if features.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot fit a model on an empty design matrix".to_string(),
        ));
    }

    if features.len() != labels.len() {
        return Err(MathError::InvalidInput(format!(
            "Feature rows ({}) don't match label count ({})",
            features.len(),
            labels.len()
        )));
    }

    let width = features[0].len();
    if width == 0 {
        return Err(MathError::InvalidInput(
            "Feature rows must contain at least one value".to_string(),
        ));
    }

    if let Some(row) = features.iter().position(|r| r.len() != width) {
        return Err(MathError::InvalidInput(format!(
            "Row {} has {} features, expected {}",
            row,
            features[row].len(),
            width
        )));
    }

    if features.iter().flatten().chain(labels).any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Design matrix contains non-finite values".to_string(),
        ));
    }

    Ok(width)
}

/// Check a single row against the width a model was fitted on.
pub(crate) fn validate_row(row: &[f64], width: usize) -> Result<()> {
    if row.len() != width {
        return Err(MathError::InvalidInput(format!(
            "Expected {} features, got {}",
            width,
            row.len()
        )));
    }
    Ok(())
}
