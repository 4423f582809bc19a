//! Error types for the price_forecast crate

use crate::model::ModelVariant;
use price_math::MathError;
use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Fewer known closes than the lookback window needs
    #[error("Insufficient history: need at least {required} closes, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// The point-prediction model failed on a well-formed feature vector
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    /// A training series produced no lagged samples
    #[error("Empty feature set: {points} closes cannot fill a lookback of {lookback}")]
    EmptyFeatureSet { lookback: usize, points: usize },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A price series broke its ordering or positivity invariants
    #[error("Invalid price series: {0}")]
    InvalidSeries(String),

    #[error("No price history found for {ticker}")]
    SeriesNotFound { ticker: String },

    #[error("No {variant} model found for {ticker}")]
    ModelNotFound {
        ticker: String,
        variant: ModelVariant,
    },

    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    /// A forecast request failed; carries the request context
    #[error("Cannot forecast {ticker} (lookback {lookback}, horizon {horizon}): {source}")]
    ForecastFailed {
        ticker: String,
        lookback: usize,
        horizon: usize,
        #[source]
        source: Box<ForecastError>,
    },

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the regression models
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// Attach request context to a forecasting failure
    pub fn for_request(self, ticker: &str, lookback: usize, horizon: usize) -> Self {
        ForecastError::ForecastFailed {
            ticker: ticker.to_string(),
            lookback,
            horizon,
            source: Box::new(self),
        }
    }

    /// True when the failure means "no such data" rather than "cannot compute"
    pub fn is_not_found(&self) -> bool {
        match self {
            ForecastError::SeriesNotFound { .. }
            | ForecastError::ModelNotFound { .. }
            | ForecastError::CompanyNotFound(_) => true,
            ForecastError::ForecastFailed { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
