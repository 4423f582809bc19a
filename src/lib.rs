//! # Stock Oracle
//!
//! Umbrella crate for the workspace:
//!
//! - [`math`]: regression models (`price_math`)
//! - [`forecast`]: price series, lag features, iterative forecasting, model
//!   store, training and the service facade (`price_forecast`)
//!
//! ## Example
//!
//! ```
//! use stock_oracle_workspace::forecast::features::lag_vector;
//!
//! let lags = lag_vector(&[10.0, 20.0, 30.0], 2).unwrap();
//! assert_eq!(lags.as_slice(), &[30.0, 20.0]);
//! ```

pub use price_forecast as forecast;
pub use price_math as math;

pub use price_forecast::{
    build_lagged_features, forecast as forecast_closes, ForecastError, ForecastResult,
    ModelVariant, PointPredictionModel, PriceSeries,
};
