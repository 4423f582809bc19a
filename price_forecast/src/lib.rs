//! # Price Forecast
//!
//! Multi-day closing-price forecasts for cached stock histories.
//!
//! ## Features
//!
//! - Validated daily price series loaded from per-ticker JSON files
//! - Lag feature construction (most recent close first)
//! - Iterative forecasting: a one-step model rolled forward over business days
//! - Linear and random-forest point-prediction models, trained offline and
//!   stored as JSON
//! - A service facade resolving company names, history windows and forecasts
//!
//! ## Quick Start
//!
//! ```no_run
//! use price_forecast::config::{ForecastConfig, ForecastHorizon};
//! use price_forecast::service::{ForecastService, PredictionRequest};
//!
//! let service = ForecastService::from_config(ForecastConfig::from_env()?)?;
//! let report = service.predict(
//!     "Apple Inc.",
//!     PredictionRequest {
//!         horizon: ForecastHorizon::OneWeek,
//!         ..Default::default()
//!     },
//! )?;
//! for point in report.predictions.points() {
//!     println!("{} {:.2}", point.date, point.close);
//! }
//! # Ok::<(), price_forecast::ForecastError>(())
//! ```
//!
//! ## Forecasting a series directly
//!
//! ```
//! use chrono::NaiveDate;
//! use price_forecast::{forecast, LagFeatureVector, PointPredictionModel, Result};
//!
//! struct Drift;
//!
//! impl PointPredictionModel for Drift {
//!     fn predict(&self, features: &LagFeatureVector) -> Result<f64> {
//!         Ok(features[0] + 1.0)
//!     }
//!
//!     fn name(&self) -> &str {
//!         "drift"
//!     }
//! }
//!
//! let friday = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
//! let result = forecast(&Drift, &[50.0], 1, 2, friday)?;
//! assert_eq!(result.closes(), vec![51.0, 52.0]);
//! # Ok::<(), price_forecast::ForecastError>(())
//! ```

pub mod accuracy;
pub mod calendar;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod forecaster;
pub mod model;
pub mod series;
pub mod service;
pub mod store;
pub mod training;

// Re-export commonly used types
pub use crate::error::{ForecastError, Result};
pub use crate::features::{build_lagged_features, LagFeatureVector, LaggedSample};
pub use crate::forecaster::{forecast, ForecastPoint, ForecastResult};
pub use crate::model::{ModelVariant, PointPredictionModel, TrainedModel};
pub use crate::series::{PricePoint, PriceSeries};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
