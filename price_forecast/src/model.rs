//! Point-prediction models: one lag vector in, one close out

use crate::error::{ForecastError, Result};
use crate::features::LagFeatureVector;
use price_math::{LinearRegression, RandomForestRegressor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Anything that predicts the next close from a lag vector.
///
/// Implementations must be free of side effects during `predict` so that a
/// loaded model can be shared between forecasts.
pub trait PointPredictionModel: Send + Sync {
    /// Predict the close that follows `features`
    fn predict(&self, features: &LagFeatureVector) -> Result<f64>;

    /// Human-readable model name
    fn name(&self) -> &str;
}

impl<M: PointPredictionModel + ?Sized> PointPredictionModel for &M {
    fn predict(&self, features: &LagFeatureVector) -> Result<f64> {
        (**self).predict(features)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<M: PointPredictionModel + ?Sized> PointPredictionModel for Box<M> {
    fn predict(&self, features: &LagFeatureVector) -> Result<f64> {
        (**self).predict(features)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<M: PointPredictionModel + ?Sized> PointPredictionModel for Arc<M> {
    fn predict(&self, features: &LagFeatureVector) -> Result<f64> {
        (**self).predict(features)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Which kind of regressor a stored model is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    Linear,
    Forest,
}

impl ModelVariant {
    pub fn all() -> [ModelVariant; 2] {
        [ModelVariant::Linear, ModelVariant::Forest]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVariant::Linear => "linear",
            ModelVariant::Forest => "forest",
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelVariant {
    type Err = ForecastError;

    /// `"tree"` is accepted as an alias for the forest.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(ModelVariant::Linear),
            "forest" | "tree" => Ok(ModelVariant::Forest),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown model variant: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", content = "model", rename_all = "lowercase")]
pub enum Regressor {
    Linear(LinearRegression),
    Forest(RandomForestRegressor),
}

/// A fitted regressor plus the lookback it was trained with.
///
/// This is the artifact the model store persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    name: String,
    lookback: usize,
    regressor: Regressor,
}

impl TrainedModel {
    pub fn new(lookback: usize, regressor: Regressor) -> Self {
        let name = match &regressor {
            Regressor::Linear(_) => format!("Linear Regression (lookback={})", lookback),
            Regressor::Forest(f) => format!(
                "Random Forest ({} trees, lookback={})",
                f.n_trees(),
                lookback
            ),
        };
        Self {
            name,
            lookback,
            regressor,
        }
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    pub fn variant(&self) -> ModelVariant {
        match self.regressor {
            Regressor::Linear(_) => ModelVariant::Linear,
            Regressor::Forest(_) => ModelVariant::Forest,
        }
    }

    pub fn regressor(&self) -> &Regressor {
        &self.regressor
    }
}

impl PointPredictionModel for TrainedModel {
    fn predict(&self, features: &LagFeatureVector) -> Result<f64> {
        if features.lookback() != self.lookback {
            return Err(ForecastError::ModelInvocation(format!(
                "{} expects {} lags, got {}",
                self.name,
                self.lookback,
                features.lookback()
            )));
        }

        let prediction = match &self.regressor {
            Regressor::Linear(m) => m.predict(features),
            Regressor::Forest(m) => m.predict(features),
        };
        prediction.map_err(|e| ForecastError::ModelInvocation(format!("{}: {}", self.name, e)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
