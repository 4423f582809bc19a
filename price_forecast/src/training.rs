//! Offline model training from cached price histories

use crate::accuracy::{forecast_accuracy, ForecastAccuracy};
use crate::config::DEFAULT_LOOKBACK;
use crate::data::PriceSeriesLoader;
use crate::error::{ForecastError, Result};
use crate::features::{build_lagged_features, into_design, LaggedSample};
use crate::model::{ModelVariant, PointPredictionModel, Regressor, TrainedModel};
use crate::series::PriceSeries;
use crate::store::FileModelStore;
use price_math::{ForestConfig, LinearRegression, RandomForestRegressor};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Training parameters shared by every ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub lookback: usize,
    /// Fraction of the most recent samples held out for evaluation
    pub test_ratio: f64,
    pub forest: ForestConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
            test_ratio: 0.2,
            forest: ForestConfig::default(),
        }
    }
}

/// Outcome of training one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub ticker: String,
    pub variant: ModelVariant,
    pub lookback: usize,
    /// Lagged samples the final model was fitted on
    pub samples: usize,
    /// One-step-ahead accuracy on the held-out tail, if it was large enough
    pub holdout: Option<ForecastAccuracy>,
}

/// A ticker, or one of its variants, that could not be trained
#[derive(Debug)]
pub struct TrainingFailure {
    pub ticker: String,
    /// `None` when the history itself could not be loaded
    pub variant: Option<ModelVariant>,
    pub error: ForecastError,
}

/// Results of a batch run
#[derive(Debug, Default)]
pub struct TrainingSummary {
    pub reports: Vec<TrainingReport>,
    pub failures: Vec<TrainingFailure>,
}

/// Split samples chronologically into (train, test).
///
/// The test part is empty when the ratio is out of range or the split would
/// leave either side without samples.
pub fn train_test_split<T>(samples: &[T], test_ratio: f64) -> (&[T], &[T]) {
    if samples.is_empty() || test_ratio <= 0.0 || test_ratio >= 1.0 {
        return (samples, &[]);
    }

    let test_size = (samples.len() as f64 * test_ratio).round() as usize;
    if test_size == 0 || test_size >= samples.len() {
        return (samples, &[]);
    }

    samples.split_at(samples.len() - test_size)
}

fn fit(variant: ModelVariant, samples: &[LaggedSample], config: &TrainingConfig) -> Result<Regressor> {
    let (features, labels) = into_design(samples);
    Ok(match variant {
        ModelVariant::Linear => Regressor::Linear(LinearRegression::fit(&features, &labels)?),
        ModelVariant::Forest => Regressor::Forest(RandomForestRegressor::fit(
            &features,
            &labels,
            config.forest.clone(),
        )?),
    })
}

/// Train one model on a full price history.
///
/// The model is first fitted on the older samples and scored on the newest
/// `test_ratio` of them, then refitted on everything.
pub fn train_model(
    ticker: &str,
    series: &PriceSeries,
    variant: ModelVariant,
    config: &TrainingConfig,
) -> Result<(TrainedModel, TrainingReport)> {
    if config.lookback == 0 {
        return Err(ForecastError::InvalidParameter(
            "lookback must be positive".to_string(),
        ));
    }

    let samples = build_lagged_features(series, config.lookback);
    if samples.is_empty() {
        return Err(ForecastError::EmptyFeatureSet {
            lookback: config.lookback,
            points: series.len(),
        });
    }

    let (train, test) = train_test_split(&samples, config.test_ratio);
    let holdout = if test.is_empty() {
        None
    } else {
        let model = TrainedModel::new(config.lookback, fit(variant, train, config)?);
        Some(evaluate(&model, test)?)
    };

    let model = TrainedModel::new(config.lookback, fit(variant, &samples, config)?);
    let report = TrainingReport {
        ticker: ticker.to_string(),
        variant,
        lookback: config.lookback,
        samples: samples.len(),
        holdout,
    };

    info!(
        ticker,
        %variant,
        samples = report.samples,
        holdout = ?report.holdout.map(|h| h.rmse),
        "trained model"
    );
    Ok((model, report))
}

/// One-step-ahead accuracy of `model` on `samples`
pub fn evaluate(model: &TrainedModel, samples: &[LaggedSample]) -> Result<ForecastAccuracy> {
    let predicted = samples
        .iter()
        .map(|s| model.predict(&s.features))
        .collect::<Result<Vec<f64>>>()?;
    let actual: Vec<f64> = samples.iter().map(|s| s.label).collect();
    forecast_accuracy(&predicted, &actual)
}

/// Train and save every (ticker, variant) pair.
///
/// A failure for one pair is logged and recorded; the rest still run.
pub fn train_all<L: PriceSeriesLoader>(
    loader: &L,
    store: &FileModelStore,
    tickers: &[String],
    variants: &[ModelVariant],
    config: &TrainingConfig,
) -> TrainingSummary {
    let mut summary = TrainingSummary::default();

    for ticker in tickers {
        let series = match loader.load(ticker) {
            Ok(series) => series,
            Err(e) => {
                warn!(%ticker, error = %e, "skipping ticker");
                summary.failures.push(TrainingFailure {
                    ticker: ticker.clone(),
                    variant: None,
                    error: e,
                });
                continue;
            }
        };

        for &variant in variants {
            let outcome = train_model(ticker, &series, variant, config)
                .and_then(|(model, report)| store.save(ticker, &model).map(|_| report));
            match outcome {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    warn!(%ticker, %variant, error = %e, "training failed");
                    summary.failures.push(TrainingFailure {
                        ticker: ticker.clone(),
                        variant: Some(variant),
                        error: e,
                    });
                }
            }
        }
    }

    summary
}
