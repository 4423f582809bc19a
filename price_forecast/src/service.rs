//! Request-level operations over the data cache and the model store.
//!
//! This is everything a transport layer needs: it resolves company names,
//! windows histories and runs forecasts, returning serializable reports.

use crate::config::{ForecastConfig, ForecastHorizon, HistoryWindow};
use crate::data::{CompanyDirectory, CompanyRecord, JsonDataCache, PriceSeriesLoader};
use crate::error::{ForecastError, Result};
use crate::forecaster::{forecast, ForecastResult};
use crate::model::ModelVariant;
use crate::series::PriceSeries;
use crate::store::{CachedModelStore, FileModelStore, ModelStore};
use serde::{Deserialize, Serialize};
use tracing::info;

/// History of one company, windowed by a timeframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryReport {
    pub company_name: String,
    pub ticker: String,
    pub history: PriceSeries,
}

/// Forecast for one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub company_name: String,
    pub ticker: String,
    pub timeframe: ForecastHorizon,
    pub model: ModelVariant,
    pub lookback: usize,
    pub predictions: ForecastResult,
}

/// Prediction request parameters; `None` falls back to the configured default
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PredictionRequest {
    pub horizon: ForecastHorizon,
    pub lookback: Option<usize>,
    pub variant: Option<ModelVariant>,
}

pub struct ForecastService<L, S> {
    directory: CompanyDirectory,
    loader: L,
    store: S,
    config: ForecastConfig,
}

impl ForecastService<JsonDataCache, CachedModelStore<FileModelStore>> {
    /// Service over the configured data and model directories
    pub fn from_config(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        let loader = JsonDataCache::new(&config.data_dir);
        let directory = loader.companies()?;
        let store = CachedModelStore::new(FileModelStore::new(&config.models_dir));
        info!(
            companies = directory.len(),
            data_dir = %config.data_dir.display(),
            models_dir = %config.models_dir.display(),
            "forecast service ready"
        );
        Ok(Self::new(directory, loader, store, config))
    }
}

impl<L: PriceSeriesLoader, S: ModelStore> ForecastService<L, S> {
    pub fn new(directory: CompanyDirectory, loader: L, store: S, config: ForecastConfig) -> Self {
        Self {
            directory,
            loader,
            store,
            config,
        }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn directory(&self) -> &CompanyDirectory {
        &self.directory
    }

    /// All known company names, sorted
    pub fn companies(&self) -> Vec<String> {
        self.directory.names()
    }

    /// Full record of the first company whose name contains `query`
    pub fn lookup(&self, query: &str) -> Result<CompanyRecord> {
        let (company_name, ticker) = self
            .directory
            .search(query)
            .ok_or_else(|| ForecastError::CompanyNotFound(query.to_string()))?;

        Ok(CompanyRecord {
            company_name: company_name.to_string(),
            ticker: ticker.to_string(),
            history: self.loader.load(ticker)?,
        })
    }

    /// History of `company_name` (exact match) limited to `window`
    pub fn history(&self, company_name: &str, window: HistoryWindow) -> Result<HistoryReport> {
        let ticker = self.resolve(company_name)?;
        let series = self.loader.load(ticker)?;

        let history = match series.last().and_then(|p| window.start_date(p.date)) {
            Some(start) => series.since(start),
            None => series,
        };

        Ok(HistoryReport {
            company_name: company_name.to_string(),
            ticker: ticker.to_string(),
            history,
        })
    }

    /// Forecast `company_name` (exact match) past its last cached close
    pub fn predict(&self, company_name: &str, request: PredictionRequest) -> Result<PredictionReport> {
        let ticker = self.resolve(company_name)?;
        let lookback = request.lookback.unwrap_or(self.config.lookback);
        let variant = request.variant.unwrap_or(self.config.variant);
        let horizon = request.horizon.days();

        let predictions = self
            .run_forecast(ticker, lookback, horizon, variant)
            .map_err(|e| e.for_request(ticker, lookback, horizon))?;

        Ok(PredictionReport {
            company_name: company_name.to_string(),
            ticker: ticker.to_string(),
            timeframe: request.horizon,
            model: variant,
            lookback,
            predictions,
        })
    }

    fn run_forecast(
        &self,
        ticker: &str,
        lookback: usize,
        horizon: usize,
        variant: ModelVariant,
    ) -> Result<ForecastResult> {
        let series = self.loader.load(ticker)?;
        let last = series.last().ok_or(ForecastError::InsufficientHistory {
            required: lookback,
            available: 0,
        })?;
        let model = self.store.load(ticker, variant)?;

        forecast(
            &*model,
            &series.recent_closes(lookback),
            lookback,
            horizon,
            last.date,
        )
    }

    fn resolve(&self, company_name: &str) -> Result<&str> {
        self.directory
            .ticker_for(company_name)
            .ok_or_else(|| ForecastError::CompanyNotFound(company_name.to_string()))
    }
}
