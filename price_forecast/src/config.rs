//! Runtime configuration and request timeframes

use crate::error::{ForecastError, Result};
use crate::model::ModelVariant;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of lagged closes fed to a model
pub const DEFAULT_LOOKBACK: usize = 5;

pub const DATA_DIR_VAR: &str = "STOCK_DATA_DIR";
pub const MODELS_DIR_VAR: &str = "STOCK_MODELS_DIR";
pub const LOOKBACK_VAR: &str = "FORECAST_LOOKBACK";
pub const MODEL_VAR: &str = "FORECAST_MODEL";

/// Where data and models live, plus request defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
    pub lookback: usize,
    pub variant: ModelVariant,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            models_dir: PathBuf::from("models"),
            lookback: DEFAULT_LOOKBACK,
            variant: ModelVariant::Linear,
        }
    }
}

impl ForecastConfig {
    /// Defaults overridden by environment variables (and a `.env` file, if any)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(DATA_DIR_VAR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(MODELS_DIR_VAR) {
            config.models_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(LOOKBACK_VAR) {
            config.lookback = raw.trim().parse().map_err(|_| {
                ForecastError::InvalidParameter(format!("{} is not a valid lookback", raw))
            })?;
        }
        if let Some(raw) = lookup(MODEL_VAR) {
            config.variant = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookback == 0 {
            return Err(ForecastError::InvalidParameter(
                "lookback must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// How far ahead a prediction request looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastHorizon {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
}

impl ForecastHorizon {
    /// Parse a timeframe label. Unknown labels fall back to one week.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "1D" => ForecastHorizon::OneDay,
            "1M" => ForecastHorizon::OneMonth,
            _ => ForecastHorizon::OneWeek,
        }
    }

    /// Number of business days to forecast
    pub fn days(&self) -> usize {
        match self {
            ForecastHorizon::OneDay => 1,
            ForecastHorizon::OneWeek => 7,
            ForecastHorizon::OneMonth => 30,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ForecastHorizon::OneDay => "1D",
            ForecastHorizon::OneWeek => "1W",
            ForecastHorizon::OneMonth => "1M",
        }
    }
}

impl Default for ForecastHorizon {
    fn default() -> Self {
        ForecastHorizon::OneWeek
    }
}

/// How much history a history request returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryWindow {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "ALL")]
    All,
}

impl HistoryWindow {
    /// Parse a timeframe label. Unknown labels select the whole history.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "1D" => HistoryWindow::OneDay,
            "1W" => HistoryWindow::OneWeek,
            "1M" => HistoryWindow::OneMonth,
            "6M" => HistoryWindow::SixMonths,
            "1Y" => HistoryWindow::OneYear,
            "5Y" => HistoryWindow::FiveYears,
            _ => HistoryWindow::All,
        }
    }

    /// Calendar days covered, `None` for the whole history
    pub fn calendar_days(&self) -> Option<u64> {
        match self {
            HistoryWindow::OneDay => Some(1),
            HistoryWindow::OneWeek => Some(7),
            HistoryWindow::OneMonth => Some(30),
            HistoryWindow::SixMonths => Some(182),
            HistoryWindow::OneYear => Some(365),
            HistoryWindow::FiveYears => Some(1825),
            HistoryWindow::All => None,
        }
    }

    /// First date included when the history ends on `end`
    pub fn start_date(&self, end: NaiveDate) -> Option<NaiveDate> {
        self.calendar_days()
            .map(|days| end.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN))
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        HistoryWindow::OneYear
    }
}
