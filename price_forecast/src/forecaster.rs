//! Iterative multi-day forecasting.
//!
//! A single-step model is rolled forward: each prediction is appended to the
//! running close window and becomes an input for the next step. Errors in early
//! steps therefore compound into later ones.

use crate::calendar::next_business_day;
use crate::error::{ForecastError, Result};
use crate::features::lag_vector;
use crate::model::PointPredictionModel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// One forecast business day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Forecast closes in chronological order, one per business day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastResult {
    points: Vec<ForecastPoint>,
}

impl ForecastResult {
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn into_points(self) -> Vec<ForecastPoint> {
        self.points
    }
}

/// Forecast `horizon` business days past `last_known_date`.
///
/// `recent_closes` is chronological (oldest first) and must hold at least
/// `lookback` values; only the last `lookback` are used. The slice is never
/// modified.
pub fn forecast<M>(
    model: &M,
    recent_closes: &[f64],
    lookback: usize,
    horizon: usize,
    last_known_date: NaiveDate,
) -> Result<ForecastResult>
where
    M: PointPredictionModel + ?Sized,
{
    if lookback == 0 {
        return Err(ForecastError::InvalidParameter(
            "lookback must be positive".to_string(),
        ));
    }
    if recent_closes.len() < lookback {
        return Err(ForecastError::InsufficientHistory {
            required: lookback,
            available: recent_closes.len(),
        });
    }
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "horizon must be positive".to_string(),
        ));
    }

    let mut window: Vec<f64> = Vec::with_capacity(lookback + horizon);
    window.extend_from_slice(&recent_closes[recent_closes.len() - lookback..]);

    let mut points = Vec::with_capacity(horizon);
    let mut date = last_known_date;

    for step in 0..horizon {
        let features = lag_vector(&window, lookback).ok_or(ForecastError::InsufficientHistory {
            required: lookback,
            available: window.len(),
        })?;

        let close = model.predict(&features).map_err(|e| match e {
            ForecastError::ModelInvocation(_) => e,
            other => ForecastError::ModelInvocation(other.to_string()),
        })?;
        if !close.is_finite() {
            return Err(ForecastError::ModelInvocation(format!(
                "{} produced a non-finite prediction ({}) at step {}",
                model.name(),
                close,
                step + 1
            )));
        }

        date = next_business_day(date).ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "no business day follows {} in the supported calendar",
                date
            ))
        })?;
        trace!(step = step + 1, %date, close, "forecast step");

        points.push(ForecastPoint { date, close });
        window.push(close);
    }

    debug!(
        model = model.name(),
        lookback,
        horizon,
        from = %last_known_date,
        "forecast complete"
    );

    Ok(ForecastResult { points })
}
