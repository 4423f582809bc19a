//! Lag feature construction.
//!
//! Every feature vector in this crate is ordered most recent first:
//! `(close[i-1], close[i-2], ..., close[i-L])`. [`lag_vector`] is the only
//! place that builds that ordering, and both training and forecasting go
//! through it, so the two can never disagree.

use crate::series::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// The `L` closes preceding a target date, most recent first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagFeatureVector(Vec<f64>);

impl LagFeatureVector {
    pub fn lookback(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for LagFeatureVector {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

/// One training row: the lags preceding `date` and the close on `date`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaggedSample {
    pub date: NaiveDate,
    pub features: LagFeatureVector,
    pub label: f64,
}

/// Build the feature vector from the tail of a chronological slice.
///
/// Returns `None` when `lookback` is zero or the slice is shorter than it.
pub fn lag_vector(closes: &[f64], lookback: usize) -> Option<LagFeatureVector> {
    if lookback == 0 || closes.len() < lookback {
        return None;
    }
    Some(LagFeatureVector(
        closes[closes.len() - lookback..].iter().rev().copied().collect(),
    ))
}

/// Turn a series into (lags, label) rows.
///
/// Positions without `lookback` prior closes are dropped, so a series of `N`
/// points yields `N - lookback` rows, or none at all when `N <= lookback`.
pub fn build_lagged_features(series: &PriceSeries, lookback: usize) -> Vec<LaggedSample> {
    if lookback == 0 || series.len() <= lookback {
        return Vec::new();
    }

    let closes = series.closes();
    series
        .points()
        .iter()
        .enumerate()
        .skip(lookback)
        .filter_map(|(i, point)| {
            lag_vector(&closes[..i], lookback).map(|features| LaggedSample {
                date: point.date,
                features,
                label: point.close,
            })
        })
        .collect()
}

/// Split samples into a design matrix and label vector
pub fn into_design(samples: &[LaggedSample]) -> (Vec<Vec<f64>>, Vec<f64>) {
    samples
        .iter()
        .map(|s| (s.features.as_slice().to_vec(), s.label))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lag_vector_is_most_recent_first() {
        let v = lag_vector(&[1.0, 2.0, 3.0, 4.0], 3).unwrap();
        assert_eq!(v.as_slice(), &[4.0, 3.0, 2.0]);
    }

    #[test]
    fn test_lag_vector_too_short() {
        assert!(lag_vector(&[1.0, 2.0], 3).is_none());
        assert!(lag_vector(&[1.0, 2.0], 0).is_none());
    }

    #[test]
    fn test_into_design_shapes() {
        let samples = vec![LaggedSample {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            features: lag_vector(&[1.0, 2.0], 2).unwrap(),
            label: 3.0,
        }];
        let (x, y) = into_design(&samples);
        assert_eq!(x, vec![vec![2.0, 1.0]]);
        assert_eq!(y, vec![3.0]);
    }
}
