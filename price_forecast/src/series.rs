//! Daily closing-price series

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day's close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Closes ordered by strictly increasing date.
///
/// Construction validates the ordering and that every close is finite and
/// positive, so downstream code can rely on both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a validated series
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for (i, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(ForecastError::InvalidSeries(format!(
                    "close on {} must be a finite positive number, got {}",
                    point.date, point.close
                )));
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(ForecastError::InvalidSeries(format!(
                    "dates must be strictly increasing: {} follows {}",
                    point.date,
                    points[i - 1].date
                )));
            }
        }
        Ok(Self { points })
    }

    /// Create a series from parallel date and close vectors
    pub fn from_parts(dates: Vec<NaiveDate>, closes: Vec<f64>) -> Result<Self> {
        if dates.len() != closes.len() {
            return Err(ForecastError::InvalidSeries(format!(
                "dates length ({}) doesn't match closes length ({})",
                dates.len(),
                closes.len()
            )));
        }
        Self::new(
            dates
                .into_iter()
                .zip(closes)
                .map(|(date, close)| PricePoint::new(date, close))
                .collect(),
        )
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closing prices in chronological order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// The last `n` closes, oldest first. Shorter if the series is shorter.
    pub fn recent_closes(&self, n: usize) -> Vec<f64> {
        let start = self.points.len().saturating_sub(n);
        self.points[start..].iter().map(|p| p.close).collect()
    }

    /// Points dated on or after `start`
    pub fn since(&self, start: NaiveDate) -> PriceSeries {
        let from = self.points.partition_point(|p| p.date < start);
        PriceSeries {
            points: self.points[from..].to_vec(),
        }
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let points = Vec::<PricePoint>::deserialize(deserializer)?;
        PriceSeries::new(points).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_rejects_duplicate_dates() {
        let result = PriceSeries::from_parts(vec![d(4), d(4)], vec![1.0, 2.0]);
        assert!(matches!(result, Err(ForecastError::InvalidSeries(_))));
    }

    #[test]
    fn test_rejects_non_positive_close() {
        let result = PriceSeries::from_parts(vec![d(4), d(5)], vec![1.0, 0.0]);
        assert!(matches!(result, Err(ForecastError::InvalidSeries(_))));
    }

    #[test]
    fn test_recent_closes_and_since() {
        let series =
            PriceSeries::from_parts(vec![d(4), d(5), d(6), d(7)], vec![1.0, 2.0, 3.0, 4.0])
                .unwrap();
        assert_eq!(series.recent_closes(2), vec![3.0, 4.0]);
        assert_eq!(series.recent_closes(10), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(series.since(d(6)).closes(), vec![3.0, 4.0]);
        assert!(series.since(d(20)).is_empty());
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"[{"date":"2024-03-05","close":2.0},{"date":"2024-03-04","close":1.0}]"#;
        assert!(serde_json::from_str::<PriceSeries>(json).is_err());
    }
}
