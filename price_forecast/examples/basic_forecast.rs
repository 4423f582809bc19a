//! Train a linear model on a synthetic history and forecast the next week.
//!
//! Usage: cargo run --example basic_forecast

use chrono::NaiveDate;
use price_forecast::calendar::business_days_after;
use price_forecast::model::ModelVariant;
use price_forecast::training::{train_model, TrainingConfig};
use price_forecast::{forecast, PointPredictionModel, PriceSeries};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dates = business_days_after(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 250);
    let closes: Vec<f64> = (0..dates.len())
        .map(|i| 150.0 + 0.2 * i as f64 + 4.0 * (i as f64 / 9.0).sin())
        .collect();
    let series = PriceSeries::from_parts(dates, closes)?;

    let config = TrainingConfig::default();
    let (model, report) = train_model("DEMO", &series, ModelVariant::Linear, &config)?;

    println!("Model: {}", model.name());
    println!("Samples: {}", report.samples);
    if let Some(holdout) = report.holdout {
        println!("Holdout: {}", holdout);
    }

    let last = series.last().ok_or("empty series")?;
    let result = forecast(
        &model,
        &series.recent_closes(config.lookback),
        config.lookback,
        7,
        last.date,
    )?;

    println!("\nLast close {} on {}", last.close, last.date);
    for point in result.points() {
        println!("{}  {:.2}", point.date, point.close);
    }
    Ok(())
}
