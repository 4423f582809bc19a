//! Print a forecast for one company as JSON
//!
//! Usage: cargo run --bin forecast -- "Apple Inc." --timeframe 1W --model linear

use anyhow::Result;
use clap::Parser;
use price_forecast::config::{ForecastConfig, ForecastHorizon};
use price_forecast::model::ModelVariant;
use price_forecast::service::{ForecastService, PredictionRequest};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Forecast closing prices for a cached company")]
struct Args {
    /// Exact company name as listed in the data directory
    company: String,

    /// Forecast timeframe: 1D, 1W or 1M
    #[arg(long, default_value = "1W")]
    timeframe: String,

    /// Number of lagged closes fed to the model
    #[arg(short, long)]
    lookback: Option<usize>,

    /// Model variant: linear or forest (tree is an alias)
    #[arg(short, long)]
    model: Option<ModelVariant>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let service = ForecastService::from_config(ForecastConfig::from_env()?)?;

    let report = service.predict(
        &args.company,
        PredictionRequest {
            horizon: ForecastHorizon::parse(&args.timeframe),
            lookback: args.lookback,
            variant: args.model,
        },
    )?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
