//! Train forecasting models for cached company histories
//!
//! Usage: cargo run --bin train_models -- --data-dir data --models-dir models --variant linear --variant forest

use anyhow::{bail, Result};
use clap::Parser;
use price_forecast::config::ForecastConfig;
use price_forecast::data::JsonDataCache;
use price_forecast::model::ModelVariant;
use price_forecast::store::FileModelStore;
use price_forecast::training::{train_all, TrainingConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train price forecasting models from cached histories")]
struct Args {
    /// Directory of <TICKER>.json history files (defaults to STOCK_DATA_DIR or ./data)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory models are written to (defaults to STOCK_MODELS_DIR or ./models)
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Number of lagged closes per sample
    #[arg(short, long)]
    lookback: Option<usize>,

    /// Model variants to train (linear, forest); all when omitted
    #[arg(short, long = "variant")]
    variants: Vec<ModelVariant>,

    /// Only train these tickers; every cached ticker when omitted
    #[arg(short, long = "ticker")]
    tickers: Vec<String>,

    /// Fraction of newest samples held out for evaluation
    #[arg(long, default_value = "0.2")]
    test_ratio: f64,

    /// Trees per forest
    #[arg(long, default_value = "50")]
    trees: usize,

    /// Max tree depth
    #[arg(long, default_value = "8")]
    max_depth: usize,

    /// Seed for forest sampling
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = ForecastConfig::from_env()?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = args.models_dir {
        config.models_dir = dir;
    }
    if let Some(lookback) = args.lookback {
        config.lookback = lookback;
    }
    config.validate()?;

    let cache = JsonDataCache::new(&config.data_dir);
    let store = FileModelStore::new(&config.models_dir);

    let tickers = if args.tickers.is_empty() {
        cache.companies()?.tickers()
    } else {
        args.tickers
    };
    if tickers.is_empty() {
        bail!("no company files found in {}", config.data_dir.display());
    }

    let variants = if args.variants.is_empty() {
        ModelVariant::all().to_vec()
    } else {
        args.variants
    };

    let mut training = TrainingConfig {
        lookback: config.lookback,
        test_ratio: args.test_ratio,
        ..TrainingConfig::default()
    };
    training.forest.n_trees = args.trees;
    training.forest.max_depth = args.max_depth;
    training.forest.seed = args.seed;

    info!(tickers = tickers.len(), ?variants, lookback = config.lookback, "training");
    let summary = train_all(&cache, &store, &tickers, &variants, &training);

    println!("{:<8} {:<8} {:>8} {:>10} {:>10}", "TICKER", "MODEL", "SAMPLES", "MAE", "RMSE");
    for report in &summary.reports {
        match report.holdout {
            Some(h) => println!(
                "{:<8} {:<8} {:>8} {:>10.4} {:>10.4}",
                report.ticker, report.variant, report.samples, h.mae, h.rmse
            ),
            None => println!(
                "{:<8} {:<8} {:>8} {:>10} {:>10}",
                report.ticker, report.variant, report.samples, "-", "-"
            ),
        }
    }
    for failure in &summary.failures {
        let variant = failure
            .variant
            .map(|v| v.to_string())
            .unwrap_or_else(|| "*".to_string());
        println!("{:<8} {:<8} FAILED: {}", failure.ticker, variant, failure.error);
    }

    println!(
        "\nTrained {} model(s), {} failure(s). Models written to {}",
        summary.reports.len(),
        summary.failures.len(),
        store.dir().display()
    );
    Ok(())
}
