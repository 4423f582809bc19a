use assert_approx_eq::assert_approx_eq;
use chrono::NaiveDate;
use price_forecast::calendar::business_days_after;
use price_forecast::config::{ForecastConfig, ForecastHorizon, HistoryWindow};
use price_forecast::data::JsonDataCache;
use price_forecast::model::Regressor;
use price_forecast::service::{ForecastService, PredictionRequest};
use price_forecast::store::FileModelStore;
use price_forecast::training::{train_all, TrainingConfig};
use price_forecast::{ForecastError, ModelVariant, TrainedModel};
use price_math::{ForestConfig, LinearRegression};
use rstest::rstest;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Writes a company file with one close per business day starting 2024-01-01
fn write_company(dir: &Path, name: &str, ticker: &str, closes: &[f64]) {
    let dates = business_days_after(NaiveDate::from_ymd_opt(2023, 12, 29).unwrap(), closes.len());
    let history: Vec<serde_json::Value> = dates
        .iter()
        .zip(closes)
        .map(|(d, c)| serde_json::json!({ "date": d.to_string(), "close": c, "volume": 1000 }))
        .collect();
    let record = serde_json::json!({
        "company_name": name,
        "ticker": ticker,
        "history": history,
    });
    fs::write(dir.join(format!("{}.json", ticker)), record.to_string()).unwrap();
}

struct Fixture {
    _root: TempDir,
    config: ForecastConfig,
}

/// ACME rises by one every business day for 60 days; TINY has three closes
fn fixture() -> Fixture {
    let root = tempfile::tempdir().unwrap();
    let data_dir = root.path().join("data");
    let models_dir = root.path().join("models");
    fs::create_dir_all(&data_dir).unwrap();

    let acme: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
    write_company(&data_dir, "Acme Corporation", "ACME", &acme);
    write_company(&data_dir, "Tiny Holdings", "TINY", &[10.0, 11.0, 12.0]);
    fs::write(data_dir.join("README.txt"), "not a company").unwrap();
    fs::write(data_dir.join("BROKEN.json"), "{ not json").unwrap();

    let config = ForecastConfig {
        data_dir,
        models_dir,
        ..ForecastConfig::default()
    };
    Fixture {
        _root: root,
        config,
    }
}

fn train(config: &ForecastConfig) -> price_forecast::training::TrainingSummary {
    let cache = JsonDataCache::new(&config.data_dir);
    let store = FileModelStore::new(&config.models_dir);
    let tickers = cache.companies().unwrap().tickers();
    let training = TrainingConfig {
        forest: ForestConfig {
            n_trees: 10,
            ..ForestConfig::default()
        },
        ..TrainingConfig::default()
    };
    train_all(&cache, &store, &tickers, &ModelVariant::all(), &training)
}

#[test]
fn test_training_saves_models_and_reports_failures() {
    let fx = fixture();
    let summary = train(&fx.config);

    assert_eq!(summary.reports.len(), 2);
    assert!(summary.reports.iter().all(|r| r.ticker == "ACME"));
    assert!(summary.reports.iter().all(|r| r.samples == 55));
    assert!(summary.reports.iter().all(|r| r.holdout.is_some()));

    assert_eq!(summary.failures.len(), 2);
    assert!(summary.failures.iter().all(|f| matches!(
        f.error,
        ForecastError::EmptyFeatureSet {
            lookback: 5,
            points: 3
        }
    )));

    assert!(fx.config.models_dir.join("ACME_linear.json").exists());
    assert!(fx.config.models_dir.join("ACME_forest.json").exists());
    assert!(!fx.config.models_dir.join("TINY_linear.json").exists());
}

#[test]
fn test_company_listing_and_lookup() {
    let fx = fixture();
    let service = ForecastService::from_config(fx.config.clone()).unwrap();

    assert_eq!(
        service.companies(),
        vec!["Acme Corporation".to_string(), "Tiny Holdings".to_string()]
    );

    let record = service.lookup("acme").unwrap();
    assert_eq!(record.ticker, "ACME");
    assert_eq!(record.history.len(), 60);

    assert!(matches!(
        service.lookup("globex"),
        Err(ForecastError::CompanyNotFound(_))
    ));
}

#[test]
fn test_history_windows() {
    let fx = fixture();
    let service = ForecastService::from_config(fx.config.clone()).unwrap();

    // Last close is Friday 2024-03-22; one week back reaches Friday 2024-03-15
    let week = service
        .history("Acme Corporation", HistoryWindow::parse("1W"))
        .unwrap();
    assert_eq!(week.ticker, "ACME");
    assert_eq!(week.history.len(), 6);
    assert_eq!(
        week.history.points()[0].date,
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    );

    let all = service
        .history("Acme Corporation", HistoryWindow::parse("forever"))
        .unwrap();
    assert_eq!(all.history.len(), 60);

    assert!(service.history("Acme", HistoryWindow::OneYear).is_err());
}

#[rstest]
#[case("1D", (2024, 3, 21), 2)]
#[case("1W", (2024, 3, 15), 6)]
#[case("1M", (2024, 2, 21), 23)]
#[case("6M", (2023, 9, 22), 60)]
#[case("1Y", (2023, 3, 23), 60)]
#[case("5Y", (2019, 3, 24), 60)]
fn test_history_window_bounds(
    #[case] label: &str,
    #[case] start: (i32, u32, u32),
    #[case] points: usize,
) {
    let end = NaiveDate::from_ymd_opt(2024, 3, 22).unwrap();
    let window = HistoryWindow::parse(label);
    let expected = NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap();
    assert_eq!(window.start_date(end), Some(expected));

    let fx = fixture();
    let service = ForecastService::from_config(fx.config.clone()).unwrap();
    let history = service.history("Acme Corporation", window).unwrap();
    assert_eq!(history.history.len(), points);
}

#[test]
fn test_linear_forecast_extends_trend() {
    let fx = fixture();
    train(&fx.config);
    let service = ForecastService::from_config(fx.config.clone()).unwrap();

    let report = service
        .predict(
            "Acme Corporation",
            PredictionRequest {
                horizon: ForecastHorizon::parse("1W"),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(report.ticker, "ACME");
    assert_eq!(report.model, ModelVariant::Linear);
    assert_eq!(report.predictions.len(), 7);
    for (i, close) in report.predictions.closes().iter().enumerate() {
        assert_approx_eq!(*close, 160.0 + i as f64, 1e-4);
    }
    assert_eq!(
        report.predictions.points()[0].date,
        NaiveDate::from_ymd_opt(2024, 3, 25).unwrap()
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["timeframe"], "1W");
    assert_eq!(json["predictions"].as_array().unwrap().len(), 7);
}

#[test]
fn test_forest_forecast_stays_in_training_range() {
    let fx = fixture();
    train(&fx.config);
    let service = ForecastService::from_config(fx.config.clone()).unwrap();

    let report = service
        .predict(
            "Acme Corporation",
            PredictionRequest {
                horizon: ForecastHorizon::OneDay,
                lookback: None,
                variant: Some("tree".parse().unwrap()),
            },
        )
        .unwrap();

    assert_eq!(report.model, ModelVariant::Forest);
    assert_eq!(report.predictions.len(), 1);
    let close = report.predictions.points()[0].close;
    assert!((105.0..=159.0).contains(&close));
}

#[test]
fn test_missing_model_is_not_found_with_context() {
    let fx = fixture();
    let service = ForecastService::from_config(fx.config.clone()).unwrap();

    let err = service
        .predict("Acme Corporation", PredictionRequest::default())
        .unwrap_err();
    assert!(err.is_not_found());
    match err {
        ForecastError::ForecastFailed {
            ticker,
            lookback,
            horizon,
            source,
        } => {
            assert_eq!(ticker, "ACME");
            assert_eq!(lookback, 5);
            assert_eq!(horizon, 7);
            assert!(matches!(*source, ForecastError::ModelNotFound { .. }));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_short_history_cannot_forecast() {
    let fx = fixture();
    let store = FileModelStore::new(&fx.config.models_dir);
    let linear = LinearRegression::from_parameters(0.0, vec![1.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
    store
        .save("TINY", &TrainedModel::new(5, Regressor::Linear(linear)))
        .unwrap();

    let service = ForecastService::from_config(fx.config.clone()).unwrap();
    let err = service
        .predict("Tiny Holdings", PredictionRequest::default())
        .unwrap_err();

    assert!(!err.is_not_found());
    match err {
        ForecastError::ForecastFailed { source, .. } => assert!(matches!(
            *source,
            ForecastError::InsufficientHistory {
                required: 5,
                available: 3
            }
        )),
        other => panic!("unexpected error: {:?}", other),
    }

    // A lookback the model wasn't trained with fails inside the model
    let err = service
        .predict(
            "Tiny Holdings",
            PredictionRequest {
                lookback: Some(2),
                ..Default::default()
            },
        )
        .unwrap_err();
    match err {
        ForecastError::ForecastFailed { source, .. } => {
            assert!(matches!(*source, ForecastError::ModelInvocation(_)))
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_unknown_company_is_not_wrapped() {
    let fx = fixture();
    let service = ForecastService::from_config(fx.config.clone()).unwrap();
    assert!(matches!(
        service.predict("Globex", PredictionRequest::default()),
        Err(ForecastError::CompanyNotFound(_))
    ));
}
