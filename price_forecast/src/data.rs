//! Locally cached company price histories.
//!
//! Each company lives in `<dir>/<TICKER>.json`:
//!
//! ```json
//! {
//!   "company_name": "Apple Inc.",
//!   "ticker": "AAPL",
//!   "history": [{ "date": "2024-03-08", "close": 170.73 }]
//! }
//! ```
//!
//! Extra fields in history entries (open, volume, ...) are ignored.

use crate::error::{ForecastError, Result};
use crate::series::PriceSeries;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Source of full price histories by ticker
pub trait PriceSeriesLoader {
    /// Load the history for `ticker`, or fail with `SeriesNotFound`
    fn load(&self, ticker: &str) -> Result<PriceSeries>;
}

impl<L: PriceSeriesLoader + ?Sized> PriceSeriesLoader for &L {
    fn load(&self, ticker: &str) -> Result<PriceSeries> {
        (**self).load(ticker)
    }
}

/// One cached company file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_name: String,
    pub ticker: String,
    pub history: PriceSeries,
}

/// Company name to ticker mapping, ordered by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyDirectory {
    tickers: BTreeMap<String, String>,
}

impl CompanyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, company_name: impl Into<String>, ticker: impl Into<String>) {
        self.tickers.insert(company_name.into(), ticker.into());
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.tickers.keys().cloned().collect()
    }

    pub fn tickers(&self) -> Vec<String> {
        self.tickers.values().cloned().collect()
    }

    /// Ticker for an exact company name
    pub fn ticker_for(&self, company_name: &str) -> Option<&str> {
        self.tickers.get(company_name).map(String::as_str)
    }

    /// First company (by name) whose name contains `query`, ignoring case.
    ///
    /// Returns `(company_name, ticker)`.
    pub fn search(&self, query: &str) -> Option<(&str, &str)> {
        let needle = query.to_lowercase();
        self.tickers
            .iter()
            .find(|(name, _)| name.to_lowercase().contains(&needle))
            .map(|(name, ticker)| (name.as_str(), ticker.as_str()))
    }
}

/// Directory of `<TICKER>.json` company files
#[derive(Debug, Clone)]
pub struct JsonDataCache {
    dir: PathBuf,
}

impl JsonDataCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.json", ticker))
    }

    /// Scan the directory and map company names to tickers.
    ///
    /// A missing directory yields an empty directory; files that can't be
    /// read or parsed are skipped.
    pub fn companies(&self) -> Result<CompanyDirectory> {
        let mut directory = CompanyDirectory::new();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(dir = %self.dir.display(), "data directory not found");
                return Ok(directory);
            }
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_record(&path) {
                Ok(record) => directory.insert(record.company_name, record.ticker),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping company file"),
            }
        }

        debug!(companies = directory.len(), "loaded company directory");
        Ok(directory)
    }

    /// Read one company file
    pub fn load_record(&self, ticker: &str) -> Result<CompanyRecord> {
        match read_record(&self.record_path(ticker)) {
            Err(ForecastError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ForecastError::SeriesNotFound {
                    ticker: ticker.to_string(),
                })
            }
            other => other,
        }
    }

    /// Write one company file
    pub fn save_record(&self, record: &CompanyRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.record_path(&record.ticker);
        fs::write(&path, serde_json::to_string_pretty(record)?)?;
        Ok(path)
    }
}

impl PriceSeriesLoader for JsonDataCache {
    fn load(&self, ticker: &str) -> Result<PriceSeries> {
        Ok(self.load_record(ticker)?.history)
    }
}

fn read_record(path: &Path) -> Result<CompanyRecord> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let mut directory = CompanyDirectory::new();
        directory.insert("Apple Inc.", "AAPL");
        directory.insert("Microsoft Corporation", "MSFT");

        assert_eq!(directory.search("micro"), Some(("Microsoft Corporation", "MSFT")));
        assert_eq!(directory.search("APPLE"), Some(("Apple Inc.", "AAPL")));
        assert_eq!(directory.search("tesla"), None);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let cache = JsonDataCache::new("/definitely/not/here");
        assert!(cache.companies().unwrap().is_empty());
    }

    #[test]
    fn test_missing_ticker_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonDataCache::new(dir.path());
        assert!(matches!(
            cache.load("NOPE"),
            Err(ForecastError::SeriesNotFound { .. })
        ));
    }
}
