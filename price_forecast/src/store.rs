//! Model stores: where trained models come from.
//!
//! [`FileModelStore`] persists [`TrainedModel`]s as JSON next to each other in
//! one directory. [`CachedModelStore`] wraps any store and keeps loaded models
//! in memory.

use crate::error::{ForecastError, Result};
use crate::model::{ModelVariant, PointPredictionModel, TrainedModel};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Source of ready-to-use point-prediction models
pub trait ModelStore {
    /// Load the model for `ticker`, or fail with `ModelNotFound`
    fn load(&self, ticker: &str, variant: ModelVariant) -> Result<Arc<dyn PointPredictionModel>>;
}

impl<S: ModelStore + ?Sized> ModelStore for &S {
    fn load(&self, ticker: &str, variant: ModelVariant) -> Result<Arc<dyn PointPredictionModel>> {
        (**self).load(ticker, variant)
    }
}

/// Models stored as `<dir>/<TICKER>_<variant>.json`
#[derive(Debug, Clone)]
pub struct FileModelStore {
    dir: PathBuf,
}

impl FileModelStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact for one ticker and variant
    pub fn model_path(&self, ticker: &str, variant: ModelVariant) -> PathBuf {
        self.dir.join(format!("{}_{}.json", ticker, variant))
    }

    /// Read the stored artifact without erasing its concrete type
    pub fn load_trained(&self, ticker: &str, variant: ModelVariant) -> Result<TrainedModel> {
        let path = self.model_path(ticker, variant);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ForecastError::ModelNotFound {
                    ticker: ticker.to_string(),
                    variant,
                })
            }
            Err(e) => return Err(e.into()),
        };

        let model: TrainedModel = serde_json::from_str(&contents)?;
        if model.variant() != variant {
            return Err(ForecastError::InvalidParameter(format!(
                "{} holds a {} model, expected {}",
                path.display(),
                model.variant(),
                variant
            )));
        }
        debug!(ticker, %variant, path = %path.display(), "loaded model");
        Ok(model)
    }

    /// Write a model, creating the directory if needed
    pub fn save(&self, ticker: &str, model: &TrainedModel) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.model_path(ticker, model.variant());
        fs::write(&path, serde_json::to_string(model)?)?;
        info!(ticker, variant = %model.variant(), path = %path.display(), "saved model");
        Ok(path)
    }
}

impl ModelStore for FileModelStore {
    fn load(&self, ticker: &str, variant: ModelVariant) -> Result<Arc<dyn PointPredictionModel>> {
        Ok(Arc::new(self.load_trained(ticker, variant)?))
    }
}

/// Memoises successful loads of an inner store. Failures are not cached, so a
/// model written after a miss is picked up on the next request.
pub struct CachedModelStore<S> {
    inner: S,
    cache: Mutex<HashMap<(String, ModelVariant), Arc<dyn PointPredictionModel>>>,
}

impl<S: ModelStore> CachedModelStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of cached models
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<(String, ModelVariant), Arc<dyn PointPredictionModel>>>
    {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S: ModelStore> ModelStore for CachedModelStore<S> {
    fn load(&self, ticker: &str, variant: ModelVariant) -> Result<Arc<dyn PointPredictionModel>> {
        let key = (ticker.to_string(), variant);
        if let Some(model) = self.lock().get(&key) {
            return Ok(Arc::clone(model));
        }

        let model = self.inner.load(ticker, variant)?;
        self.lock().insert(key, Arc::clone(&model));
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Regressor;
    use price_math::LinearRegression;

    #[test]
    fn test_model_path_layout() {
        let store = FileModelStore::new("/models");
        assert_eq!(
            store.model_path("AAPL", ModelVariant::Forest),
            PathBuf::from("/models/AAPL_forest.json")
        );
    }

    #[test]
    fn test_cache_serves_second_load_from_memory() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileModelStore::new(dir.path());
        let linear = LinearRegression::from_parameters(0.0, vec![1.0]).unwrap();
        files
            .save("MSFT", &TrainedModel::new(1, Regressor::Linear(linear)))
            .unwrap();

        let cached = CachedModelStore::new(files);
        let first = cached.load("MSFT", ModelVariant::Linear).unwrap();

        std::fs::remove_file(cached.inner().model_path("MSFT", ModelVariant::Linear)).unwrap();
        let second = cached.load("MSFT", ModelVariant::Linear).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cached.len(), 1);

        cached.clear();
        assert!(cached.is_empty());
        assert!(cached.load("MSFT", ModelVariant::Linear).is_err());
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cached = CachedModelStore::new(FileModelStore::new(dir.path()));

        assert!(matches!(
            cached.load("MSFT", ModelVariant::Linear),
            Err(ForecastError::ModelNotFound { .. })
        ));
        assert!(cached.is_empty());

        let linear = LinearRegression::from_parameters(2.0, vec![1.0]).unwrap();
        cached
            .inner()
            .save("MSFT", &TrainedModel::new(1, Regressor::Linear(linear)))
            .unwrap();

        let model = cached.load("MSFT", ModelVariant::Linear).unwrap();
        let features = crate::features::lag_vector(&[3.0], 1).unwrap();
        assert_eq!(model.predict(&features).unwrap(), 5.0);
        assert_eq!(cached.len(), 1);
    }
}
