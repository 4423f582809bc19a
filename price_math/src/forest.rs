//! Random forest regression: bagged regression trees averaged together.

use crate::tree::{DecisionTreeRegressor, TreeConfig};
use crate::{validate_design, validate_row, MathError, Result};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Random forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (n/3 rounded up if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 50,
            max_depth: 8,
            min_samples_split: 4,
            min_samples_leaf: 2,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// A fitted random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    n_features: usize,
    trees: Vec<DecisionTreeRegressor>,
}

impl RandomForestRegressor {
    /// Fit the forest. Trees are grown sequentially from per-tree seeds, so
    /// the same data and config always give the same forest.
    pub fn fit(features: &[Vec<f64>], labels: &[f64], config: ForestConfig) -> Result<Self> {
        let n_features = validate_design(features, labels)?;
        if config.n_trees == 0 {
            return Err(MathError::InvalidInput(
                "A forest needs at least one tree".to_string(),
            ));
        }

        let max_features = config
            .max_features
            .unwrap_or_else(|| n_features.div_ceil(3))
            .clamp(1, n_features);
        let n = features.len();

        let mut trees = Vec::with_capacity(config.n_trees);
        for t in 0..config.n_trees {
            // The bootstrap draw and the tree's feature sampling get
            // independent streams from the same per-tree generator.
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(t as u64));
            let tree_seed: u64 = rng.gen();
            let indices: Vec<usize> = if config.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            let tree_config = TreeConfig {
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                min_samples_leaf: config.min_samples_leaf,
                max_features: Some(max_features),
                seed: tree_seed,
            };
            trees.push(DecisionTreeRegressor::fit_indices(
                features,
                labels,
                &indices,
                tree_config,
            )?);
        }

        Ok(Self {
            config,
            n_features,
            trees,
        })
    }

    /// Mean of the tree predictions for one feature row
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        validate_row(row, self.n_features)?;
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.predict(row)?;
        }
        Ok(sum / self.trees.len() as f64)
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
