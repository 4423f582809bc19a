//! Regression tree (CART) fitted by variance reduction.

use crate::{validate_design, validate_row, MathError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Regression tree configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of the tree (a lone leaf has depth 0)
    pub max_depth: usize,
    /// Minimum samples a node needs before it may split
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// Seed for feature subsampling
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            min_samples_split: 4,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

impl TreeConfig {
    fn validate(&self) -> Result<()> {
        if self.min_samples_leaf == 0 {
            return Err(MathError::InvalidInput(
                "min_samples_leaf must be positive".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(MathError::InvalidInput(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.max_features == Some(0) {
            return Err(MathError::InvalidInput(
                "max_features must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
        samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => left.leaves() + right.leaves(),
        }
    }
}

/// Best split found for one node
struct Split {
    feature: usize,
    threshold: f64,
    /// Sum of squared errors of both children
    sse: f64,
}

/// A fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    config: TreeConfig,
    n_features: usize,
    root: Node,
}

impl DecisionTreeRegressor {
    /// Fit a tree on all rows
    pub fn fit(features: &[Vec<f64>], labels: &[f64], config: TreeConfig) -> Result<Self> {
        let indices: Vec<usize> = (0..features.len()).collect();
        Self::fit_indices(features, labels, &indices, config)
    }

    /// Fit a tree on a subset of rows. Indices may repeat (bootstrap samples).
    pub fn fit_indices(
        features: &[Vec<f64>],
        labels: &[f64],
        indices: &[usize],
        config: TreeConfig,
    ) -> Result<Self> {
        let n_features = validate_design(features, labels)?;
        config.validate()?;
        if indices.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a tree on zero samples".to_string(),
            ));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= features.len()) {
            return Err(MathError::InvalidInput(format!(
                "Sample index {} out of range",
                bad
            )));
        }

        let mut builder = Builder {
            features,
            labels,
            config: &config,
            n_features,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        };
        let root = builder.build(indices.to_vec(), 0);

        Ok(Self {
            config,
            n_features,
            root,
        })
    }

    /// Predict a single value from one feature row
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        validate_row(row, self.n_features)?;

        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value, .. } => return Ok(*value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn n_leaves(&self) -> usize {
        self.root.leaves()
    }
}

struct Builder<'a> {
    features: &'a [Vec<f64>],
    labels: &'a [f64],
    config: &'a TreeConfig,
    n_features: usize,
    rng: ChaCha8Rng,
}

impl Builder<'_> {
    fn build(&mut self, indices: Vec<usize>, depth: usize) -> Node {
        let n = indices.len();
        let mean = indices.iter().map(|&i| self.labels[i]).sum::<f64>() / n as f64;
        let sse = indices
            .iter()
            .map(|&i| (self.labels[i] - mean).powi(2))
            .sum::<f64>();

        let leaf = Node::Leaf {
            value: mean,
            samples: n,
        };

        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || sse <= f64::EPSILON * (n as f64) * mean.abs().max(1.0).powi(2)
        {
            return leaf;
        }

        let split = match self.best_split(&indices, mean) {
            Some(split) if split.sse < sse => split,
            _ => return leaf,
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.features[i][split.feature] <= split.threshold);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(left, depth + 1)),
            right: Box::new(self.build(right, depth + 1)),
        }
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        let mut all: Vec<usize> = (0..self.n_features).collect();
        match self.config.max_features {
            Some(k) if k < self.n_features => {
                all.shuffle(&mut self.rng);
                all.truncate(k);
                all
            }
            _ => all,
        }
    }

    /// Labels are centred on the node mean before accumulating so the
    /// running sums stay small for high-priced series.
    fn best_split(&mut self, indices: &[usize], mean: f64) -> Option<Split> {
        let min_leaf = self.config.min_samples_leaf;
        let n = indices.len();
        let mut best: Option<Split> = None;

        for feature in self.candidate_features() {
            let mut sorted = indices.to_vec();
            sorted.sort_by(|&a, &b| {
                self.features[a][feature].total_cmp(&self.features[b][feature])
            });

            let total_sum: f64 = sorted.iter().map(|&i| self.labels[i] - mean).sum();
            let total_sq: f64 = sorted.iter().map(|&i| (self.labels[i] - mean).powi(2)).sum();

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 0..n - 1 {
                let y = self.labels[sorted[k]] - mean;
                left_sum += y;
                left_sq += y * y;

                let left_n = k + 1;
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let here = self.features[sorted[k]][feature];
                let next = self.features[sorted[k + 1]][feature];
                if here == next {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / left_n as f64)
                    + (right_sq - right_sum * right_sum / right_n as f64);

                if best.as_ref().map_or(true, |b| sse < b.sse) {
                    best = Some(Split {
                        feature,
                        threshold: (here + next) / 2.0,
                        sse,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_labels_give_single_leaf() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let labels = vec![7.0; 4];

        let tree = DecisionTreeRegressor::fit(&features, &labels, TreeConfig::default()).unwrap();
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.predict(&[10.0]).unwrap(), 7.0);
    }

    #[test]
    fn test_high_priced_constant_labels_give_single_leaf() {
        let features: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 7) as f64]).collect();
        let labels = vec![123_456.789; 40];

        let tree = DecisionTreeRegressor::fit(&features, &labels, TreeConfig::default()).unwrap();
        assert_eq!(tree.n_leaves(), 1);
        assert!((tree.predict(&[3.0, 3.0]).unwrap() - 123_456.789).abs() < 1e-6);
    }

    #[test]
    fn test_high_priced_step_is_still_split() {
        let features: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let labels: Vec<f64> = (0..20)
            .map(|i| if i < 10 { 1_000_000.0 } else { 1_000_010.0 })
            .collect();

        let tree = DecisionTreeRegressor::fit(&features, &labels, TreeConfig::default()).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(&[2.0]).unwrap(), 1_000_000.0);
        assert_eq!(tree.predict(&[15.0]).unwrap(), 1_000_010.0);
    }

    #[test]
    fn test_step_function_is_learned() {
        let features: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let labels: Vec<f64> = (0..10).map(|i| if i < 5 { 1.0 } else { 9.0 }).collect();

        let tree = DecisionTreeRegressor::fit(&features, &labels, TreeConfig::default()).unwrap();
        assert_eq!(tree.predict(&[2.0]).unwrap(), 1.0);
        assert_eq!(tree.predict(&[7.0]).unwrap(), 9.0);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_max_depth_zero_is_mean() {
        let features = vec![vec![1.0], vec![2.0]];
        let labels = vec![2.0, 4.0];
        let config = TreeConfig {
            max_depth: 0,
            ..TreeConfig::default()
        };

        let tree = DecisionTreeRegressor::fit(&features, &labels, config).unwrap();
        assert_eq!(tree.predict(&[1.0]).unwrap(), 3.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = TreeConfig {
            min_samples_leaf: 0,
            ..TreeConfig::default()
        };
        assert!(DecisionTreeRegressor::fit(&[vec![1.0]], &[1.0], config).is_err());
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let result =
            DecisionTreeRegressor::fit_indices(&[vec![1.0]], &[1.0], &[3], TreeConfig::default());
        assert!(matches!(result, Err(MathError::InvalidInput(_))));
    }
}
