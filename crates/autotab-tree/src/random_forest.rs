use autotab_core::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::decision_tree::{DecisionTree, Target, TreeParams};
use crate::error::{TreeError, TreeResult};

/// How many features each split may look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(p))`, at least one.
    Sqrt,
    All,
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let p = n_features.max(1);
        match self {
            MaxFeatures::Sqrt => ((p as f64).sqrt() as usize).max(1),
            MaxFeatures::All => p,
        }
    }
}

/// Forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    /// Tree `i` draws from `StdRng::seed_from_u64(seed + i)`.
    pub seed: u64,
}

impl ForestParams {
    pub fn classification(n_estimators: usize, seed: u64) -> Self {
        ForestParams {
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed,
        }
    }

    pub fn regression(n_estimators: usize, seed: u64) -> Self {
        ForestParams {
            max_features: MaxFeatures::All,
            ..ForestParams::classification(n_estimators, seed)
        }
    }
}

/// Grow `n_estimators` trees in parallel. Each tree owns its RNG, so the
/// result does not depend on thread scheduling.
fn grow_forest(x: &Matrix, target: Target<'_>, params: &ForestParams) -> TreeResult<Vec<DecisionTree>> {
    if params.n_estimators == 0 {
        return Err(TreeError::InvalidParameter("n_estimators must be at least 1".into()));
    }
    let n = x.n_rows();
    if n == 0 {
        return Err(TreeError::EmptyTrainingSet);
    }
    let tree_params = TreeParams {
        max_depth: params.max_depth,
        min_samples_split: params.min_samples_split,
        max_features: Some(params.max_features.resolve(x.n_cols())),
    };

    (0..params.n_estimators)
        .into_par_iter()
        .map(|tree_idx| {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(tree_idx as u64));
            let samples: Vec<usize> = if params.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            DecisionTree::fit(x, target, samples, &tree_params, &mut rng)
        })
        .collect()
}

/// Mean of per-tree importances over trees that split at least once,
/// renormalized to sum to one. `None` when no tree ever split.
fn forest_importances(trees: &[DecisionTree], n_features: usize) -> Option<Vec<f64>> {
    let mut total = vec![0.0; n_features];
    let mut used = 0usize;
    for tree in trees.iter().filter(|t| t.has_splits()) {
        for (acc, v) in total.iter_mut().zip(tree.feature_importances()) {
            *acc += v;
        }
        used += 1;
    }
    if used == 0 {
        return None;
    }
    let sum: f64 = total.iter().sum();
    if sum <= 0.0 {
        return None;
    }
    total.iter_mut().for_each(|v| *v /= sum);
    Some(total)
}

fn check_width(x: &Matrix, n_features: usize) -> TreeResult<()> {
    if x.n_cols() != n_features {
        return Err(TreeError::FeatureCountMismatch {
            expected: n_features,
            got: x.n_cols(),
        });
    }
    Ok(())
}

// ─── Classifier ─────────────────────────────────────────────────────────────

/// Random forest classifier: bagged Gini trees with soft voting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    pub params: ForestParams,
    trees: Vec<DecisionTree>,
    n_classes: usize,
    n_features: usize,
}

impl RandomForestClassifier {
    pub fn new(params: ForestParams) -> Self {
        RandomForestClassifier {
            params,
            trees: Vec::new(),
            n_classes: 0,
            n_features: 0,
        }
    }

    /// Fit on encoded labels. The class count is `max(y) + 1`.
    pub fn fit(&mut self, x: &Matrix, y: &[usize]) -> TreeResult<()> {
        if x.n_rows() != y.len() {
            return Err(TreeError::LengthMismatch {
                x_rows: x.n_rows(),
                y_len: y.len(),
            });
        }
        let n_classes = y.iter().max().map(|m| m + 1).unwrap_or(0);
        let target = Target::Classes { labels: y, n_classes };
        self.trees = grow_forest(x, target, &self.params)?;
        self.n_classes = n_classes;
        self.n_features = x.n_cols();
        Ok(())
    }

    /// Class probabilities per row, averaged over all trees.
    pub fn predict_proba(&self, x: &Matrix) -> TreeResult<Vec<Vec<f64>>> {
        if self.trees.is_empty() {
            return Err(TreeError::NotFitted);
        }
        check_width(x, self.n_features)?;
        let n_trees = self.trees.len() as f64;
        Ok((0..x.n_rows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                let mut proba = vec![0.0; self.n_classes];
                for tree in &self.trees {
                    for (p, v) in proba.iter_mut().zip(tree.leaf_value(row)) {
                        *p += v;
                    }
                }
                proba.iter_mut().for_each(|p| *p /= n_trees);
                proba
            })
            .collect())
    }

    /// Most probable class per row; ties go to the lower class index.
    pub fn predict(&self, x: &Matrix) -> TreeResult<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.iter().map(|p| argmax(p)).collect())
    }

    pub fn feature_importances(&self) -> Option<Vec<f64>> {
        forest_importances(&self.trees, self.n_features)
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

// ─── Regressor ──────────────────────────────────────────────────────────────

/// Random forest regressor: bagged variance-reduction trees, averaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    pub params: ForestParams,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForestRegressor {
    pub fn new(params: ForestParams) -> Self {
        RandomForestRegressor {
            params,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn fit(&mut self, x: &Matrix, y: &[f64]) -> TreeResult<()> {
        if x.n_rows() != y.len() {
            return Err(TreeError::LengthMismatch {
                x_rows: x.n_rows(),
                y_len: y.len(),
            });
        }
        self.trees = grow_forest(x, Target::Values(y), &self.params)?;
        self.n_features = x.n_cols();
        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> TreeResult<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(TreeError::NotFitted);
        }
        check_width(x, self.n_features)?;
        let n_trees = self.trees.len() as f64;
        Ok((0..x.n_rows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                let sum: f64 = self.trees.iter().map(|t| t.leaf_value(row)[0]).sum();
                sum / n_trees
            })
            .collect())
    }

    pub fn feature_importances(&self) -> Option<Vec<f64>> {
        forest_importances(&self.trees, self.n_features)
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}
