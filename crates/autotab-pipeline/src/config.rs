use serde::{Deserialize, Serialize};

/// Target distinct-count below which a numeric target is treated as classes.
pub const MAX_CLASSIFICATION_CARDINALITY: usize = 20;

/// Training knobs. Defaults reproduce the fixed 80/20, seed 42, 100-tree setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Accepted target names, compared trimmed and case-insensitively.
    pub target_candidates: Vec<String>,
    pub max_classification_cardinality: usize,
    pub test_ratio: f64,
    pub seed: u64,
    pub n_estimators: usize,
    pub top_k_importances: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            target_candidates: vec!["target".to_string(), "label".to_string()],
            max_classification_cardinality: MAX_CLASSIFICATION_CARDINALITY,
            test_ratio: 0.2,
            seed: 42,
            n_estimators: 100,
            top_k_importances: 10,
        }
    }
}
