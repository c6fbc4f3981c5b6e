use autotab_core::Matrix;
use autotab_tree::{RandomForestClassifier, RandomForestRegressor, TreeResult};
use serde::{Deserialize, Serialize};

use crate::task::TaskType;

/// The fitted estimator, one fixed family per task type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    RandomForestClassifier(RandomForestClassifier),
    RandomForestRegressor(RandomForestRegressor),
}

/// Raw model output before label decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Predictions {
    Classes(Vec<usize>),
    Values(Vec<f64>),
}

impl Model {
    pub fn task_type(&self) -> TaskType {
        match self {
            Model::RandomForestClassifier(_) => TaskType::Classification,
            Model::RandomForestRegressor(_) => TaskType::Regression,
        }
    }

    pub fn predict(&self, x: &Matrix) -> TreeResult<Predictions> {
        match self {
            Model::RandomForestClassifier(m) => Ok(Predictions::Classes(m.predict(x)?)),
            Model::RandomForestRegressor(m) => Ok(Predictions::Values(m.predict(x)?)),
        }
    }

    pub fn feature_importances(&self) -> Option<Vec<f64>> {
        match self {
            Model::RandomForestClassifier(m) => m.feature_importances(),
            Model::RandomForestRegressor(m) => m.feature_importances(),
        }
    }
}
