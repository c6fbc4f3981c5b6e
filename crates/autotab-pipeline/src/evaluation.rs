use autotab_metrics::{accuracy, f1_weighted, precision_weighted, r2_score, recall_weighted, rmse};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Held-out scores. Serializes as a flat object with exactly the keys of
/// the active variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metrics {
    Classification {
        accuracy: f64,
        precision: f64,
        recall: f64,
        f1_score: f64,
    },
    Regression {
        rmse: f64,
        r2: f64,
    },
}

impl Metrics {
    /// Weighted averages; per-class zero divisions count as 0.
    pub fn classification(y_true: &[usize], y_pred: &[usize]) -> PipelineResult<Self> {
        Ok(Metrics::Classification {
            accuracy: accuracy(y_true, y_pred)?,
            precision: precision_weighted(y_true, y_pred)?,
            recall: recall_weighted(y_true, y_pred)?,
            f1_score: f1_weighted(y_true, y_pred)?,
        })
    }

    pub fn regression(y_true: &[f64], y_pred: &[f64]) -> PipelineResult<Self> {
        Ok(Metrics::Regression {
            rmse: rmse(y_true, y_pred)?,
            r2: r2_score(y_true, y_pred)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// The `k` largest importances, descending, rounded to 5 decimals.
/// Equal importances keep feature order.
pub fn top_importances(
    names: &[String],
    importances: Option<Vec<f64>>,
    k: usize,
) -> PipelineResult<Vec<FeatureImportance>> {
    let importances = importances.ok_or_else(|| {
        PipelineError::ComputationDegraded("model exposes no feature importances".into())
    })?;
    if importances.len() != names.len() {
        return Err(PipelineError::ComputationDegraded(format!(
            "{} importances for {} features",
            importances.len(),
            names.len()
        )));
    }
    let mut order: Vec<usize> = (0..names.len()).collect();
    order.sort_by(|&a, &b| importances[b].total_cmp(&importances[a]));
    Ok(order
        .into_iter()
        .take(k)
        .map(|i| FeatureImportance {
            feature: names[i].clone(),
            importance: (importances[i] * 1e5).round() / 1e5,
        })
        .collect())
}
