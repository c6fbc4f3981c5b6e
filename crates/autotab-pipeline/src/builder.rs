use autotab_core::{DataFrame, Matrix, Value};
use autotab_preprocessing::{train_test_split_indices, ColumnTransformer, LabelEncoder};
use autotab_tree::{ForestParams, RandomForestClassifier, RandomForestRegressor};
use tracing::{debug, info, warn};

use crate::artifact::TrainingArtifact;
use crate::config::TrainConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::evaluation::{top_importances, FeatureImportance, Metrics};
use crate::model::Model;
use crate::task::{decide_task, ColumnProbe, TaskDecision, TaskType, Unresolvable};

/// Result of one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    pub artifact: TrainingArtifact,
    pub metrics: Metrics,
    /// Empty when the model could not report importances.
    pub top_feature_importances: Vec<FeatureImportance>,
}

impl TrainingOutcome {
    pub fn task_type(&self) -> TaskType {
        self.artifact.task_type
    }
}

/// Detects the target and task, then fits preprocessing and a forest on
/// a seeded training fold and scores it on the held-out fold.
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    config: TrainConfig,
}

/// Held-out split of features and raw target values.
struct Folds {
    train: DataFrame,
    test: DataFrame,
    train_idx: Vec<usize>,
    test_idx: Vec<usize>,
}

impl PipelineBuilder {
    pub fn new(config: TrainConfig) -> Self {
        PipelineBuilder { config }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn train(&self, frame: &DataFrame) -> PipelineResult<TrainingOutcome> {
        let (target, task_type) = self.resolve_task(frame)?;
        info!(target = %target, task = %task_type, rows = frame.n_rows(), "training started");

        let frame = drop_missing_targets(frame, &target)?;
        let targets = frame.require(&target)?.values().to_vec();
        let features = frame.drop_column(&target)?;

        let (train_idx, test_idx) =
            train_test_split_indices(frame.n_rows(), self.config.test_ratio, Some(self.config.seed))?;
        let folds = Folds {
            train: features.take_rows(&train_idx)?,
            test: features.take_rows(&test_idx)?,
            train_idx,
            test_idx,
        };

        let transformer = ColumnTransformer::fit(&folds.train)?;
        if transformer.n_features() == 0 {
            return Err(PipelineError::InvalidInput(
                "dataset has no usable feature columns".into(),
            ));
        }
        let x_train = transformer.transform(&folds.train)?;
        let x_test = transformer.transform(&folds.test)?;
        debug!(
            train_rows = x_train.n_rows(),
            test_rows = x_test.n_rows(),
            features = transformer.n_features(),
            "feature space built"
        );

        let (model, label_encoder, metrics) = match task_type {
            TaskType::Classification => {
                let (model, encoder, metrics) =
                    self.fit_classifier(&x_train, &x_test, &targets, &folds)?;
                (model, Some(encoder), metrics)
            }
            TaskType::Regression => {
                let (model, metrics) = self.fit_regressor(&x_train, &x_test, &targets, &folds)?;
                (model, None, metrics)
            }
        };

        let feature_names = transformer.feature_names().to_vec();
        let top_feature_importances = match top_importances(
            &feature_names,
            model.feature_importances(),
            self.config.top_k_importances,
        ) {
            Ok(top) => top,
            Err(PipelineError::ComputationDegraded(reason)) => {
                warn!(%reason, "feature importances unavailable");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        info!(task = %task_type, metrics = ?metrics, "training finished");
        Ok(TrainingOutcome {
            artifact: TrainingArtifact {
                transformer,
                model,
                task_type,
                target_column: target,
                label_encoder,
                feature_names,
            },
            metrics,
            top_feature_importances,
        })
    }

    fn resolve_task(&self, frame: &DataFrame) -> PipelineResult<(String, TaskType)> {
        let probes = ColumnProbe::from_frame(frame);
        match decide_task(
            &probes,
            &self.config.target_candidates,
            self.config.max_classification_cardinality,
        ) {
            TaskDecision::Classification { target } => Ok((target, TaskType::Classification)),
            TaskDecision::Regression { target } => Ok((target, TaskType::Regression)),
            TaskDecision::Unresolvable(Unresolvable::NoTargetColumn) => {
                Err(PipelineError::TargetNotFound)
            }
            TaskDecision::Unresolvable(reason) => Err(PipelineError::InvalidInput(reason.to_string())),
        }
    }

    fn fit_classifier(
        &self,
        x_train: &Matrix,
        x_test: &Matrix,
        targets: &[Value],
        folds: &Folds,
    ) -> PipelineResult<(Model, LabelEncoder, Metrics)> {
        let mut encoder = LabelEncoder::new();
        let y = encoder.fit_transform(targets)?;
        let y_train = pick(&y, &folds.train_idx);
        let y_test = pick(&y, &folds.test_idx);
        debug!(classes = encoder.n_classes(), "labels encoded");

        let mut forest = RandomForestClassifier::new(ForestParams::classification(
            self.config.n_estimators,
            self.config.seed,
        ));
        forest.fit(x_train, &y_train)?;
        let metrics = Metrics::classification(&y_test, &forest.predict(x_test)?)?;
        Ok((Model::RandomForestClassifier(forest), encoder, metrics))
    }

    fn fit_regressor(
        &self,
        x_train: &Matrix,
        x_test: &Matrix,
        targets: &[Value],
        folds: &Folds,
    ) -> PipelineResult<(Model, Metrics)> {
        let y = targets
            .iter()
            .map(|v| {
                v.as_f64().ok_or_else(|| {
                    PipelineError::InvalidInput(format!("non-numeric regression target '{}'", v))
                })
            })
            .collect::<PipelineResult<Vec<f64>>>()?;
        let y_train = pick(&y, &folds.train_idx);
        let y_test = pick(&y, &folds.test_idx);

        let mut forest = RandomForestRegressor::new(ForestParams::regression(
            self.config.n_estimators,
            self.config.seed,
        ));
        forest.fit(x_train, &y_train)?;
        let metrics = Metrics::regression(&y_test, &forest.predict(x_test)?)?;
        Ok((Model::RandomForestRegressor(forest), metrics))
    }
}

/// Rows whose target cell is missing cannot be learned from.
fn drop_missing_targets(frame: &DataFrame, target: &str) -> PipelineResult<DataFrame> {
    let keep: Vec<usize> = frame
        .require(target)?
        .values()
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_null())
        .map(|(i, _)| i)
        .collect();
    let dropped = frame.n_rows() - keep.len();
    if dropped > 0 {
        warn!(target, dropped, "dropping rows with a missing target");
    }
    if keep.len() < 2 {
        return Err(PipelineError::InvalidInput(format!(
            "target column '{}' needs at least 2 non-missing rows, found {}",
            target,
            keep.len()
        )));
    }
    Ok(frame.take_rows(&keep)?)
}

fn pick<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i].clone()).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use autotab_core::{Column, DType};

    /// 60 rows, three well separated text classes driven by `x`.
    pub(crate) fn species_frame() -> DataFrame {
        let names = ["setosa", "versicolor", "virginica"];
        let n = 60;
        let x: Vec<Value> = (0..n)
            .map(|i| Value::Number((i % 3) as f64 * 10.0 + (i % 7) as f64 * 0.1))
            .collect();
        let noise: Vec<Value> = (0..n).map(|i| Value::Number(((i * 37) % 11) as f64)).collect();
        let color: Vec<Value> = (0..n)
            .map(|i| if i % 5 == 0 { Value::Null } else { Value::text(["red", "blue"][i % 2]) })
            .collect();
        let species: Vec<Value> = (0..n).map(|i| Value::text(names[i % 3])).collect();
        DataFrame::new(vec![
            Column::new("x", DType::Float, x),
            Column::new("noise", DType::Int, noise),
            Column::new("color", DType::Text, color),
            Column::new(" Label ", DType::Text, species),
        ])
        .unwrap()
    }

    /// `y = 3a - b` over 200 distinct values.
    pub(crate) fn linear_frame() -> DataFrame {
        let n = 200;
        let a: Vec<f64> = (0..n).map(|i| i as f64 * 0.5).collect();
        let b: Vec<f64> = (0..n).map(|i| ((i * 13) % 17) as f64).collect();
        let y: Vec<Value> = a
            .iter()
            .zip(&b)
            .map(|(a, b)| Value::Number(3.0 * a - b + 0.001 * a * a))
            .collect();
        DataFrame::new(vec![
            Column::new("a", DType::Float, a.into_iter().map(Value::Number).collect()),
            Column::new("b", DType::Float, b.into_iter().map(Value::Number).collect()),
            Column::new("target", DType::Float, y),
        ])
        .unwrap()
    }

    fn small_config() -> TrainConfig {
        TrainConfig {
            n_estimators: 20,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_text_target_trains_classifier() {
        let outcome = PipelineBuilder::new(small_config()).train(&species_frame()).unwrap();
        assert_eq!(outcome.task_type(), TaskType::Classification);
        assert_eq!(outcome.artifact.target_column, " Label ");
        assert!(outcome.artifact.label_encoder.is_some());
        assert_eq!(
            outcome.artifact.feature_names,
            vec!["x", "noise", "color_blue", "color_red"]
        );
        match outcome.metrics {
            Metrics::Classification { accuracy, .. } => assert!(accuracy >= 0.9),
            other => panic!("unexpected metrics {:?}", other),
        }
        assert_eq!(outcome.top_feature_importances[0].feature, "x");
    }

    #[test]
    fn test_numeric_target_trains_regressor() {
        let outcome = PipelineBuilder::new(small_config()).train(&linear_frame()).unwrap();
        assert_eq!(outcome.task_type(), TaskType::Regression);
        assert!(outcome.artifact.label_encoder.is_none());
        match outcome.metrics {
            Metrics::Regression { r2, rmse } => {
                assert!(r2 > 0.9);
                assert!(rmse > 0.0);
            }
            other => panic!("unexpected metrics {:?}", other),
        }
    }

    #[test]
    fn test_training_is_deterministic() {
        let builder = PipelineBuilder::new(small_config());
        let a = builder.train(&species_frame()).unwrap();
        let b = builder.train(&species_frame()).unwrap();
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.top_feature_importances, b.top_feature_importances);
        assert_eq!(a.artifact, b.artifact);
    }

    #[test]
    fn test_importances_are_sorted_and_bounded() {
        let outcome = PipelineBuilder::new(small_config()).train(&species_frame()).unwrap();
        let top = &outcome.top_feature_importances;
        assert!(!top.is_empty() && top.len() <= 10);
        assert!(top.windows(2).all(|w| w[0].importance >= w[1].importance));
    }

    #[test]
    fn test_missing_target_column() {
        let df = linear_frame().drop_column("target").unwrap();
        assert!(matches!(
            PipelineBuilder::default().train(&df),
            Err(PipelineError::TargetNotFound)
        ));
    }

    #[test]
    fn test_rows_without_target_are_dropped() {
        let df = DataFrame::new(vec![
            Column::new(
                "x",
                DType::Float,
                vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)],
            ),
            Column::new("target", DType::Float, vec![Value::Null, Value::Null, Value::Number(1.0)]),
        ])
        .unwrap();
        assert!(matches!(
            PipelineBuilder::default().train(&df),
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_no_feature_columns() {
        let df = DataFrame::new(vec![Column::new(
            "target",
            DType::Text,
            (0..10).map(|i| Value::text(["a", "b"][i % 2])).collect(),
        )])
        .unwrap();
        assert!(matches!(
            PipelineBuilder::default().train(&df),
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_artifact_bytes_round_trip() {
        let outcome = PipelineBuilder::new(small_config()).train(&species_frame()).unwrap();
        let bytes = outcome.artifact.to_bytes().unwrap();
        let back = TrainingArtifact::from_bytes(&bytes).unwrap();
        assert_eq!(back.feature_names, outcome.artifact.feature_names);
        assert_eq!(back.task_type, TaskType::Classification);
        assert_eq!(back.label_encoder, outcome.artifact.label_encoder);
        assert!(matches!(
            TrainingArtifact::from_bytes(b"{\"format\":\"other\",\"version\":1,\"payload\":null}"),
            Err(PipelineError::Artifact(_))
        ));
    }
}
