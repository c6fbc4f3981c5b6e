//! Automatic target detection, training and prediction over tabular data.
//!
//! [`PipelineBuilder`] turns a [`DataFrame`](autotab_core::DataFrame) into a
//! [`TrainingArtifact`]; [`Predictor`] serves that artifact against raw
//! records.

pub mod artifact;
pub mod builder;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod model;
pub mod predictor;
pub mod task;

pub use artifact::{TrainingArtifact, ARTIFACT_FORMAT, ARTIFACT_VERSION};
pub use builder::{PipelineBuilder, TrainingOutcome};
pub use config::{TrainConfig, MAX_CLASSIFICATION_CARDINALITY};
pub use error::{PipelineError, PipelineResult};
pub use evaluation::{top_importances, FeatureImportance, Metrics};
pub use model::{Model, Predictions};
pub use predictor::Predictor;
pub use task::{decide_task, find_target, ColumnProbe, TaskDecision, TaskType, Unresolvable};
