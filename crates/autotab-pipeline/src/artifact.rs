use autotab_io::{decode_versioned, encode_versioned};
use autotab_preprocessing::{ColumnTransformer, LabelEncoder};
use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;
use crate::model::Model;
use crate::task::TaskType;

/// Envelope format name of serialized artifacts.
pub const ARTIFACT_FORMAT: &str = "autotab-artifact";
/// Newest artifact layout this build reads and the one it writes.
pub const ARTIFACT_VERSION: u32 = 1;

/// Everything needed to reproduce the training feature space and predict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingArtifact {
    pub transformer: ColumnTransformer,
    pub model: Model,
    pub task_type: TaskType,
    pub target_column: String,
    /// Present only for classification.
    pub label_encoder: Option<LabelEncoder>,
    /// Post-transform feature names, in model input order.
    pub feature_names: Vec<String>,
}

impl TrainingArtifact {
    pub fn to_bytes(&self) -> PipelineResult<Vec<u8>> {
        Ok(encode_versioned(ARTIFACT_FORMAT, ARTIFACT_VERSION, self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> PipelineResult<Self> {
        Ok(decode_versioned(bytes, ARTIFACT_FORMAT, ARTIFACT_VERSION)?)
    }
}
