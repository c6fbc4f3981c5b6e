use autotab_pipeline::TrainConfig;
use autotab_profile::{ProfileConfig, SchemaConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ServiceError, ServiceResult};

/// All tunables in one place. Missing sections and fields keep their
/// defaults, so a partial JSON file is enough.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub schema: SchemaConfig,
    pub profile: ProfileConfig,
    pub train: TrainConfig,
}

impl ServiceConfig {
    pub fn from_json(bytes: &[u8]) -> ServiceResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| ServiceError::InvalidInput(format!("invalid configuration: {}", e)))
    }

    pub fn load(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            ServiceError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&bytes)
    }
}
