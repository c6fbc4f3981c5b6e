//! Persistence collaborators: session records and opaque blobs.

pub mod file;
pub mod memory;

pub use file::{FileBlobStore, FileSessionStore};
pub use memory::{MemoryBlobStore, MemorySessionStore};

use autotab_pipeline::{FeatureImportance, Metrics, TaskType};
use autotab_profile::{ColumnSchema, ProfileReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::ids::{BlobId, SessionId};

/// Everything known about one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub raw_blob: Option<BlobId>,
    pub num_rows: usize,
    pub num_columns: usize,
    pub schema: Vec<ColumnSchema>,
    pub profile: Option<ProfileReport>,
    pub artifact_blob: Option<BlobId>,
    pub task_type: Option<TaskType>,
    pub target_column: Option<String>,
    pub metrics: Option<Metrics>,
    #[serde(default)]
    pub top_feature_importances: Vec<FeatureImportance>,
}

/// One stage's contribution to a session record.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Ingested {
        raw_blob: BlobId,
        schema: Vec<ColumnSchema>,
        num_rows: usize,
        num_columns: usize,
    },
    Profiled(ProfileReport),
    Trained {
        artifact_blob: BlobId,
        task_type: TaskType,
        target_column: String,
        metrics: Metrics,
        top_feature_importances: Vec<FeatureImportance>,
    },
}

impl SessionRecord {
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        SessionRecord {
            id,
            created_at: now,
            updated_at: now,
            raw_blob: None,
            num_rows: 0,
            num_columns: 0,
            schema: Vec::new(),
            profile: None,
            artifact_blob: None,
            task_type: None,
            target_column: None,
            metrics: None,
            top_feature_importances: Vec::new(),
        }
    }

    /// Overwrite the fields owned by `update`. Applying the same update
    /// twice leaves the same record apart from `updated_at`.
    pub fn apply(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::Ingested {
                raw_blob,
                schema,
                num_rows,
                num_columns,
            } => {
                self.raw_blob = Some(raw_blob);
                self.schema = schema;
                self.num_rows = num_rows;
                self.num_columns = num_columns;
            }
            SessionUpdate::Profiled(report) => self.profile = Some(report),
            SessionUpdate::Trained {
                artifact_blob,
                task_type,
                target_column,
                metrics,
                top_feature_importances,
            } => {
                self.artifact_blob = Some(artifact_blob);
                self.task_type = Some(task_type);
                self.target_column = Some(target_column);
                self.metrics = Some(metrics);
                self.top_feature_importances = top_feature_importances;
            }
        }
        self.updated_at = Utc::now();
    }
}

/// Key-value session metadata. Upserts create the record when absent;
/// concurrent writers to one session race and the last one wins.
pub trait SessionStore: Send + Sync {
    fn get(&self, id: &SessionId) -> StoreResult<Option<SessionRecord>>;

    fn upsert(&self, id: &SessionId, update: SessionUpdate) -> StoreResult<SessionRecord>;
}

/// Id-addressed storage for raw datasets and serialized artifacts.
pub trait BlobStore: Send + Sync {
    fn put(&self, bytes: Vec<u8>) -> StoreResult<BlobId>;

    fn get(&self, id: &BlobId) -> StoreResult<Option<Vec<u8>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_touches_owned_fields() {
        let mut record = SessionRecord::new(SessionId::new());
        let blob = BlobId::new();
        record.apply(SessionUpdate::Ingested {
            raw_blob: blob,
            schema: Vec::new(),
            num_rows: 10,
            num_columns: 3,
        });
        record.apply(SessionUpdate::Profiled(ProfileReport::default()));
        assert_eq!(record.raw_blob, Some(blob));
        assert_eq!((record.num_rows, record.num_columns), (10, 3));
        assert!(record.profile.is_some());
        assert!(record.artifact_blob.is_none());
        assert!(record.updated_at >= record.created_at);
    }
}
