use autotab_core::{DataFrame, Record, Value};
use autotab_io::read_csv_bytes;
use autotab_pipeline::{
    FeatureImportance, Metrics, PipelineBuilder, PipelineError, Predictor, TaskType, TrainingArtifact,
};
use autotab_profile::{ColumnSchema, ProfileReport, Profiler, SchemaInferencer};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::ids::{BlobId, SessionId};
use crate::store::{BlobStore, MemoryBlobStore, MemorySessionStore, SessionRecord, SessionStore, SessionUpdate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub session_id: SessionId,
    pub schema: Vec<ColumnSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainResponse {
    pub task_type: TaskType,
    pub artifact_id: BlobId,
    pub metrics: Metrics,
    pub top_feature_importances: Vec<FeatureImportance>,
}

/// The four public operations over injected session and blob stores.
///
/// Every call works on its own copy of the session's data; the only
/// shared state is the stores themselves.
pub struct AutoTab<S, B> {
    config: ServiceConfig,
    sessions: S,
    blobs: B,
}

impl AutoTab<MemorySessionStore, MemoryBlobStore> {
    pub fn in_memory(config: ServiceConfig) -> Self {
        AutoTab::new(config, MemorySessionStore::new(), MemoryBlobStore::new())
    }
}

impl<S: SessionStore, B: BlobStore> AutoTab<S, B> {
    pub fn new(config: ServiceConfig, sessions: S, blobs: B) -> Self {
        AutoTab {
            config,
            sessions,
            blobs,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn session(&self, id: &SessionId) -> ServiceResult<SessionRecord> {
        self.sessions
            .get(id)?
            .ok_or_else(|| ServiceError::not_found("session", id))
    }

    /// Parse and store a CSV upload, opening a new session.
    pub fn ingest(&self, raw: Vec<u8>) -> ServiceResult<IngestResponse> {
        let frame = read_csv_bytes(&raw)?;
        let schema = SchemaInferencer::new(self.config.schema.clone()).infer(&frame);
        let (num_rows, num_columns) = frame.shape();

        let raw_blob = self.blobs.put(raw)?;
        let session_id = SessionId::new();
        self.sessions.upsert(
            &session_id,
            SessionUpdate::Ingested {
                raw_blob,
                schema: schema.clone(),
                num_rows,
                num_columns,
            },
        )?;
        info!(session = %session_id, rows = num_rows, columns = num_columns, "dataset ingested");
        Ok(IngestResponse { session_id, schema })
    }

    /// Recompute the profile of a session's dataset and record it.
    pub fn get_profile(&self, id: &SessionId) -> ServiceResult<ProfileReport> {
        let record = self.session(id)?;
        let frame = self.load_dataset(&record)?;
        let report = Profiler::new(self.config.profile.clone()).profile(&frame, record.schema);
        self.sessions
            .upsert(id, SessionUpdate::Profiled(report.clone()))?;
        Ok(report)
    }

    /// Train on a session's dataset, store the artifact and record the
    /// outcome.
    pub fn train(&self, id: &SessionId) -> ServiceResult<TrainResponse> {
        let record = self.session(id)?;
        let frame = self.load_dataset(&record)?;
        let outcome = PipelineBuilder::new(self.config.train.clone())
            .train(&frame)
            .map_err(|e| {
                warn!(session = %id, error = %e, "training rejected");
                ServiceError::from(e)
            })?;

        let artifact_id = self.blobs.put(encode_artifact(&outcome.artifact)?)?;
        let task_type = outcome.task_type();
        self.sessions.upsert(
            id,
            SessionUpdate::Trained {
                artifact_blob: artifact_id,
                task_type,
                target_column: outcome.artifact.target_column.clone(),
                metrics: outcome.metrics.clone(),
                top_feature_importances: outcome.top_feature_importances.clone(),
            },
        )?;
        info!(session = %id, artifact = %artifact_id, task = %task_type, "model trained");

        Ok(TrainResponse {
            task_type,
            artifact_id,
            metrics: outcome.metrics,
            top_feature_importances: outcome.top_feature_importances,
        })
    }

    /// Predict with the session's latest artifact.
    pub fn predict(&self, id: &SessionId, records: &[Record]) -> ServiceResult<Vec<Value>> {
        let record = self.session(id)?;
        let artifact_id = record
            .artifact_blob
            .ok_or_else(|| ServiceError::not_found("artifact", id))?;
        let bytes = self
            .blobs
            .get(&artifact_id)?
            .ok_or_else(|| ServiceError::not_found("artifact", artifact_id))?;
        let predictor = Predictor::from_bytes(&bytes)?;
        let predictions = predictor.predict(records)?;
        info!(session = %id, count = predictions.len(), "predictions served");
        Ok(predictions)
    }

    fn load_dataset(&self, record: &SessionRecord) -> ServiceResult<DataFrame> {
        let blob = record
            .raw_blob
            .ok_or_else(|| ServiceError::not_found("dataset", record.id))?;
        let bytes = self
            .blobs
            .get(&blob)?
            .ok_or_else(|| ServiceError::not_found("dataset", blob))?;
        Ok(read_csv_bytes(&bytes)?)
    }
}

/// Encoding a freshly trained artifact only fails on an internal fault.
fn encode_artifact(artifact: &TrainingArtifact) -> ServiceResult<Vec<u8>> {
    artifact.to_bytes().map_err(encode_failure)
}

fn encode_failure(e: PipelineError) -> ServiceError {
    error!(detail = %e, "trained artifact could not be encoded");
    ServiceError::Internal("artifact could not be encoded".into())
}
