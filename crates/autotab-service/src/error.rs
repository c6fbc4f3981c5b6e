use autotab_io::IoError;
use autotab_pipeline::PipelineError;
use thiserror::Error;
use tracing::error;

/// Failure inside a persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Lock poisoned: {0}")]
    Poisoned(&'static str),

    #[error("{0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the public operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Details are logged, never returned.
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        error!(detail = %e, "storage collaborator failed");
        ServiceError::Internal("storage failure".into())
    }
}

impl From<IoError> for ServiceError {
    fn from(e: IoError) -> Self {
        ServiceError::InvalidInput(format!("unreadable dataset: {}", e))
    }
}

impl From<PipelineError> for ServiceError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::TargetNotFound
            | PipelineError::InvalidInput(_)
            | PipelineError::Frame(_)
            | PipelineError::Preprocess(_) => ServiceError::InvalidInput(e.to_string()),
            PipelineError::Artifact(detail) => {
                error!(detail = %detail, "stored artifact could not be decoded");
                ServiceError::Internal("artifact could not be decoded".into())
            }
            other => {
                error!(detail = %other, "pipeline failed");
                ServiceError::Internal("pipeline failure".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_details_are_not_leaked() {
        let e: ServiceError = StoreError::Unavailable("disk /var/x is full".into()).into();
        assert_eq!(e.to_string(), "Internal error: storage failure");
    }

    #[test]
    fn test_missing_target_is_invalid_input() {
        let e: ServiceError = PipelineError::TargetNotFound.into();
        match e {
            ServiceError::InvalidInput(msg) => assert_eq!(msg, "target not found"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
