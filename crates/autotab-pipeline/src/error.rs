use autotab_core::FrameError;
use autotab_io::IoError;
use autotab_metrics::MetricsError;
use autotab_preprocessing::PreprocessError;
use autotab_tree::TreeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("target not found")]
    TargetNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A non-essential result could not be computed.
    #[error("Computation degraded: {0}")]
    ComputationDegraded(String),

    #[error("Artifact error: {0}")]
    Artifact(#[from] IoError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
