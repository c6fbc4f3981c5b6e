use autotab_core::FrameError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PreprocessError {
    #[error("{0} must be fitted before transform")]
    NotFitted(&'static str),

    #[error("Expected {expected} features, got {got}")]
    FeatureCountMismatch { expected: usize, got: usize },

    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    #[error("Encoded label {0} is out of range")]
    LabelOutOfRange(usize),

    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

pub type PreprocessResult<T> = Result<T, PreprocessError>;
