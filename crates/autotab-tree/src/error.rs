use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TreeError {
    #[error("Model not fitted")]
    NotFitted,

    #[error("Cannot fit on an empty training set")]
    EmptyTrainingSet,

    #[error("X has {x_rows} rows but y has {y_len} entries")]
    LengthMismatch { x_rows: usize, y_len: usize },

    #[error("Expected {expected} features, got {got}")]
    FeatureCountMismatch { expected: usize, got: usize },

    #[error("Label {label} is outside 0..{n_classes}")]
    LabelOutOfRange { label: usize, n_classes: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type TreeResult<T> = Result<T, TreeError>;
