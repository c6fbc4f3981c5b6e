use autotab_core::FrameError;
use thiserror::Error;

/// Errors raised while reading datasets or (de)serializing artifacts.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset has no header row")]
    MissingHeader,

    #[error("Row {line} has {got} fields, expected at most {expected}")]
    RaggedRow { line: u64, expected: usize, got: usize },

    #[error("Column '{column}' has a non-finite number on line {line}")]
    NonFiniteNumber { column: String, line: u64 },

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Expected a '{expected}' payload, found '{found}'")]
    FormatMismatch { expected: String, found: String },

    #[error("Unsupported {format} version {found} (newest supported: {supported})")]
    UnsupportedVersion {
        format: String,
        found: u32,
        supported: u32,
    },
}

pub type IoResult<T> = Result<T, IoError>;
