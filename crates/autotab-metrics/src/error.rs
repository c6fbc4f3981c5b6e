use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Length mismatch: {y_true} true values, {y_pred} predictions")]
    LengthMismatch { y_true: usize, y_pred: usize },

    #[error("Cannot score an empty set")]
    Empty,
}

pub type MetricsResult<T> = Result<T, MetricsError>;

pub(crate) fn check_lengths(y_true: usize, y_pred: usize) -> MetricsResult<()> {
    if y_true != y_pred {
        return Err(MetricsError::LengthMismatch { y_true, y_pred });
    }
    if y_true == 0 {
        return Err(MetricsError::Empty);
    }
    Ok(())
}
