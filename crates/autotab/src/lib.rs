//! # AutoTab
//!
//! Automatic profiling, training and serving for tabular datasets.
//!
//! ## Modules
//!
//! - **core**: Cell values, typed columns, data frames and dense matrices
//! - **io**: CSV parsing with dtype inference, versioned artifact envelopes
//! - **preprocessing**: Imputers, StandardScaler, label and one-hot encoders, seeded splits
//! - **tree**: CART decision trees and random forests with impurity importances
//! - **metrics**: Accuracy, weighted precision/recall/F1, RMSE, R²
//! - **profile**: Column schema inference and dataset profiling
//! - **pipeline**: Target and task detection, training, artifacts, prediction
//! - **service**: Session and blob stores behind the ingest/profile/train/predict operations

/// Values, columns, frames and matrices.
pub use autotab_core as core;

/// Dataset and artifact I/O.
pub use autotab_io as io;

/// Data preprocessing.
pub use autotab_preprocessing as preprocessing;

/// Tree-based models.
pub use autotab_tree as tree;

/// Evaluation metrics.
pub use autotab_metrics as metrics;

/// Schema inference and profiling.
pub use autotab_profile as profile;

/// Automatic training and prediction.
pub use autotab_pipeline as pipeline;

/// Session-scoped service operations.
pub use autotab_service as service;

/// Commonly used types.
pub mod prelude {
    pub use autotab_core::{DataFrame, Record, Value};
    pub use autotab_pipeline::{PipelineBuilder, Predictor, TaskType, TrainingArtifact};
    pub use autotab_profile::{Profiler, SchemaInferencer};
    pub use autotab_service::{AutoTab, ServiceConfig, ServiceError, SessionId};
}
