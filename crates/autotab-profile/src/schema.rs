use autotab_core::{Column, DType, DataFrame, Value};
use serde::{Deserialize, Serialize};

use crate::config::SchemaConfig;
use crate::stats::round_to;

/// Semantic type reported for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Numerical,
    Categorical,
    Boolean,
    Datetime,
}

impl SemanticType {
    /// Numeric dtypes first, then datetime, then boolean; anything else is
    /// categorical.
    pub fn of(dtype: DType) -> Self {
        match dtype {
            DType::Int | DType::Float => SemanticType::Numerical,
            DType::Datetime => SemanticType::Datetime,
            DType::Bool => SemanticType::Boolean,
            DType::Text => SemanticType::Categorical,
        }
    }
}

/// Per-column summary produced at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    #[serde(rename = "column")]
    pub name: String,
    #[serde(rename = "dtype")]
    pub semantic_type: SemanticType,
    pub unique_values: usize,
    pub null_percentage: f64,
    pub high_cardinality: bool,
    pub constant: bool,
    pub sample_values: Vec<String>,
}

/// Summarizes every column of a frame, in frame order.
#[derive(Debug, Clone, Default)]
pub struct SchemaInferencer {
    config: SchemaConfig,
}

impl SchemaInferencer {
    pub fn new(config: SchemaConfig) -> Self {
        SchemaInferencer { config }
    }

    pub fn infer(&self, frame: &DataFrame) -> Vec<ColumnSchema> {
        frame.columns().iter().map(|c| self.describe(c)).collect()
    }

    fn describe(&self, column: &Column) -> ColumnSchema {
        let unique_values = column.n_unique();
        let null_percentage = if column.is_empty() {
            0.0
        } else {
            round_to(column.null_count() as f64 / column.len() as f64 * 100.0, 2)
        };
        let sample_values = column
            .unique()
            .into_iter()
            .take(self.config.sample_size)
            .map(|v| sample_string(column.dtype(), v))
            .collect();

        ColumnSchema {
            name: column.name().to_string(),
            semantic_type: SemanticType::of(column.dtype()),
            unique_values,
            null_percentage,
            high_cardinality: unique_values > self.config.high_cardinality_threshold,
            constant: unique_values == 1,
            sample_values,
        }
    }
}

/// Float columns keep a fractional part (`2.0`), everything else renders
/// as it would in a feature name.
fn sample_string(dtype: DType, value: &Value) -> String {
    match (dtype, value) {
        (DType::Float, Value::Number(v)) => format!("{:?}", v),
        _ => value.render(),
    }
}
