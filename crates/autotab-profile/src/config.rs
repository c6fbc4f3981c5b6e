use serde::{Deserialize, Serialize};

/// Thresholds used when summarizing columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// A column is high-cardinality above this many distinct values.
    pub high_cardinality_threshold: usize,
    /// Number of distinct sample values kept per column.
    pub sample_size: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        SchemaConfig {
            high_cardinality_threshold: 50,
            sample_size: 3,
        }
    }
}

/// Thresholds used by the profiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Outlier fences sit this many IQRs beyond Q1 and Q3.
    pub iqr_multiplier: f64,
    /// A column is imbalanced when its dominant share is strictly above this.
    pub imbalance_threshold: f64,
    /// A feature leaks when `|corr(feature, target)|` is strictly above this.
    pub leakage_threshold: f64,
    /// Exact name of the column checked for leakage.
    pub leakage_target: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            iqr_multiplier: 1.5,
            imbalance_threshold: 0.9,
            leakage_threshold: 0.9,
            leakage_target: "target".to_string(),
        }
    }
}
