use autotab_core::{Column, DataFrame, ValueKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::column_map::ColumnMap;
use crate::config::ProfileConfig;
use crate::schema::ColumnSchema;
use crate::stats::{complete_pairs, iqr_outlier_count, pearson, round_to, skewness};

/// Statistical profile of one dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileReport {
    pub parsed_schema: Vec<ColumnSchema>,
    /// Values outside the IQR fences, per numeric column.
    pub outliers: ColumnMap<usize>,
    /// Biased skewness rounded to 3 decimals; `null` when undefined.
    pub skewness: ColumnMap<Option<f64>>,
    /// Full numeric correlation matrix; `null` entries are undefined.
    pub pairwise_correlations: ColumnMap<ColumnMap<Option<f64>>>,
    /// Dominant-value share in percent, for columns above the threshold.
    pub imbalanced_columns: ColumnMap<f64>,
    /// Correlation with the target, for numeric features above the threshold.
    pub potential_leakage: ColumnMap<f64>,
}

/// Computes a [`ProfileReport`] from a frame and its schema.
#[derive(Debug, Clone, Default)]
pub struct Profiler {
    config: ProfileConfig,
}

impl Profiler {
    pub fn new(config: ProfileConfig) -> Self {
        Profiler { config }
    }

    pub fn profile(&self, frame: &DataFrame, schema: Vec<ColumnSchema>) -> ProfileReport {
        let numeric: Vec<&Column> = frame.numeric_columns().collect();
        debug!(
            rows = frame.n_rows(),
            numeric_columns = numeric.len(),
            "profiling dataset"
        );

        let report = ProfileReport {
            parsed_schema: schema,
            outliers: self.outliers(&numeric),
            skewness: skewness_map(&numeric),
            pairwise_correlations: correlation_matrix(&numeric),
            imbalanced_columns: self.imbalance(frame),
            potential_leakage: self.leakage(frame, &numeric),
        };

        info!(
            outlier_columns = report.outliers.iter().filter(|(_, &n)| n > 0).count(),
            imbalanced = report.imbalanced_columns.len(),
            leaking = report.potential_leakage.len(),
            "profile complete"
        );
        report
    }

    fn outliers(&self, numeric: &[&Column]) -> ColumnMap<usize> {
        numeric
            .iter()
            .map(|c| {
                let values = c.non_null_numbers();
                (c.name(), iqr_outlier_count(&values, self.config.iqr_multiplier))
            })
            .collect()
    }

    /// Share of the most frequent value, missing cells counted as a value.
    fn imbalance(&self, frame: &DataFrame) -> ColumnMap<f64> {
        let mut out = ColumnMap::new();
        for col in frame.columns() {
            if col.is_empty() {
                continue;
            }
            let mut counts: HashMap<ValueKey, usize> = HashMap::new();
            for v in col.values() {
                *counts.entry(v.key()).or_insert(0) += 1;
            }
            let top = counts.values().copied().max().unwrap_or(0);
            let share = top as f64 / col.len() as f64;
            if share > self.config.imbalance_threshold {
                out.insert(col.name(), round_to(share * 100.0, 2));
            }
        }
        out
    }

    /// Only runs when a numeric column named exactly like the configured
    /// target exists.
    fn leakage(&self, frame: &DataFrame, numeric: &[&Column]) -> ColumnMap<f64> {
        let mut out = ColumnMap::new();
        let target_name = self.config.leakage_target.as_str();
        let target = match frame.column(target_name) {
            Some(t) if t.dtype().is_numeric() => t.numbers(),
            Some(_) => {
                debug!(target = target_name, "target is not numeric, skipping leakage check");
                return out;
            }
            None => return out,
        };
        for col in numeric.iter().filter(|c| c.name() != target_name) {
            let pairs = complete_pairs(&col.numbers(), &target);
            if let Some(r) = pearson(&pairs) {
                if r.abs() > self.config.leakage_threshold {
                    out.insert(col.name(), round_to(r, 4));
                }
            }
        }
        out
    }
}

fn skewness_map(numeric: &[&Column]) -> ColumnMap<Option<f64>> {
    numeric
        .iter()
        .map(|c| {
            let s = skewness(&c.non_null_numbers()).map(|v| round_to(v, 3));
            (c.name(), s)
        })
        .collect()
}

/// Pairwise-complete Pearson matrix, symmetric by construction.
fn correlation_matrix(numeric: &[&Column]) -> ColumnMap<ColumnMap<Option<f64>>> {
    let values: Vec<Vec<Option<f64>>> = numeric.iter().map(|c| c.numbers()).collect();
    let k = numeric.len();
    let mut cells = vec![vec![None; k]; k];
    for i in 0..k {
        for j in i..k {
            let r = pearson(&complete_pairs(&values[i], &values[j]));
            let r = if i == j { r.map(|_| 1.0) } else { r };
            cells[i][j] = r;
            cells[j][i] = r;
        }
    }
    numeric
        .iter()
        .zip(cells)
        .map(|(c, row)| {
            let inner: ColumnMap<Option<f64>> =
                numeric.iter().zip(row).map(|(o, r)| (o.name(), r)).collect();
            (c.name(), inner)
        })
        .collect()
}
