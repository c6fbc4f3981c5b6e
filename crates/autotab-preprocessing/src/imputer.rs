use autotab_core::{Matrix, Value, ValueKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{PreprocessError, PreprocessResult};

// ─── Mean Imputer ───────────────────────────────────────────────────────────

/// Replace `NaN` cells with the column mean seen during fit.
///
/// A column with no observed values during fit imputes `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanImputer {
    pub statistics: Option<Vec<f64>>,
}

impl MeanImputer {
    pub fn new() -> Self {
        MeanImputer { statistics: None }
    }

    pub fn fit(&mut self, x: &Matrix) -> PreprocessResult<()> {
        let cols = x.n_cols();
        let mut sums = vec![0.0; cols];
        let mut counts = vec![0usize; cols];
        for row in x.rows() {
            for (j, &v) in row.iter().enumerate() {
                if !v.is_nan() {
                    sums[j] += v;
                    counts[j] += 1;
                }
            }
        }
        let stats = sums
            .into_iter()
            .zip(counts)
            .map(|(s, c)| if c == 0 { 0.0 } else { s / c as f64 })
            .collect();
        self.statistics = Some(stats);
        Ok(())
    }

    pub fn transform(&self, x: &Matrix) -> PreprocessResult<Matrix> {
        let stats = self
            .statistics
            .as_ref()
            .ok_or(PreprocessError::NotFitted("MeanImputer"))?;
        if x.n_cols() != stats.len() {
            return Err(PreprocessError::FeatureCountMismatch {
                expected: stats.len(),
                got: x.n_cols(),
            });
        }
        let mut out = x.clone();
        for (j, &fill) in stats.iter().enumerate() {
            out.map_column(j, |v| if v.is_nan() { fill } else { v })?;
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, x: &Matrix) -> PreprocessResult<Matrix> {
        self.fit(x)?;
        self.transform(x)
    }
}

// ─── Most Frequent Imputer ──────────────────────────────────────────────────

/// Replace missing cells with the most frequent value of each column.
///
/// Ties resolve to the smallest value in [`ValueKey`] order. A column that
/// is entirely missing during fit keeps its gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MostFrequentImputer {
    pub fill_values: Option<Vec<Value>>,
}

impl MostFrequentImputer {
    pub fn new() -> Self {
        MostFrequentImputer { fill_values: None }
    }

    /// Fit on one slice of cells per column.
    pub fn fit(&mut self, columns: &[&[Value]]) -> PreprocessResult<()> {
        let fills = columns.iter().map(|col| most_frequent(col)).collect();
        self.fill_values = Some(fills);
        Ok(())
    }

    pub fn transform(&self, columns: &[&[Value]]) -> PreprocessResult<Vec<Vec<Value>>> {
        let fills = self
            .fill_values
            .as_ref()
            .ok_or(PreprocessError::NotFitted("MostFrequentImputer"))?;
        if columns.len() != fills.len() {
            return Err(PreprocessError::FeatureCountMismatch {
                expected: fills.len(),
                got: columns.len(),
            });
        }
        Ok(columns
            .iter()
            .zip(fills)
            .map(|(col, fill)| col.iter().map(|v| if v.is_null() { fill.clone() } else { v.clone() }).collect())
            .collect())
    }

    /// The value fitted for column `j`, `None` if that column had no values.
    pub fn fill_value(&self, j: usize) -> Option<&Value> {
        self.fill_values
            .as_ref()
            .and_then(|f| f.get(j))
            .filter(|v| !v.is_null())
    }
}

fn most_frequent(values: &[Value]) -> Value {
    let mut counts: BTreeMap<ValueKey, usize> = BTreeMap::new();
    for v in values.iter().filter(|v| !v.is_null()) {
        *counts.entry(v.key()).or_insert(0) += 1;
    }
    // BTreeMap iterates in key order, so keeping the first maximum breaks ties low.
    let mut best: Option<(&ValueKey, usize)> = None;
    for (key, &count) in &counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((key, count));
        }
    }
    best.map(|(k, _)| k.to_value()).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_imputer() {
        let x = Matrix::from_rows(&[
            vec![1.0, f64::NAN],
            vec![f64::NAN, f64::NAN],
            vec![3.0, f64::NAN],
        ])
        .unwrap();
        let mut imp = MeanImputer::new();
        let out = imp.fit_transform(&x).unwrap();
        assert_eq!(out.column(0).unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(out.column(1).unwrap(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_mean_imputer_requires_fit() {
        let x = Matrix::zeros(1, 1);
        assert_eq!(
            MeanImputer::new().transform(&x),
            Err(PreprocessError::NotFitted("MeanImputer"))
        );
    }

    #[test]
    fn test_most_frequent_with_tie() {
        let col: Vec<Value> = vec!["b".into(), "a".into(), Value::Null, "b".into(), "a".into()];
        let mut imp = MostFrequentImputer::new();
        imp.fit(&[col.as_slice()]).unwrap();
        assert_eq!(imp.fill_value(0), Some(&Value::text("a")));

        let out = imp.transform(&[col.as_slice()]).unwrap();
        assert_eq!(out[0][2], Value::text("a"));
    }

    #[test]
    fn test_most_frequent_all_missing() {
        let col = vec![Value::Null, Value::Null];
        let mut imp = MostFrequentImputer::new();
        imp.fit(&[col.as_slice()]).unwrap();
        assert_eq!(imp.fill_value(0), None);
        assert_eq!(imp.transform(&[col.as_slice()]).unwrap()[0], col);
    }
}
