use autotab_core::{Matrix, Value, ValueKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{PreprocessError, PreprocessResult};

// ─── Label Encoder ──────────────────────────────────────────────────────────

/// Encode target labels as integer indices.
///
/// Classes are kept sorted by [`ValueKey`], so lookups are a binary search
/// and the encoding is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<Value>,
}

impl LabelEncoder {
    pub fn new() -> Self {
        LabelEncoder {
            classes: Vec::new(),
        }
    }

    /// Fit the encoder on labels. Missing labels are ignored.
    pub fn fit(&mut self, labels: &[Value]) {
        let unique: BTreeSet<ValueKey> = labels
            .iter()
            .filter(|v| !v.is_null())
            .map(Value::key)
            .collect();
        self.classes = unique.iter().map(ValueKey::to_value).collect();
    }

    pub fn index_of(&self, label: &Value) -> Option<usize> {
        let key = label.key();
        self.classes.binary_search_by(|c| c.key().cmp(&key)).ok()
    }

    pub fn transform(&self, labels: &[Value]) -> PreprocessResult<Vec<usize>> {
        labels
            .iter()
            .map(|l| {
                self.index_of(l)
                    .ok_or_else(|| PreprocessError::UnknownLabel(l.render()))
            })
            .collect()
    }

    pub fn fit_transform(&mut self, labels: &[Value]) -> PreprocessResult<Vec<usize>> {
        self.fit(labels);
        self.transform(labels)
    }

    /// Inverse transform: index → original label.
    pub fn inverse_transform(&self, encoded: &[usize]) -> PreprocessResult<Vec<Value>> {
        encoded
            .iter()
            .map(|&i| {
                self.classes
                    .get(i)
                    .cloned()
                    .ok_or(PreprocessError::LabelOutOfRange(i))
            })
            .collect()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

// ─── One-Hot Encoder ────────────────────────────────────────────────────────

/// Name of the indicator feature for `value` in `column`.
pub fn dummy_name(column: &str, value: &Value) -> String {
    format!("{}_{}", column, value.render())
}

/// Expand categorical columns into 0/1 indicator features.
///
/// Categories are the sorted distinct non-missing values seen during fit.
/// At transform time unseen values and missing cells produce all zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub categories: Option<Vec<Vec<Value>>>,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        OneHotEncoder { categories: None }
    }

    pub fn fit(&mut self, columns: &[&[Value]]) -> PreprocessResult<()> {
        let cats = columns
            .iter()
            .map(|col| {
                let keys: BTreeSet<ValueKey> = col
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(Value::key)
                    .collect();
                keys.iter().map(ValueKey::to_value).collect()
            })
            .collect();
        self.categories = Some(cats);
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.categories
            .as_ref()
            .map(|c| c.iter().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Indicator feature names, `<column>_<value>`, in output order.
    pub fn feature_names(&self, columns: &[String]) -> PreprocessResult<Vec<String>> {
        let cats = self.fitted()?;
        if columns.len() != cats.len() {
            return Err(PreprocessError::FeatureCountMismatch {
                expected: cats.len(),
                got: columns.len(),
            });
        }
        Ok(columns
            .iter()
            .zip(cats)
            .flat_map(|(name, values)| values.iter().map(move |v| dummy_name(name, v)))
            .collect())
    }

    pub fn transform(&self, columns: &[&[Value]]) -> PreprocessResult<Matrix> {
        let cats = self.fitted()?;
        if columns.len() != cats.len() {
            return Err(PreprocessError::FeatureCountMismatch {
                expected: cats.len(),
                got: columns.len(),
            });
        }
        let rows = columns.first().map(|c| c.len()).unwrap_or(0);
        let width = self.n_features();
        let mut out = Matrix::zeros(rows, width);

        let mut offset = 0;
        for (col, values) in columns.iter().zip(cats) {
            for (i, cell) in col.iter().enumerate() {
                let key = cell.key();
                if let Ok(pos) = values.binary_search_by(|c| c.key().cmp(&key)) {
                    out.set(i, offset + pos, 1.0)?;
                }
            }
            offset += values.len();
        }
        Ok(out)
    }

    fn fitted(&self) -> PreprocessResult<&Vec<Vec<Value>>> {
        self.categories
            .as_ref()
            .ok_or(PreprocessError::NotFitted("OneHotEncoder"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_encoder() {
        let labels: Vec<Value> = vec!["cat".into(), "dog".into(), "bird".into(), "cat".into()];
        let mut enc = LabelEncoder::new();
        let encoded = enc.fit_transform(&labels).unwrap();

        assert_eq!(enc.n_classes(), 3);
        // sorted: bird=0, cat=1, dog=2
        assert_eq!(encoded, vec![1, 2, 0, 1]);

        let decoded = enc.inverse_transform(&encoded).unwrap();
        assert_eq!(decoded, labels);
    }

    #[test]
    fn test_label_encoder_numeric_and_unknown() {
        let labels: Vec<Value> = vec![Value::Number(10.0), Value::Number(2.0)];
        let mut enc = LabelEncoder::new();
        enc.fit(&labels);
        assert_eq!(enc.classes, vec![Value::Number(2.0), Value::Number(10.0)]);
        assert_eq!(
            enc.transform(&[Value::Number(3.0)]),
            Err(PreprocessError::UnknownLabel("3".into()))
        );
        assert_eq!(
            enc.inverse_transform(&[5]),
            Err(PreprocessError::LabelOutOfRange(5))
        );
    }

    #[test]
    fn test_one_hot() {
        let color: Vec<Value> = vec!["red".into(), "blue".into(), "red".into()];
        let flag: Vec<Value> = vec![true.into(), false.into(), true.into()];
        let mut enc = OneHotEncoder::new();
        enc.fit(&[color.as_slice(), flag.as_slice()]).unwrap();

        let names = enc
            .feature_names(&["color".to_string(), "flag".to_string()])
            .unwrap();
        assert_eq!(names, vec!["color_blue", "color_red", "flag_False", "flag_True"]);

        let out = enc.transform(&[color.as_slice(), flag.as_slice()]).unwrap();
        assert_eq!(out.row(0), &[0.0, 1.0, 0.0, 1.0]);
        assert_eq!(out.row(1), &[1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_one_hot_ignores_unknown() {
        let train: Vec<Value> = vec!["a".into(), "b".into()];
        let mut enc = OneHotEncoder::new();
        enc.fit(&[train.as_slice()]).unwrap();

        let test: Vec<Value> = vec!["c".into(), Value::Null];
        let out = enc.transform(&[test.as_slice()]).unwrap();
        assert_eq!(out.data(), &[0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_dummy_name_renders_numbers() {
        assert_eq!(dummy_name("size", &Value::Number(3.0)), "size_3");
        assert_eq!(dummy_name("size", &Value::Number(2.5)), "size_2.5");
    }
}
