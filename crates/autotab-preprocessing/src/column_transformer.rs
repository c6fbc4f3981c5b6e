use autotab_core::{DType, DataFrame, Matrix, Value};
use serde::{Deserialize, Serialize};

use crate::encoder::OneHotEncoder;
use crate::error::{PreprocessError, PreprocessResult};
use crate::imputer::{MeanImputer, MostFrequentImputer};
use crate::scaler::StandardScaler;

/// Routes feature columns by dtype into two fitted blocks:
///
/// * numeric (int/float): mean imputation, then standardization
/// * categorical (text/bool): most-frequent imputation, then one-hot
///
/// Datetime columns and numeric columns with no observed value are left
/// out. Output features are the numeric block followed by the indicator
/// block, in [`ColumnTransformer::feature_names`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub mean_imputer: MeanImputer,
    pub scaler: StandardScaler,
    pub mode_imputer: MostFrequentImputer,
    pub encoder: OneHotEncoder,
    feature_names: Vec<String>,
}

impl ColumnTransformer {
    /// Fit both blocks on every column of `frame`.
    pub fn fit(frame: &DataFrame) -> PreprocessResult<Self> {
        let mut numeric_columns = Vec::new();
        let mut categorical_columns = Vec::new();
        for col in frame.columns() {
            match col.dtype() {
                DType::Int | DType::Float if col.null_count() < col.len() => {
                    numeric_columns.push(col.name().to_string())
                }
                DType::Text | DType::Bool => categorical_columns.push(col.name().to_string()),
                _ => {}
            }
        }

        let numeric = numeric_block(frame, &numeric_columns)?;
        let mut mean_imputer = MeanImputer::new();
        let imputed = mean_imputer.fit_transform(&numeric)?;
        let mut scaler = StandardScaler::new();
        scaler.fit(&imputed)?;

        let raw = categorical_block(frame, &categorical_columns)?;
        let mut mode_imputer = MostFrequentImputer::new();
        mode_imputer.fit(&raw)?;
        let filled = mode_imputer.transform(&raw)?;
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&as_slices(&filled))?;

        let mut feature_names = numeric_columns.clone();
        feature_names.extend(encoder.feature_names(&categorical_columns)?);

        Ok(ColumnTransformer {
            numeric_columns,
            categorical_columns,
            mean_imputer,
            scaler,
            mode_imputer,
            encoder,
            feature_names,
        })
    }

    /// Transform a frame holding at least the fitted columns.
    pub fn transform(&self, frame: &DataFrame) -> PreprocessResult<Matrix> {
        let numeric = numeric_block(frame, &self.numeric_columns)?;
        let numeric = self.scaler.transform(&self.mean_imputer.transform(&numeric)?)?;

        let indicators = if self.categorical_columns.is_empty() {
            Matrix::zeros(frame.n_rows(), 0)
        } else {
            let raw = categorical_block(frame, &self.categorical_columns)?;
            let filled = self.mode_imputer.transform(&raw)?;
            self.encoder.transform(&as_slices(&filled))?
        };
        Ok(Matrix::hstack(&[&numeric, &indicators])?)
    }

    /// Finish a matrix already laid out in [`Self::feature_names`] order:
    /// impute and scale the numeric block, leave indicators untouched.
    pub fn transform_aligned(&self, aligned: &Matrix) -> PreprocessResult<Matrix> {
        let width = self.feature_names.len();
        if aligned.n_cols() != width {
            return Err(PreprocessError::FeatureCountMismatch {
                expected: width,
                got: aligned.n_cols(),
            });
        }
        let k = self.numeric_columns.len();
        let numeric = aligned.slice_cols(0, k)?;
        let numeric = self.scaler.transform(&self.mean_imputer.transform(&numeric)?)?;
        let indicators = aligned.slice_cols(k, width)?;
        Ok(Matrix::hstack(&[&numeric, &indicators])?)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Fitted categories of categorical column `j`, in indicator order.
    pub fn categories(&self, j: usize) -> &[Value] {
        self.encoder
            .categories
            .as_ref()
            .and_then(|c| c.get(j))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Value used for missing cells of categorical column `j`.
    pub fn categorical_fill(&self, j: usize) -> Option<&Value> {
        self.mode_imputer.fill_value(j)
    }
}

fn numeric_block(frame: &DataFrame, names: &[String]) -> PreprocessResult<Matrix> {
    let columns = names
        .iter()
        .map(|name| -> PreprocessResult<Vec<f64>> {
            let col = frame.require(name)?;
            Ok(col
                .values()
                .iter()
                .map(|v| v.as_f64().unwrap_or(f64::NAN))
                .collect())
        })
        .collect::<PreprocessResult<Vec<_>>>()?;
    Ok(Matrix::from_columns(&columns, frame.n_rows())?)
}

fn categorical_block<'a>(frame: &'a DataFrame, names: &[String]) -> PreprocessResult<Vec<&'a [Value]>> {
    names
        .iter()
        .map(|name| -> PreprocessResult<&'a [Value]> { Ok(frame.require(name)?.values()) })
        .collect()
}

fn as_slices(columns: &[Vec<Value>]) -> Vec<&[Value]> {
    columns.iter().map(Vec::as_slice).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use autotab_core::Column;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("age", DType::Float, vec![Value::Number(20.0), Value::Null, Value::Number(40.0)]),
            Column::new("city", DType::Text, vec!["rome".into(), "oslo".into(), Value::Null]),
            Column::new("seen", DType::Datetime, vec!["2024-01-01".into(); 3]),
            Column::new("empty", DType::Float, vec![Value::Null; 3]),
            Column::new("vip", DType::Bool, vec![true.into(), false.into(), true.into()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_routing_and_feature_names() {
        let ct = ColumnTransformer::fit(&frame()).unwrap();
        assert_eq!(ct.numeric_columns, vec!["age"]);
        assert_eq!(ct.categorical_columns, vec!["city", "vip"]);
        assert_eq!(
            ct.feature_names(),
            &["age", "city_oslo", "city_rome", "vip_False", "vip_True"]
        );
    }

    #[test]
    fn test_transform_imputes_and_scales() {
        let ct = ColumnTransformer::fit(&frame()).unwrap();
        let x = ct.transform(&frame()).unwrap();
        assert_eq!(x.shape(), (3, 5));
        assert!(!x.has_nan());
        // age: [20, 30 (mean), 40] standardizes to [-1.2247, 0, 1.2247]
        assert_abs_diff_eq!(x.get(1, 0).unwrap(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x.get(2, 0).unwrap(), 1.224744871391589, epsilon = 1e-12);
        // missing city takes the mode; tie between oslo and rome resolves to oslo
        assert_eq!(x.row(2)[1..3], [1.0, 0.0]);
    }

    #[test]
    fn test_aligned_matches_frame_transform() {
        let ct = ColumnTransformer::fit(&frame()).unwrap();
        let aligned = Matrix::from_rows(&[vec![f64::NAN, 0.0, 1.0, 0.0, 1.0]]).unwrap();
        let out = ct.transform_aligned(&aligned).unwrap();
        assert_abs_diff_eq!(out.get(0, 0).unwrap(), 0.0, epsilon = 1e-12);
        assert_eq!(out.row(0)[1..], [0.0, 1.0, 0.0, 1.0]);

        let narrow = Matrix::zeros(1, 2);
        assert!(ct.transform_aligned(&narrow).is_err());
    }

    #[test]
    fn test_numeric_only_frame() {
        let df = DataFrame::new(vec![Column::new(
            "x",
            DType::Int,
            vec![Value::Number(1.0), Value::Number(3.0)],
        )])
        .unwrap();
        let ct = ColumnTransformer::fit(&df).unwrap();
        let x = ct.transform(&df).unwrap();
        assert_eq!(x.shape(), (2, 1));
        assert_eq!(x.data(), &[-1.0, 1.0]);
    }
}
