use autotab_core::Matrix;
use serde::{Deserialize, Serialize};

use crate::error::{PreprocessError, PreprocessResult};

/// Standardize features by removing the mean and scaling to unit variance.
///
/// Uses the population standard deviation. Columns with zero spread are
/// centered but not scaled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Option<Vec<f64>>,
    pub scale: Option<Vec<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        StandardScaler {
            mean: None,
            scale: None,
        }
    }

    /// Compute per-column mean and std from training data.
    pub fn fit(&mut self, x: &Matrix) -> PreprocessResult<()> {
        let (rows, cols) = x.shape();
        let n = rows.max(1) as f64;
        let mut mean = vec![0.0; cols];
        for row in x.rows() {
            for (m, &v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; cols];
        for row in x.rows() {
            for j in 0..cols {
                let d = row[j] - mean[j];
                var[j] += d * d;
            }
        }
        let scale = var
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std < f64::EPSILON {
                    1.0
                } else {
                    std
                }
            })
            .collect();

        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(())
    }

    /// Transform data using fitted mean and scale.
    pub fn transform(&self, x: &Matrix) -> PreprocessResult<Matrix> {
        let (mean, scale) = match (&self.mean, &self.scale) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(PreprocessError::NotFitted("StandardScaler")),
        };
        if x.n_cols() != mean.len() {
            return Err(PreprocessError::FeatureCountMismatch {
                expected: mean.len(),
                got: x.n_cols(),
            });
        }
        let mut out = x.clone();
        for j in 0..mean.len() {
            let (m, s) = (mean[j], scale[j]);
            out.map_column(j, |v| (v - m) / s)?;
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, x: &Matrix) -> PreprocessResult<Matrix> {
        self.fit(x)?;
        self.transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_standard_scaler() {
        let x = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();

        // Each column should have mean ≈ 0
        for j in 0..2 {
            let col = scaled.column(j).unwrap();
            let mean: f64 = col.iter().sum::<f64>() / 3.0;
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-10);
        }
        assert_abs_diff_eq!(scaled.get(0, 0).unwrap(), -1.224744871391589, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_column_is_only_centered() {
        let x = Matrix::from_rows(&[vec![7.0], vec![7.0]]).unwrap();
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();
        assert_eq!(scaled.data(), &[0.0, 0.0]);
        assert_eq!(scaler.scale, Some(vec![1.0]));
    }

    #[test]
    fn test_unfitted_and_width_mismatch() {
        let x = Matrix::from_rows(&[vec![1.0, 2.0]]).unwrap();
        let scaler = StandardScaler::new();
        assert_eq!(
            scaler.transform(&x),
            Err(PreprocessError::NotFitted("StandardScaler"))
        );

        let mut scaler = StandardScaler::new();
        scaler.fit(&Matrix::from_rows(&[vec![1.0]]).unwrap()).unwrap();
        assert!(matches!(
            scaler.transform(&x),
            Err(PreprocessError::FeatureCountMismatch { expected: 1, got: 2 })
        ));
    }
}
