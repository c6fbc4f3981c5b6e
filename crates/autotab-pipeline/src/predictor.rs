use autotab_core::{Matrix, Record, Value};
use autotab_io::NA_VALUES;
use tracing::debug;

use crate::artifact::TrainingArtifact;
use crate::error::{PipelineError, PipelineResult};
use crate::model::Predictions;

/// Serves predictions from a trained artifact.
///
/// Raw records are projected onto the training feature space by name, so
/// column order in the input never matters, extra columns are ignored and
/// unseen categories light no indicator.
#[derive(Debug, Clone)]
pub struct Predictor {
    artifact: TrainingArtifact,
}

impl Predictor {
    pub fn new(artifact: TrainingArtifact) -> Self {
        Predictor { artifact }
    }

    pub fn from_bytes(bytes: &[u8]) -> PipelineResult<Self> {
        Ok(Predictor::new(TrainingArtifact::from_bytes(bytes)?))
    }

    pub fn artifact(&self) -> &TrainingArtifact {
        &self.artifact
    }

    /// One prediction per record, in input order and in the original
    /// label space.
    pub fn predict(&self, records: &[Record]) -> PipelineResult<Vec<Value>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let aligned = self.align(records)?;
        let x = self.artifact.transformer.transform_aligned(&aligned)?;
        debug!(rows = x.n_rows(), features = x.n_cols(), "records aligned");

        match (self.artifact.model.predict(&x)?, &self.artifact.label_encoder) {
            (Predictions::Classes(classes), Some(encoder)) => Ok(encoder.inverse_transform(&classes)?),
            (Predictions::Classes(classes), None) => {
                Ok(classes.into_iter().map(|c| Value::Number(c as f64)).collect())
            }
            (Predictions::Values(values), _) => Ok(values.into_iter().map(Value::Number).collect()),
        }
    }

    /// Lay records out in training feature order, before imputation.
    ///
    /// A column absent from every record fills its features with 0. A
    /// numeric cell missing from a record that is part of a present column
    /// becomes NaN for the mean imputer; a missing categorical cell takes
    /// the fitted most frequent value. Categories match by value first,
    /// then by rendered text, then numerically, so `1.0` sent as a number
    /// still finds a category read from text as `"1.0"`.
    fn align(&self, records: &[Record]) -> PipelineResult<Matrix> {
        let transformer = &self.artifact.transformer;
        let mut aligned = Matrix::zeros(records.len(), transformer.n_features());
        let present = |name: &str| records.iter().any(|r| r.get(name).is_some());

        for (j, name) in transformer.numeric_columns.iter().enumerate() {
            if !present(name.as_str()) {
                continue;
            }
            for (i, record) in records.iter().enumerate() {
                let v = numeric_cell(record.get(name), name, i)?;
                aligned.set(i, j, v)?;
            }
        }

        let mut offset = transformer.numeric_columns.len();
        for (j, name) in transformer.categorical_columns.iter().enumerate() {
            let categories = transformer.categories(j);
            if present(name.as_str()) {
                for (i, record) in records.iter().enumerate() {
                    let cell = match record.get(name) {
                        None | Some(Value::Null) => transformer.categorical_fill(j),
                        Some(v) => Some(v),
                    };
                    if let Some(pos) = cell.and_then(|v| category_position(categories, v)) {
                        aligned.set(i, offset + pos, 1.0)?;
                    }
                }
            }
            offset += categories.len();
        }
        Ok(aligned)
    }
}

fn category_position(categories: &[Value], cell: &Value) -> Option<usize> {
    let key = cell.key();
    let rendered = cell.render();
    categories
        .iter()
        .position(|c| c.key() == key)
        .or_else(|| categories.iter().position(|c| c.render() == rendered))
        .or_else(|| {
            let n = as_number(cell)?;
            categories.iter().position(|c| as_number(c) == Some(n))
        })
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => Some(*n),
        Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn numeric_cell(cell: Option<&Value>, column: &str, record: usize) -> PipelineResult<f64> {
    match cell {
        None | Some(Value::Null) => Ok(f64::NAN),
        Some(Value::Number(v)) => Ok(*v),
        Some(Value::Text(s)) if NA_VALUES.contains(&s.trim()) => Ok(f64::NAN),
        Some(Value::Text(s)) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(PipelineError::InvalidInput(format!(
                "record {}: column '{}' expects a finite number, got '{}'",
                record, column, s
            ))),
        },
        Some(Value::Bool(b)) => Err(PipelineError::InvalidInput(format!(
            "record {}: column '{}' expects a number, got {}",
            record, column, b
        ))),
    }
}
