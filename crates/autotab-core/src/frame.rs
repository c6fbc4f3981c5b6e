use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::dtype::DType;
use crate::error::{FrameError, FrameResult};
use crate::value::{Value, ValueKey};

/// A named, typed column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    dtype: DType,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DType, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            dtype,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    pub fn non_null(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|v| !v.is_null())
    }

    /// Numeric view: `Some` for number cells, `None` otherwise.
    pub fn numbers(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }

    pub fn non_null_numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    /// Distinct non-missing cells in first-appearance order.
    pub fn unique(&self) -> Vec<&Value> {
        let mut seen = HashSet::new();
        self.non_null().filter(|v| seen.insert(v.key())).collect()
    }

    /// Number of distinct non-missing cells.
    pub fn n_unique(&self) -> usize {
        self.non_null().map(Value::key).collect::<HashSet<ValueKey>>().len()
    }

    /// Rows at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> FrameResult<Column> {
        let mut values = Vec::with_capacity(indices.len());
        for &i in indices {
            let v = self.values.get(i).ok_or(FrameError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: self.values.len(),
            })?;
            values.push(v.clone());
        }
        Ok(Column::new(self.name.clone(), self.dtype, values))
    }
}

/// An ordered collection of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataFrame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl DataFrame {
    pub fn new(columns: Vec<Column>) -> FrameResult<Self> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        let mut names = HashSet::new();
        for col in &columns {
            if col.len() != n_rows {
                return Err(FrameError::LengthMismatch {
                    column: col.name.clone(),
                    expected: n_rows,
                    got: col.len(),
                });
            }
            if !names.insert(col.name.as_str()) {
                return Err(FrameError::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(DataFrame { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn require(&self, name: &str) -> FrameResult<&Column> {
        self.column(name)
            .ok_or_else(|| FrameError::ColumnNotFound(name.to_string()))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Columns stored as int or float.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.dtype.is_numeric())
    }

    /// A copy without the named column.
    pub fn drop_column(&self, name: &str) -> FrameResult<DataFrame> {
        self.require(name)?;
        let columns = self
            .columns
            .iter()
            .filter(|c| c.name != name)
            .cloned()
            .collect();
        Ok(DataFrame {
            columns,
            n_rows: self.n_rows,
        })
    }

    /// A copy holding only the rows at `indices`, in that order.
    pub fn take_rows(&self, indices: &[usize]) -> FrameResult<DataFrame> {
        let columns = self
            .columns
            .iter()
            .map(|c| c.take(indices))
            .collect::<FrameResult<Vec<_>>>()?;
        Ok(DataFrame {
            columns,
            n_rows: indices.len(),
        })
    }
}
