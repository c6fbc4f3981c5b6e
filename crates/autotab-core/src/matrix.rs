use crate::error::{FrameError, FrameResult};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense 2-D matrix of `f64`, the numeric form of a transformed table.
///
/// Stores data in a flat contiguous `Vec<f64>` with row-major layout.
/// Missing values are represented as `NaN` until an imputer fills them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl Matrix {
    /// Create a matrix from raw row-major data.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> FrameResult<Self> {
        if data.len() != rows * cols {
            return Err(FrameError::ShapeMismatch {
                expected: vec![rows, cols],
                got: vec![data.len()],
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Create a matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Create a matrix from a slice of equally long rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> FrameResult<Self> {
        if rows.is_empty() {
            return Ok(Matrix::zeros(0, 0));
        }
        let cols = rows[0].len();
        for row in rows {
            if row.len() != cols {
                return Err(FrameError::ShapeMismatch {
                    expected: vec![cols],
                    got: vec![row.len()],
                });
            }
        }
        let flat: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Matrix::new(flat, rows.len(), cols)
    }

    /// Create a matrix from columns of equal length.
    pub fn from_columns(columns: &[Vec<f64>], rows: usize) -> FrameResult<Self> {
        let cols = columns.len();
        let mut data = vec![0.0; rows * cols];
        for (j, col) in columns.iter().enumerate() {
            if col.len() != rows {
                return Err(FrameError::ShapeMismatch {
                    expected: vec![rows],
                    got: vec![col.len()],
                });
            }
            for (i, &v) in col.iter().enumerate() {
                data[i * cols + j] = v;
            }
        }
        Ok(Matrix { data, rows, cols })
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> FrameResult<f64> {
        self.check(row, col)?;
        Ok(self.data[row * self.cols + col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> FrameResult<()> {
        self.check(row, col)?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    fn check(&self, row: usize, col: usize) -> FrameResult<()> {
        if row >= self.rows {
            return Err(FrameError::IndexOutOfBounds {
                index: row,
                axis: 0,
                size: self.rows,
            });
        }
        if col >= self.cols {
            return Err(FrameError::IndexOutOfBounds {
                index: col,
                axis: 1,
                size: self.cols,
            });
        }
        Ok(())
    }

    /// Borrow row `i` as a slice. Panics if out of range, like slice indexing.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(move |i| self.row(i))
    }

    /// Copy of column `j`.
    pub fn column(&self, j: usize) -> FrameResult<Vec<f64>> {
        if j >= self.cols {
            return Err(FrameError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: self.cols,
            });
        }
        Ok((0..self.rows).map(|i| self.data[i * self.cols + j]).collect())
    }

    /// Apply `f` to every cell of column `j` in place.
    pub fn map_column<F: Fn(f64) -> f64>(&mut self, j: usize, f: F) -> FrameResult<()> {
        if j >= self.cols {
            return Err(FrameError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: self.cols,
            });
        }
        for i in 0..self.rows {
            let idx = i * self.cols + j;
            self.data[idx] = f(self.data[idx]);
        }
        Ok(())
    }

    /// Columns `[start, end)` as a new matrix.
    pub fn slice_cols(&self, start: usize, end: usize) -> FrameResult<Matrix> {
        if start > end || end > self.cols {
            return Err(FrameError::InvalidOperation(format!(
                "Invalid column slice {}..{} for {} columns",
                start, end, self.cols
            )));
        }
        let new_cols = end - start;
        let mut data = Vec::with_capacity(self.rows * new_cols);
        for i in 0..self.rows {
            data.extend_from_slice(&self.row(i)[start..end]);
        }
        Matrix::new(data, self.rows, new_cols)
    }

    /// Concatenate matrices side by side. All inputs need the same row count.
    pub fn hstack(parts: &[&Matrix]) -> FrameResult<Matrix> {
        let rows = match parts.first() {
            Some(m) => m.rows,
            None => return Ok(Matrix::zeros(0, 0)),
        };
        for m in parts {
            if m.rows != rows {
                return Err(FrameError::ShapeMismatch {
                    expected: vec![rows],
                    got: vec![m.rows],
                });
            }
        }
        let cols: usize = parts.iter().map(|m| m.cols).sum();
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for m in parts {
                data.extend_from_slice(m.row(i));
            }
        }
        Matrix::new(data, rows, cols)
    }

    pub fn has_nan(&self) -> bool {
        self.data.iter().any(|v| v.is_nan())
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix({}x{}) [", self.rows, self.cols)?;
        for row in self.rows() {
            let cells: Vec<String> = row.iter().map(|v| format!("{:.4}", v)).collect();
            writeln!(f, "  [{}]", cells.join(", "))?;
        }
        write!(f, "]")
    }
}
