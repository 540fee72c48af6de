//! Dense matrix engine.
//!
//! A [`Matrix`] is a `width * height` grid of `f64` values stored in a single
//! row-major vector: the value at `(column, row)` lives at offset
//! `row * width + column`. Every accessor in this module takes its indices in
//! that `(column, row)` order.
//!
//! The engine is deliberately dense and elimination-based; it backs the
//! per-step solve of the transient simulator, where systems are small.

mod elimination;
mod ops;

pub use ops::{cross_product, dot_product, power};

use std::fmt;
use std::ops::{Index, IndexMut};

use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};

use crate::error::{NodalError, Result};

/// A dense, row-major matrix of `f64` values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Matrix {
    values: Vec<f64>,
    width: usize,
    height: usize,
}

impl Matrix {
    /// Create a zero-filled matrix with `width` columns and `height` rows.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            values: vec![0.0; width * height],
            width,
            height,
        }
    }

    /// Build a matrix from a nested literal, one inner vector per row.
    ///
    /// Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);

        let mut values = Vec::with_capacity(width * height);
        for row in rows {
            if row.len() != width {
                return Err(NodalError::dimension_mismatch(
                    "from_rows",
                    (width, 1),
                    (row.len(), 1),
                ));
            }
            values.extend(row);
        }

        Ok(Self {
            values,
            width,
            height,
        })
    }

    /// Build a single-column matrix.
    pub fn column_vector(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
            width: 1,
            height: values.len(),
        }
    }

    /// The `size x size` identity matrix.
    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::new(size, size);
        for offset in 0..size {
            matrix[(offset, offset)] = 1.0;
        }
        matrix
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Dimensions as `(width, height)`.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Total number of cells (`width * height`).
    pub fn volume(&self) -> usize {
        self.width * self.height
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    pub fn is_empty(&self) -> bool {
        self.volume() == 0
    }

    /// Raw row-major storage.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Read the value at `(column, row)`.
    pub fn get(&self, column: usize, row: usize) -> Result<f64> {
        let offset = self.checked_offset(column, row)?;
        Ok(self.values[offset])
    }

    /// Mutable access to the value at `(column, row)`.
    pub fn get_mut(&mut self, column: usize, row: usize) -> Result<&mut f64> {
        let offset = self.checked_offset(column, row)?;
        Ok(&mut self.values[offset])
    }

    /// Overwrite the value at `(column, row)`.
    pub fn set(&mut self, column: usize, row: usize, value: f64) -> Result<()> {
        *self.get_mut(column, row)? = value;
        Ok(())
    }

    /// Change the dimensions in place.
    ///
    /// Cells present in both the old and the new bounding box keep their
    /// value, new cells are zero, and cells outside the new bounds are lost.
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) == self.size() {
            return;
        }

        let mut values = vec![0.0; width * height];
        let keep_width = width.min(self.width);
        for row in 0..height.min(self.height) {
            let src = row * self.width;
            let dst = row * width;
            values[dst..dst + keep_width].copy_from_slice(&self.values[src..src + keep_width]);
        }

        self.values = values;
        self.width = width;
        self.height = height;
    }

    /// Zero every value, keeping the dimensions.
    pub fn clear(&mut self) {
        self.values.fill(0.0);
    }

    /// A new matrix with rows and columns swapped.
    pub fn transpose(&self) -> Self {
        let mut result = Self::new(self.height, self.width);
        for row in 0..self.height {
            for column in 0..self.width {
                result.values[column * self.height + row] = self.values[self.offset(column, row)];
            }
        }
        result
    }

    /// Row-major offset of `(column, row)`. Callers check bounds.
    fn offset(&self, column: usize, row: usize) -> usize {
        row * self.width + column
    }

    /// `(column, row)` of a row-major offset.
    fn position(&self, offset: usize) -> (usize, usize) {
        (offset % self.width, offset / self.width)
    }

    fn checked_offset(&self, column: usize, row: usize) -> Result<usize> {
        if column >= self.width || row >= self.height {
            return Err(NodalError::OutOfBounds {
                column,
                row,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.offset(column, row))
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = NodalError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    /// Panics when `(column, row)` is out of bounds; use [`Matrix::get`]
    /// for a fallible lookup.
    fn index(&self, (column, row): (usize, usize)) -> &f64 {
        assert!(
            column < self.width && row < self.height,
            "index ({column}, {row}) out of bounds for {}x{} matrix",
            self.width,
            self.height
        );
        &self.values[self.offset(column, row)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (column, row): (usize, usize)) -> &mut f64 {
        assert!(
            column < self.width && row < self.height,
            "index ({column}, {row}) out of bounds for {}x{} matrix",
            self.width,
            self.height
        );
        let offset = self.offset(column, row);
        &mut self.values[offset]
    }
}

/// Matrices are equal when their dimensions match exactly and every pair of
/// values differs by less than machine epsilon.
impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.abs_diff_eq(other, f64::EPSILON)
    }
}

impl AbsDiffEq for Matrix {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    /// Dimension-strict; a pair is close when `|a - b| < epsilon`, so NaN
    /// never compares equal.
    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.size() == other.size()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| (a - b).abs() < epsilon)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "[]");
        }
        for (offset, value) in self.values.iter().enumerate() {
            let (column, row) = self.position(offset);
            if column == 0 {
                if row > 0 {
                    writeln!(f, "]")?;
                }
                write!(f, "[")?;
            } else {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}
