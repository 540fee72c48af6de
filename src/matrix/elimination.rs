//! Elimination-based determinant and inverse.

use super::Matrix;
use crate::error::{NodalError, Result};

impl Matrix {
    /// Determinant, computed by Gaussian elimination with partial pivoting.
    ///
    /// The empty matrix has determinant 1.
    pub fn determinant(&self) -> Result<f64> {
        self.require_square()?;

        let n = self.height;
        let mut lu = self.values.clone();
        let mut det = 1.0;

        for k in 0..n {
            let pivot_row = pivot_row(&lu, n, k);
            let pivot = lu[pivot_row * n + k];
            if pivot == 0.0 {
                return Ok(0.0);
            }
            if pivot_row != k {
                swap_rows(&mut lu, n, k, pivot_row);
                det = -det;
            }
            det *= pivot;

            for i in (k + 1)..n {
                let factor = lu[i * n + k] / pivot;
                if factor == 0.0 {
                    continue;
                }
                for j in (k + 1)..n {
                    lu[i * n + j] -= factor * lu[k * n + j];
                }
            }
        }

        Ok(det)
    }

    /// True when elimination meets a pivot indistinguishable from zero at the
    /// scale of the row it came from.
    ///
    /// Each pivot is judged on its own, so matrices whose determinant
    /// overflows or underflows an `f64` are still classified correctly.
    pub fn is_singular(&self) -> Result<bool> {
        self.require_square()?;

        let n = self.height;
        let mut lu = self.values.clone();
        let mut scales = self.row_maxima();

        for k in 0..n {
            let pivot_row = pivot_row(&lu, n, k);
            if pivot_row != k {
                swap_rows(&mut lu, n, k, pivot_row);
                scales.swap(k, pivot_row);
            }

            let pivot = lu[k * n + k];
            // Also true for a NaN pivot.
            if !(pivot.abs() > f64::EPSILON * scales[k]) {
                return Ok(true);
            }

            for i in (k + 1)..n {
                let factor = lu[i * n + k] / pivot;
                if factor == 0.0 {
                    continue;
                }
                for j in (k + 1)..n {
                    lu[i * n + j] -= factor * lu[k * n + j];
                }
            }
        }

        Ok(false)
    }

    /// Inverse by Gauss-Jordan elimination on `[A | I]`.
    pub fn inverse(&self) -> Result<Matrix> {
        if self.is_singular()? {
            return Err(NodalError::SingularMatrix);
        }

        let n = self.height;
        let mut work = self.values.clone();
        let mut inverse = Matrix::identity(n);

        for k in 0..n {
            let pivot_row = pivot_row(&work, n, k);
            if work[pivot_row * n + k] == 0.0 {
                return Err(NodalError::SingularMatrix);
            }
            if pivot_row != k {
                swap_rows(&mut work, n, k, pivot_row);
                swap_rows(&mut inverse.values, n, k, pivot_row);
            }

            let pivot = work[k * n + k];
            for j in 0..n {
                work[k * n + j] /= pivot;
                inverse.values[k * n + j] /= pivot;
            }

            for i in 0..n {
                if i == k {
                    continue;
                }
                let factor = work[i * n + k];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..n {
                    work[i * n + j] -= factor * work[k * n + j];
                    inverse.values[i * n + j] -= factor * inverse.values[k * n + j];
                }
            }
        }

        Ok(inverse)
    }

    fn require_square(&self) -> Result<()> {
        if !self.is_square() {
            return Err(NodalError::NotSquare {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Largest magnitude in each row.
    fn row_maxima(&self) -> Vec<f64> {
        if self.width == 0 {
            return Vec::new();
        }
        self.values
            .chunks(self.width)
            .map(|row| row.iter().fold(0.0_f64, |max, v| max.max(v.abs())))
            .collect()
    }
}

/// Row at or below `k` holding the largest magnitude in column `k`.
fn pivot_row(values: &[f64], n: usize, k: usize) -> usize {
    let mut best = k;
    let mut best_value = values[k * n + k].abs();
    for i in (k + 1)..n {
        let value = values[i * n + k].abs();
        if value > best_value {
            best = i;
            best_value = value;
        }
    }
    best
}

fn swap_rows(values: &mut [f64], n: usize, a: usize, b: usize) {
    for j in 0..n {
        values.swap(a * n + j, b * n + j);
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::matrix::cross_product;
    use approx::abs_diff_eq;
    use proptest::prelude::*;

    /// Strictly diagonally dominant, hence invertible and well conditioned.
    fn invertible() -> impl Strategy<Value = Matrix> {
        (1usize..6).prop_flat_map(|n| {
            prop::collection::vec(-1.0_f64..1.0, n * n).prop_map(move |mut values| {
                for i in 0..n {
                    values[i * n + i] += n as f64 + 1.0;
                }
                Matrix {
                    values,
                    width: n,
                    height: n,
                }
            })
        })
    }

    proptest! {
        #[test]
        fn inverse_times_matrix_is_identity(m in invertible()) {
            let product = cross_product(&m.inverse().unwrap(), &m).unwrap();
            prop_assert!(abs_diff_eq!(product, Matrix::identity(m.height()), epsilon = 1e-9));
        }

        #[test]
        fn transpose_preserves_determinant(m in invertible()) {
            let a = m.determinant().unwrap();
            let b = m.transpose().determinant().unwrap();
            prop_assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0));
        }
    }
}
