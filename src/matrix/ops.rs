//! Matrix arithmetic: scalar scaling, elementwise addition, products, powers.

use std::ops::{Mul, MulAssign};

use super::Matrix;
use crate::error::{NodalError, Result};

impl Matrix {
    /// Divide every element by `factor`.
    pub fn checked_div(&self, factor: f64) -> Result<Matrix> {
        let mut result = self.clone();
        result.div_assign_checked(factor)?;
        Ok(result)
    }

    /// In-place form of [`Matrix::checked_div`].
    pub fn div_assign_checked(&mut self, factor: f64) -> Result<()> {
        if factor == 0.0 {
            return Err(NodalError::DivisionByZero);
        }
        for value in &mut self.values {
            *value /= factor;
        }
        Ok(())
    }

    /// Elementwise sum; both operands must have the same dimensions.
    pub fn checked_add(&self, other: &Matrix) -> Result<Matrix> {
        let mut result = self.clone();
        result.add_assign_checked(other)?;
        Ok(result)
    }

    /// In-place form of [`Matrix::checked_add`].
    pub fn add_assign_checked(&mut self, other: &Matrix) -> Result<()> {
        if self.size() != other.size() {
            return Err(NodalError::dimension_mismatch("add", self.size(), other.size()));
        }
        for (value, addend) in self.values.iter_mut().zip(&other.values) {
            *value += addend;
        }
        Ok(())
    }
}

impl MulAssign<f64> for Matrix {
    fn mul_assign(&mut self, factor: f64) {
        for value in &mut self.values {
            *value *= factor;
        }
    }
}

impl Mul<f64> for Matrix {
    type Output = Matrix;

    fn mul(mut self, factor: f64) -> Matrix {
        self *= factor;
        self
    }
}

impl Mul<f64> for &Matrix {
    type Output = Matrix;

    fn mul(self, factor: f64) -> Matrix {
        self.clone() * factor
    }
}

/// Sum over all positions of the elementwise product.
pub fn dot_product(one: &Matrix, two: &Matrix) -> Result<f64> {
    if one.size() != two.size() {
        return Err(NodalError::dimension_mismatch("dot_product", one.size(), two.size()));
    }
    Ok(one.values.iter().zip(&two.values).map(|(a, b)| a * b).sum())
}

/// Standard matrix product `one * two`.
///
/// Requires `one.width() == two.height()`; the result is
/// `two.width()` wide and `one.height()` tall.
pub fn cross_product(one: &Matrix, two: &Matrix) -> Result<Matrix> {
    if one.width != two.height {
        return Err(NodalError::dimension_mismatch("cross_product", one.size(), two.size()));
    }

    let mut result = Matrix::new(two.width, one.height);
    for row in 0..one.height {
        let lhs = &one.values[row * one.width..(row + 1) * one.width];
        for column in 0..two.width {
            result.values[row * two.width + column] = lhs
                .iter()
                .enumerate()
                .map(|(k, a)| a * two.values[k * two.width + column])
                .sum();
        }
    }
    Ok(result)
}

/// Raise a square matrix to a non-negative integer power.
///
/// `exponent == 0` yields the identity of matching size.
pub fn power(matrix: &Matrix, exponent: u32) -> Result<Matrix> {
    if !matrix.is_square() {
        return Err(NodalError::NotSquare {
            width: matrix.width,
            height: matrix.height,
        });
    }

    let mut result = Matrix::identity(matrix.height);
    for _ in 0..exponent {
        result = cross_product(&result, matrix)?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn m2() -> Matrix {
        Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap()
    }

    #[test]
    fn test_scalar_multiply() {
        let m = &m2() * 2.0;
        assert_eq!(m, Matrix::from_rows(vec![vec![2.0, 4.0], vec![6.0, 8.0]]).unwrap());

        let mut n = m2();
        n *= -1.0;
        assert_eq!(n[(1, 1)], -4.0);
    }

    #[test]
    fn test_scalar_divide() {
        let m = m2().checked_div(2.0).unwrap();
        assert_eq!(m, Matrix::from_rows(vec![vec![0.5, 1.0], vec![1.5, 2.0]]).unwrap());
        assert_eq!(m2().checked_div(0.0), Err(NodalError::DivisionByZero));

        let mut n = m2();
        assert_eq!(n.div_assign_checked(0.0), Err(NodalError::DivisionByZero));
        assert_eq!(n, m2());
    }

    #[test]
    fn test_add() {
        let sum = m2().checked_add(&Matrix::identity(2)).unwrap();
        assert_eq!(sum, Matrix::from_rows(vec![vec![2.0, 2.0], vec![3.0, 5.0]]).unwrap());

        let mut acc = Matrix::new(2, 2);
        acc.add_assign_checked(&m2()).unwrap();
        acc.add_assign_checked(&m2()).unwrap();
        assert_eq!(acc, &m2() * 2.0);
    }

    #[test]
    fn test_add_dimension_mismatch() {
        let err = m2().checked_add(&Matrix::new(3, 2)).unwrap_err();
        assert!(matches!(err, NodalError::DimensionMismatch { operation: "add", .. }));
    }

    #[test]
    fn test_dot_product() {
        assert_relative_eq!(dot_product(&m2(), &m2()).unwrap(), 30.0);
        assert!(dot_product(&m2(), &Matrix::new(1, 4)).is_err());
    }

    #[test]
    fn test_cross_product() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let b = Matrix::column_vector(&[1.0, 0.0, -1.0]);
        let c = cross_product(&a, &b).unwrap();
        assert_eq!(c.size(), (1, 2));
        assert_eq!(c, Matrix::column_vector(&[-2.0, -2.0]));

        let aat = cross_product(&a, &a.transpose()).unwrap();
        assert_eq!(aat, Matrix::from_rows(vec![vec![14.0, 32.0], vec![32.0, 77.0]]).unwrap());
    }

    #[test]
    fn test_cross_product_dimension_mismatch() {
        let a = Matrix::new(3, 2);
        assert!(matches!(
            cross_product(&a, &a),
            Err(NodalError::DimensionMismatch { operation: "cross_product", .. })
        ));
    }

    #[test]
    fn test_power() {
        let m = m2();
        assert_eq!(power(&m, 0).unwrap(), Matrix::identity(2));
        assert_eq!(power(&m, 1).unwrap(), m);
        assert_eq!(power(&m, 2).unwrap(), cross_product(&m, &m).unwrap());
        assert_eq!(
            power(&m, 3).unwrap(),
            Matrix::from_rows(vec![vec![37.0, 54.0], vec![81.0, 118.0]]).unwrap()
        );
        assert!(matches!(power(&Matrix::new(2, 3), 2), Err(NodalError::NotSquare { .. })));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn square() -> impl Strategy<Value = Matrix> {
        (0usize..5).prop_flat_map(|n| {
            prop::collection::vec(-10.0_f64..10.0, n * n).prop_map(move |values| Matrix {
                values,
                width: n,
                height: n,
            })
        })
    }

    proptest! {
        #[test]
        fn power_base_cases(m in square()) {
            prop_assert_eq!(power(&m, 0).unwrap(), Matrix::identity(m.height()));
            prop_assert_eq!(power(&m, 1).unwrap(), m.clone());
            prop_assert_eq!(power(&m, 2).unwrap(), cross_product(&m, &m).unwrap());
        }

        #[test]
        fn identity_is_neutral(m in square()) {
            let id = Matrix::identity(m.height());
            prop_assert_eq!(cross_product(&id, &m).unwrap(), m.clone());
            prop_assert_eq!(cross_product(&m, &id).unwrap(), m);
        }
    }
}
