//! Dense matrices for small systems.
//!
//! Mass matrices have one row per generalized coordinate, so they are
//! small and dense; row-major storage and straightforward elimination are
//! the right tools.

use std::ops::{Index, IndexMut};

use crate::error::SolveError;
use crate::traits::{Field, Ring};

/// Dense matrix stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseMatrix<R> {
    /// Matrix entries in row-major order.
    data: Vec<R>,
    /// Number of rows.
    num_rows: usize,
    /// Number of columns.
    num_cols: usize,
}

impl<R: Ring> DenseMatrix<R> {
    /// Creates a new matrix filled with zeros.
    #[must_use]
    pub fn zeros(num_rows: usize, num_cols: usize) -> Self {
        Self {
            data: vec![R::zero(); num_rows * num_cols],
            num_rows,
            num_cols,
        }
    }

    /// Creates a matrix from rows.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::DimensionMismatch`] if the rows differ in
    /// length.
    pub fn from_rows(rows: Vec<Vec<R>>) -> Result<Self, SolveError> {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(num_rows * num_cols);
        for row in rows {
            if row.len() != num_cols {
                return Err(SolveError::DimensionMismatch {
                    expected: num_cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            num_rows,
            num_cols,
        })
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Checks if the matrix is square.
    #[must_use]
    pub fn is_square(&self) -> bool {
        self.num_rows == self.num_cols
    }

    /// Returns a reference to the entry at (row, col).
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&R> {
        if row < self.num_rows && col < self.num_cols {
            Some(&self.data[row * self.num_cols + col])
        } else {
            None
        }
    }

    /// Returns a column as a vector.
    #[must_use]
    pub fn col(&self, col: usize) -> Vec<R> {
        (0..self.num_rows)
            .map(|row| self[(row, col)].clone())
            .collect()
    }

    /// Swaps two rows in-place.
    pub fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        for k in 0..self.num_cols {
            self.data.swap(i * self.num_cols + k, j * self.num_cols + k);
        }
    }

    /// Adds a scaled row to another: row[target] += scale * row[source].
    pub fn add_scaled_row(&mut self, target: usize, source: usize, scale: &R) {
        for k in 0..self.num_cols {
            let val = self[(source, k)].clone() * scale.clone();
            self[(target, k)] = self[(target, k)].clone() + val;
        }
    }

    /// Scales a row by a scalar.
    pub fn scale_row(&mut self, row: usize, scale: &R) {
        for k in 0..self.num_cols {
            self[(row, k)] = self[(row, k)].clone() * scale.clone();
        }
    }

    /// First row at or below `from` with a non-zero entry in `col`.
    fn find_pivot(&self, col: usize, from: usize) -> Option<usize> {
        (from..self.num_rows).find(|&row| !self[(row, col)].is_zero())
    }
}

impl<R: Field> DenseMatrix<R> {
    /// Solves the square system `A x = b` by Gauss-Jordan elimination.
    ///
    /// # Errors
    ///
    /// - [`SolveError::NotSquare`] if `A` is not square
    /// - [`SolveError::DimensionMismatch`] if `b` has the wrong length
    /// - [`SolveError::Singular`] naming the first column without a pivot
    pub fn solve(&self, b: &[R]) -> Result<Vec<R>, SolveError> {
        if !self.is_square() {
            return Err(SolveError::NotSquare {
                rows: self.num_rows,
                cols: self.num_cols,
            });
        }
        if b.len() != self.num_rows {
            return Err(SolveError::DimensionMismatch {
                expected: self.num_rows,
                found: b.len(),
            });
        }
        let n = self.num_rows;
        tracing::debug!(size = n, "gauss-jordan solve");

        // Augmented matrix [A | b]
        let mut aug = Self::zeros(n, n + 1);
        for i in 0..n {
            for j in 0..n {
                aug[(i, j)] = self[(i, j)].clone();
            }
            aug[(i, n)] = b[i].clone();
        }

        for col in 0..n {
            let pivot = aug
                .find_pivot(col, col)
                .ok_or(SolveError::Singular { column: col })?;
            aug.swap_rows(col, pivot);

            let inv = aug[(col, col)]
                .inv()
                .ok_or(SolveError::Singular { column: col })?;
            aug.scale_row(col, &inv);

            for row in 0..n {
                if row != col && !aug[(row, col)].is_zero() {
                    let factor = -aug[(row, col)].clone();
                    aug.add_scaled_row(row, col, &factor);
                }
            }
        }

        Ok(aug.col(n))
    }
}

impl<R> Index<(usize, usize)> for DenseMatrix<R> {
    type Output = R;

    fn index(&self, (row, col): (usize, usize)) -> &R {
        &self.data[row * self.num_cols + col]
    }
}

impl<R> IndexMut<(usize, usize)> for DenseMatrix<R> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut R {
        &mut self.data[row * self.num_cols + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagrange_core::Rational;

    fn q(n: i64) -> Rational {
        Rational::from(n)
    }

    fn matrix(rows: &[&[i64]]) -> DenseMatrix<Rational> {
        DenseMatrix::from_rows(rows.iter().map(|r| r.iter().map(|&v| q(v)).collect()).collect())
            .unwrap()
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![q(1), q(2)], vec![q(3)]];
        assert_eq!(
            DenseMatrix::from_rows(rows),
            Err(SolveError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_solve() {
        // 2x + y = 5, x + 3y = 10  =>  x = 1, y = 3
        let m = matrix(&[&[2, 1], &[1, 3]]);
        let x = m.solve(&[q(5), q(10)]).unwrap();
        assert_eq!(x, vec![q(1), q(3)]);
        assert_eq!(m.get(1, 1), Some(&q(3)));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.col(0), vec![q(2), q(1)]);
    }

    #[test]
    fn test_solve_needs_row_swap() {
        let m = matrix(&[&[0, 1], &[1, 0]]);
        assert_eq!(m.solve(&[q(7), q(9)]).unwrap(), vec![q(9), q(7)]);
    }

    #[test]
    fn test_singular() {
        let m = matrix(&[&[1, 2], &[2, 4]]);
        assert_eq!(
            m.solve(&[q(1), q(2)]),
            Err(SolveError::Singular { column: 1 })
        );
        let zero_row = matrix(&[&[0, 0], &[0, 1]]);
        assert_eq!(
            zero_row.solve(&[q(0), q(1)]),
            Err(SolveError::Singular { column: 0 })
        );
    }

    #[test]
    fn test_not_square() {
        let m = matrix(&[&[1, 2, 3]]);
        assert!(matches!(m.solve(&[q(1)]), Err(SolveError::NotSquare { .. })));
    }
}
