//! Row-major matrices built on top of [`Vector`]
//!
//! Every matrix operation decomposes into vector operations on rows or
//! columns, so matrices inherit the lane packing of their rows. Columns are
//! only materialized on first use, then cached like the derived values of a
//! vector.

use crate::{
    lane::LaneOps,
    scalar::Scalar,
    storage::index_failed,
    vector::{BinaryOp, Operand, Vector},
    Error, Result,
};
use core::{
    fmt,
    ops::{Index, Range},
};
use log::{debug, trace};
use num_traits::{Float, One, Zero};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::OnceLock;

/// Report an error detected at the API boundary, then hand it back
#[cold]
#[inline(never)]
fn failed(operation: &str, error: Error) -> Error {
    debug!("[DenseMatrix] FAILED: {operation}: {error}");
    error
}

/// Read access to a two-dimensional arrangement of scalars
///
/// This is what vectors need from a matrix to multiply with it or to use it
/// as an arithmetic operand.
pub trait Matrix<L: LaneOps> {
    /// Number of rows
    fn rows_num(&self) -> usize;

    /// Number of columns
    fn columns_num(&self) -> usize;

    /// Row `row` as a vector of length `columns_num()`
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] if `row >= rows_num()`.
    fn get_row(&self, row: usize) -> Result<Vector<L>>;

    /// Column `column` as a vector of length `rows_num()`
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] if `column >= columns_num()`.
    fn get_column(&self, column: usize) -> Result<Vector<L>>;

    /// All scalars, row after row
    fn to_vector(&self) -> Vector<L>;
}

/// Dense row-major matrix
pub struct DenseMatrix<L: LaneOps> {
    rows: Vec<Vector<L>>,
    columns_num: usize,
    columns: OnceLock<Vec<Vector<L>>>,
}
//
impl<L: LaneOps> DenseMatrix<L> {
    // === CONSTRUCTION ===

    fn from_parts(rows: Vec<Vector<L>>, columns_num: usize) -> Self {
        Self {
            rows,
            columns_num,
            columns: OnceLock::new(),
        }
    }

    /// Matrix with the given rows
    ///
    /// An empty list of rows gives a 0x0 matrix.
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if the rows do not all have the same length.
    pub fn from_rows(rows: Vec<Vector<L>>) -> Result<Self> {
        let columns_num = rows.first().map_or(0, Vector::len);
        if let Some(row) = rows.iter().find(|row| row.len() != columns_num) {
            return Err(failed(
                "from_rows",
                Error::LengthMismatch {
                    expected: columns_num,
                    actual: row.len(),
                },
            ));
        }
        Ok(Self::from_parts(rows, columns_num))
    }

    /// `rows_num x columns_num` matrix from row-major scalars
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if `scalars` does not hold exactly
    /// `rows_num * columns_num` scalars.
    pub fn from_flat(rows_num: usize, columns_num: usize, scalars: &[L::Scalar]) -> Result<Self> {
        let expected = rows_num * columns_num;
        if scalars.len() != expected {
            return Err(failed(
                "from_flat",
                Error::LengthMismatch {
                    expected,
                    actual: scalars.len(),
                },
            ));
        }
        let rows = (0..rows_num)
            .map(|row| Vector::from_scalars(&scalars[row * columns_num..(row + 1) * columns_num]))
            .collect();
        Ok(Self::from_parts(rows, columns_num))
    }

    /// Matrix with every scalar set to `value`
    pub fn filled(rows_num: usize, columns_num: usize, value: L::Scalar) -> Self {
        // Rows are immutable, so they can all share one buffer
        let row = Vector::filled(value, columns_num);
        Self::from_parts(vec![row; rows_num], columns_num)
    }

    /// `size x size` identity matrix
    pub fn identity(size: usize) -> Self {
        let rows = (0..size)
            .map(|row| {
                (0..size)
                    .map(|col| {
                        if row == col {
                            L::Scalar::one()
                        } else {
                            L::Scalar::zero()
                        }
                    })
                    .collect()
            })
            .collect();
        Self::from_parts(rows, size)
    }

    /// Matrix of scalars drawn uniformly from `range` by a generator seeded
    /// with `seed`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSampleRange`] if `range` is empty or unbounded.
    pub fn random_seeded(
        rows_num: usize,
        columns_num: usize,
        range: Range<L::Scalar>,
        seed: u64,
    ) -> Result<Self> {
        debug!("[DenseMatrix] sampling a {rows_num}x{columns_num} {} matrix", L::DTYPE);
        let mut rng = StdRng::seed_from_u64(seed);
        let rows = (0..rows_num)
            .map(|_| Vector::random(columns_num, range.clone(), &mut rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_parts(rows, columns_num))
    }

    // === ACCESSORS ===

    /// Rows of the matrix
    #[inline]
    pub fn rows(&self) -> &[Vector<L>] {
        &self.rows
    }

    /// Columns of the matrix, built on first use
    pub fn columns(&self) -> &[Vector<L>] {
        self.columns.get_or_init(|| {
            trace!(
                "[DenseMatrix] memoizing {} columns of length {}",
                self.columns_num,
                self.rows.len()
            );
            (0..self.columns_num)
                .map(|col| {
                    self.rows
                        .iter()
                        .map(|row| row.as_slice()[col])
                        .collect()
                })
                .collect()
        })
    }

    /// `(rows_num, columns_num)`
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns_num)
    }

    /// Truth that the matrix holds no scalar
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns_num == 0
    }

    /// Scalar at row `row` and column `column`
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] if either index is out of range.
    pub fn get(&self, row: usize, column: usize) -> Result<L::Scalar> {
        self.check_index(row, column)?;
        self.rows[row].get(column)
    }

    fn check_index(&self, row: usize, column: usize) -> Result<()> {
        if row >= self.rows.len() {
            Err(Error::IndexOutOfBounds {
                index: row,
                len: self.rows.len(),
            })
        } else if column >= self.columns_num {
            Err(Error::IndexOutOfBounds {
                index: column,
                len: self.columns_num,
            })
        } else {
            Ok(())
        }
    }

    // === ALGEBRA ===

    /// Swap rows and columns
    pub fn transpose(&self) -> Self {
        Self::from_parts(self.columns().to_vec(), self.rows.len())
    }

    /// Matrix times column vector product
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `vector.len()` differs from the number
    /// of columns.
    pub fn mul_vector(&self, vector: &Vector<L>) -> Result<Vector<L>> {
        if vector.len() != self.columns_num {
            return Err(failed(
                "matrix-vector product",
                Error::DimensionMismatch {
                    expected: self.columns_num,
                    actual: vector.len(),
                },
            ));
        }
        self.rows
            .iter()
            .map(|row| row.dot(vector))
            .collect::<Result<Vec<_>>>()
            .map(Vector::from)
    }

    /// Matrix product
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if the number of columns of `self`
    /// differs from the number of rows of `other`.
    pub fn mul_matrix(&self, other: &dyn Matrix<L>) -> Result<Self> {
        if self.columns_num != other.rows_num() {
            return Err(failed(
                "matrix product",
                Error::DimensionMismatch {
                    expected: self.columns_num,
                    actual: other.rows_num(),
                },
            ));
        }
        let rows = self
            .rows
            .iter()
            .map(|row| row.mul_matrix(other))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_parts(rows, other.columns_num()))
    }

    /// Combine this matrix with `operand` element by element
    ///
    /// A scalar applies to every element, a vector applies to every row and
    /// a matrix must have the same shape.
    ///
    /// # Errors
    ///
    /// - [`Error::LengthMismatch`] if a vector operand does not have one
    ///   scalar per column
    /// - [`Error::DimensionMismatch`] if a matrix operand has another shape
    pub fn apply<'a>(&self, op: BinaryOp, operand: impl Into<Operand<'a, L>>) -> Result<Self> {
        let rows: Vec<Vector<L>> = match operand.into() {
            Operand::Scalar(x) => self.rows.iter().map(|row| row.scalar_op(op, x)).collect(),
            Operand::Vector(vector) => self
                .rows
                .iter()
                .map(|row| row.apply(op, vector))
                .collect::<Result<Vec<_>>>()?,
            Operand::Matrix(other) => {
                let shape = (other.rows_num(), other.columns_num());
                if shape != self.shape() {
                    let (expected, actual) = if shape.0 != self.rows.len() {
                        (self.rows.len(), shape.0)
                    } else {
                        (self.columns_num, shape.1)
                    };
                    return Err(failed(
                        "element-wise matrix operation",
                        Error::DimensionMismatch { expected, actual },
                    ));
                }
                self.rows
                    .iter()
                    .enumerate()
                    .map(|(idx, row)| row.apply(op, &other.get_row(idx)?))
                    .collect::<Result<Vec<_>>>()?
            }
        };
        Ok(Self::from_parts(rows, self.columns_num))
    }

    /// `self + operand`, see [`apply()`](Self::apply)
    ///
    /// # Errors
    ///
    /// Same as [`apply()`](Self::apply).
    pub fn add<'a>(&self, operand: impl Into<Operand<'a, L>>) -> Result<Self> {
        self.apply(BinaryOp::Add, operand)
    }

    /// `self - operand`, see [`apply()`](Self::apply)
    ///
    /// # Errors
    ///
    /// Same as [`apply()`](Self::apply).
    pub fn sub<'a>(&self, operand: impl Into<Operand<'a, L>>) -> Result<Self> {
        self.apply(BinaryOp::Sub, operand)
    }

    /// `self * operand` element by element, see [`apply()`](Self::apply)
    ///
    /// Use [`mul_matrix()`](Self::mul_matrix) for the matrix product.
    ///
    /// # Errors
    ///
    /// Same as [`apply()`](Self::apply).
    pub fn mul<'a>(&self, operand: impl Into<Operand<'a, L>>) -> Result<Self> {
        self.apply(BinaryOp::Mul, operand)
    }

    /// `self / operand`, see [`apply()`](Self::apply)
    ///
    /// # Errors
    ///
    /// Same as [`apply()`](Self::apply).
    pub fn div<'a>(&self, operand: impl Into<Operand<'a, L>>) -> Result<Self> {
        self.apply(BinaryOp::Div, operand)
    }

    // === REDUCTIONS ===

    /// Sum of all scalars
    pub fn sum(&self) -> L::Scalar {
        self.rows
            .iter()
            .fold(L::Scalar::zero(), |acc, row| acc + row.sum())
    }

    /// Mean of all scalars
    ///
    /// # Errors
    ///
    /// [`Error::EmptyVector`] if the matrix holds no scalar.
    pub fn mean(&self) -> Result<L::Scalar> {
        if self.is_empty() {
            return Err(failed("mean", Error::EmptyVector));
        }
        Ok(self.sum() / L::Scalar::from_usize(self.rows.len() * self.columns_num))
    }

    /// Largest scalar
    ///
    /// # Errors
    ///
    /// [`Error::EmptyVector`] if the matrix holds no scalar.
    pub fn max(&self) -> Result<L::Scalar> {
        self.extremum("max", Vector::max, Float::max)
    }

    /// Smallest scalar
    ///
    /// # Errors
    ///
    /// [`Error::EmptyVector`] if the matrix holds no scalar.
    pub fn min(&self) -> Result<L::Scalar> {
        self.extremum("min", Vector::min, Float::min)
    }

    fn extremum(
        &self,
        operation: &str,
        per_row: impl Fn(&Vector<L>) -> Result<L::Scalar>,
        combine: impl Fn(L::Scalar, L::Scalar) -> L::Scalar,
    ) -> Result<L::Scalar> {
        if self.is_empty() {
            return Err(failed(operation, Error::EmptyVector));
        }
        let mut rows = self.rows.iter();
        let first = rows.next().map_or(Err(Error::EmptyVector), &per_row)?;
        rows.try_fold(first, |acc, row| Ok(combine(acc, per_row(row)?)))
    }
}
//
impl<L: LaneOps> Matrix<L> for DenseMatrix<L> {
    #[inline]
    fn rows_num(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    fn columns_num(&self) -> usize {
        self.columns_num
    }

    fn get_row(&self, row: usize) -> Result<Vector<L>> {
        self.rows.get(row).cloned().ok_or(Error::IndexOutOfBounds {
            index: row,
            len: self.rows.len(),
        })
    }

    fn get_column(&self, column: usize) -> Result<Vector<L>> {
        self.columns()
            .get(column)
            .cloned()
            .ok_or(Error::IndexOutOfBounds {
                index: column,
                len: self.columns_num,
            })
    }

    fn to_vector(&self) -> Vector<L> {
        self.rows.iter().flat_map(|row| row.iter()).collect()
    }
}
//
impl<L: LaneOps> Clone for DenseMatrix<L> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            columns_num: self.columns_num,
            columns: self.columns.clone(),
        }
    }
}
//
impl<L: LaneOps> PartialEq for DenseMatrix<L> {
    fn eq(&self, other: &Self) -> bool {
        self.columns_num == other.columns_num && self.rows == other.rows
    }
}
//
impl<L: LaneOps> Index<(usize, usize)> for DenseMatrix<L> {
    type Output = L::Scalar;

    #[inline]
    fn index(&self, (row, column): (usize, usize)) -> &L::Scalar {
        if let Err(e) = self.check_index(row, column) {
            index_failed(e)
        }
        &self.rows[row][column]
    }
}
//
impl<L: LaneOps> fmt::Debug for DenseMatrix<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DenseMatrix<{}>({}x{})",
            L::DTYPE,
            self.rows.len(),
            self.columns_num
        )?;
        f.debug_list()
            .entries(self.rows.iter().map(|row| row.as_slice()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lane::{f32x4, f64x2};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn two_by_three() -> DenseMatrix<f64x2> {
        DenseMatrix::from_flat(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
    }

    #[test]
    fn construction() {
        let m = two_by_three();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(1, 2), Ok(6.0));
        assert_eq!(m[(0, 1)], 2.0);
        assert_eq!(m.get(2, 0), Err(Error::IndexOutOfBounds { index: 2, len: 2 }));
        assert_eq!(m.get(0, 3), Err(Error::IndexOutOfBounds { index: 3, len: 3 }));

        let rows = m.rows().to_vec();
        assert_eq!(DenseMatrix::from_rows(rows).unwrap(), m);
        assert_eq!(
            DenseMatrix::from_rows(vec![Vector::<f64x2>::ones(2), Vector::ones(3)]),
            Err(Error::LengthMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(
            DenseMatrix::<f64x2>::from_flat(2, 2, &[1.0; 3]).unwrap_err(),
            Error::LengthMismatch {
                expected: 4,
                actual: 3
            }
        );

        let filled = DenseMatrix::<f32x4>::filled(3, 5, 2.0);
        assert_eq!(filled.sum(), 30.0);
        let identity = DenseMatrix::<f32x4>::identity(3);
        assert_eq!(identity.to_vector().to_vec(), [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

        let empty = DenseMatrix::<f32x4>::from_rows(Vec::new()).unwrap();
        assert_eq!(empty.shape(), (0, 0));
        assert!(empty.is_empty());
    }

    #[test]
    #[should_panic(expected = "index 5 is out of bounds for length 3")]
    fn index_out_of_bounds() {
        let _ = two_by_three()[(0, 5)];
    }

    #[test]
    fn rows_and_columns() {
        let m = two_by_three();
        assert_eq!(m.get_row(1).unwrap().to_vec(), [4.0, 5.0, 6.0]);
        assert_eq!(m.get_column(2).unwrap().to_vec(), [3.0, 6.0]);
        assert!(m.get_row(2).is_err());
        assert!(m.get_column(3).is_err());

        let t = m.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.to_vector().to_vec(), [1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn products() {
        let m = two_by_three();
        let v = Vector::<f64x2>::from_scalars(&[1.0, 0.0, -1.0]);
        assert_eq!(m.mul_vector(&v).unwrap().to_vec(), [-2.0, -2.0]);
        assert_eq!(
            m.mul_vector(&Vector::ones(2)),
            Err(Error::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );

        let gram = m.mul_matrix(&m.transpose()).unwrap();
        assert_eq!(gram.shape(), (2, 2));
        assert_eq!(gram.to_vector().to_vec(), [14.0, 32.0, 32.0, 77.0]);
        assert_eq!(m.mul_matrix(&DenseMatrix::<f64x2>::identity(3)).unwrap(), m);
        assert!(matches!(
            m.mul_matrix(&m),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn elementwise() {
        let m = two_by_three();
        assert_eq!(m.add(1.0).unwrap().to_vector().to_vec(), [2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(m.sub(&m).unwrap(), DenseMatrix::filled(2, 3, 0.0));
        assert_eq!(m.div(&m).unwrap(), DenseMatrix::filled(2, 3, 1.0));

        let row = Vector::<f64x2>::from_scalars(&[1.0, 10.0, 100.0]);
        assert_eq!(
            m.mul(&row).unwrap().to_vector().to_vec(),
            [1.0, 20.0, 300.0, 4.0, 50.0, 600.0]
        );
        assert!(matches!(
            m.mul(&Vector::ones(2)),
            Err(Error::LengthMismatch { .. })
        ));
        assert_eq!(
            m.add(&m.transpose()),
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn reductions() {
        let m = two_by_three();
        assert_eq!(m.sum(), 21.0);
        assert_eq!(m.mean(), Ok(3.5));
        assert_eq!(m.max(), Ok(6.0));
        assert_eq!(m.min(), Ok(1.0));

        let empty = DenseMatrix::<f64x2>::filled(3, 0, 1.0);
        assert_eq!(empty.sum(), 0.0);
        assert_eq!(empty.mean(), Err(Error::EmptyVector));
        assert_eq!(empty.max(), Err(Error::EmptyVector));
    }

    proptest! {
        #[test]
        fn product_with_identity_is_neutral(
            (rows, cols, scalars) in (1usize..6, 1usize..6).prop_flat_map(|(rows, cols)| {
                (Just(rows), Just(cols), prop::collection::vec(-1.0e3f32..1.0e3, rows * cols))
            })
        ) {
            let m = DenseMatrix::<f32x4>::from_flat(rows, cols, &scalars).unwrap();
            prop_assert_eq!(&m.mul_matrix(&DenseMatrix::<f32x4>::identity(cols)).unwrap(), &m);
            prop_assert_eq!(&DenseMatrix::<f32x4>::identity(rows).mul_matrix(&m).unwrap(), &m);
            let v = Vector::<f32x4>::ones(cols);
            let row_sums = m.mul_vector(&v).unwrap();
            for (row, sum) in m.rows().iter().zip(row_sums.iter()) {
                assert_relative_eq!(row.sum(), sum, epsilon = 1e-2);
            }
        }
    }
}
