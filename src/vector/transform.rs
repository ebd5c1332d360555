//! Operations deriving a new vector from an existing one

use super::{arith::BinaryOp, failed, memo, Vector};
use crate::{lane::LaneOps, matrix::Matrix, norm::Norm, scalar::Scalar, Error, Result};
use num_traits::{Float, Zero};
use std::collections::HashSet;

impl<L: LaneOps> Vector<L> {
    /// Absolute value of every scalar, computed once
    pub fn abs(&self) -> Self {
        memo::get_or_init(&self.memo().abs, "abs", || self.fast_map(L::abs))
    }

    /// Square root of every scalar
    pub fn sqrt(&self) -> Self {
        self.fast_map(L::sqrt)
    }

    /// Raise every scalar to the integer power `power`
    ///
    /// `x^0` is 1 for every `x`, NaN included.
    pub fn to_integer_power(&self, power: u32) -> Self {
        self.fast_map(|lane| lane.integer_power(power))
    }

    /// Divide every scalar by the norm of the vector, computed once per kind
    ///
    /// # Errors
    ///
    /// [`Error::DegenerateVector`] if the norm is zero or not finite, which
    /// includes the empty vector.
    pub fn normalize(&self, kind: Norm) -> Result<Self> {
        memo::get_or_try_init(
            &self.memo().normalized[kind.slot()],
            "normalized",
            || {
                let norm = self.norm(kind);
                if norm.is_zero() || !norm.is_finite() {
                    return Err(failed("normalize", Error::DegenerateVector));
                }
                Ok(self.scalar_op(BinaryOp::Div, norm))
            },
        )
    }

    /// Affine map of the scalars onto `[0, 1]`, computed once
    ///
    /// The minimum maps to 0 and the maximum maps to 1.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyVector`] if the vector is empty
    /// - [`Error::DegenerateVector`] if all scalars are equal
    pub fn rescale(&self) -> Result<Self> {
        memo::get_or_try_init(&self.memo().rescaled, "rescaled", || {
            let (min, max) = (self.min()?, self.max()?);
            let range = max - min;
            if range.is_zero() || !range.is_finite() {
                return Err(failed("rescale", Error::DegenerateVector));
            }
            Ok(self
                .scalar_op(BinaryOp::Sub, min)
                .scalar_op(BinaryOp::Div, range))
        })
    }

    /// Distinct scalars in order of first occurrence, computed once
    ///
    /// `-0.0` and `0.0` are the same scalar, and so are all NaNs.
    pub fn unique(&self) -> Self {
        memo::get_or_init(&self.memo().unique, "unique", || {
            let mut seen = HashSet::with_capacity(self.len());
            self.iter()
                .filter(|x| seen.insert(x.canonical_bits()))
                .collect()
        })
    }

    /// Gather the scalars at `indices`, which may repeat
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] if any index is `>= len`.
    pub fn sample(&self, indices: &[usize]) -> Result<Self> {
        let len = self.len();
        if let Some(&index) = indices.iter().find(|&&index| index >= len) {
            return Err(failed(
                "sample",
                Error::IndexOutOfBounds { index, len },
            ));
        }
        Ok(indices
            .iter()
            .map(|&index| *self.buffer().scalar_ref(index))
            .collect())
    }

    /// Contiguous slice `start..end`, `end` defaulting to the length
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRange`] if `start >= len`, `start >= end` or
    /// `end > len`. Out-of-bounds ends are not clamped.
    pub fn subvector(&self, start: usize, end: Option<usize>) -> Result<Self> {
        let len = self.len();
        let end = end.unwrap_or(len);
        if start >= len || start >= end || end > len {
            return Err(failed(
                "subvector",
                Error::InvalidRange { start, end, len },
            ));
        }
        Ok(Self::from_scalars(&self.as_slice()[start..end]))
    }

    /// Apply a lane-to-lane function to every lane
    ///
    /// This is the fast path for callers that work on packed lanes directly.
    /// Whatever `op` writes to padding positions is discarded.
    pub fn fast_map(&self, op: impl FnMut(L) -> L) -> Self {
        Self::from_buffer(self.buffer().map_lanes(op))
    }

    /// Apply a scalar function to every scalar
    ///
    /// Slower than [`fast_map()`](Self::fast_map), but `op` never sees
    /// padding.
    pub fn map(&self, op: impl FnMut(L::Scalar) -> L::Scalar) -> Self {
        self.iter().map(op).collect()
    }

    /// Row vector times matrix product
    ///
    /// Scalar `j` of the result is the dot product of `self` with column `j`
    /// of `matrix`.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `len` differs from the number of rows
    /// of `matrix`.
    pub fn mul_matrix(&self, matrix: &dyn Matrix<L>) -> Result<Self> {
        if self.len() != matrix.rows_num() {
            return Err(failed(
                "vector-matrix product",
                Error::DimensionMismatch {
                    expected: matrix.rows_num(),
                    actual: self.len(),
                },
            ));
        }
        (0..matrix.columns_num())
            .map(|col| self.dot(&matrix.get_column(col)?))
            .collect::<Result<Vec<_>>>()
            .map(Self::from)
    }
}
