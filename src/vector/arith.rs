//! Element-wise arithmetic

use super::{failed, Vector};
use crate::{
    lane::{f32x4, f64x2, LaneOps},
    matrix::{DenseMatrix, Matrix},
    Error, Result,
};
use core::{fmt, str::FromStr};

/// Right-hand side of an element-wise operation
///
/// Most callers never name this type: anything that converts into it (a
/// vector or matrix reference, or a bare scalar of the right precision) can
/// be passed to [`Vector::add()`] and friends.
pub enum Operand<'a, L: LaneOps> {
    /// Combine position by position with a vector of the same length
    Vector(&'a Vector<L>),

    /// Flatten the matrix row by row, then combine as a vector
    Matrix(&'a dyn Matrix<L>),

    /// Combine every position with the same scalar
    Scalar(L::Scalar),
}
//
impl<'a, L: LaneOps> From<&'a Vector<L>> for Operand<'a, L> {
    fn from(vector: &'a Vector<L>) -> Self {
        Self::Vector(vector)
    }
}
//
impl<'a, L: LaneOps> From<&'a DenseMatrix<L>> for Operand<'a, L> {
    fn from(matrix: &'a DenseMatrix<L>) -> Self {
        Self::Matrix(matrix)
    }
}
//
impl<L: LaneOps> fmt::Debug for Operand<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vector(v) => f.debug_tuple("Vector").field(v).finish(),
            Self::Matrix(m) => write!(f, "Matrix({}x{})", m.rows_num(), m.columns_num()),
            Self::Scalar(x) => f.debug_tuple("Scalar").field(x).finish(),
        }
    }
}

/// Element-wise arithmetic operator
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}
//
impl BinaryOp {
    /// Operator symbol
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }

    /// Apply the operator to a pair of lanes
    #[inline(always)]
    pub(crate) fn apply_lanes<L: LaneOps>(self, lhs: L, rhs: L) -> L {
        match self {
            Self::Add => lhs.sum(rhs),
            Self::Sub => lhs.sub(rhs),
            Self::Mul => lhs.mul(rhs),
            Self::Div => lhs.div(rhs),
        }
    }
}
//
impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
//
impl FromStr for BinaryOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "+" => Ok(Self::Add),
            "-" => Ok(Self::Sub),
            "*" => Ok(Self::Mul),
            "/" => Ok(Self::Div),
            other => Err(Error::UnsupportedOperand(other.to_owned())),
        }
    }
}

impl<L: LaneOps> Vector<L> {
    /// Combine this vector with `operand` position by position
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if a vector (or flattened matrix) operand
    /// does not have the same length as `self`.
    pub fn apply<'a>(&self, op: BinaryOp, operand: impl Into<Operand<'a, L>>) -> Result<Self> {
        match operand.into() {
            Operand::Scalar(x) => Ok(self.scalar_op(op, x)),
            Operand::Vector(other) => self.vector_op(op, other),
            Operand::Matrix(matrix) => self.vector_op(op, &matrix.to_vector()),
        }
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

    /// `self * operand`, see [`apply()`](Self::apply)
    ///
    /// # Errors
    ///
    /// Same as [`apply()`](Self::apply).
    pub fn mul<'a>(&self, operand: impl Into<Operand<'a, L>>) -> Result<Self> {
        self.apply(BinaryOp::Mul, operand)
    }

    /// `self / operand`, see [`apply()`](Self::apply)
    ///
    /// Division by zero follows IEEE-754 and is not an error.
    ///
    /// # Errors
    ///
    /// Same as [`apply()`](Self::apply).
    pub fn div<'a>(&self, operand: impl Into<Operand<'a, L>>) -> Result<Self> {
        self.apply(BinaryOp::Div, operand)
    }

    /// Parse `op` and apply it, for callers that receive operators as text
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedOperand`] if `op` is not one of `+ - * /`, then
    /// same as [`apply()`](Self::apply).
    pub fn apply_named<'a>(&self, op: &str, operand: impl Into<Operand<'a, L>>) -> Result<Self> {
        let op = op.parse().map_err(|e| failed("apply", e))?;
        self.apply(op, operand)
    }

    /// Combine every position with the same scalar
    pub(crate) fn scalar_op(&self, op: BinaryOp, x: L::Scalar) -> Self {
        let rhs = L::create_filled(x);
        Self::from_buffer(self.buffer().map_lanes(|lane| op.apply_lanes(lane, rhs)))
    }

    fn vector_op(&self, op: BinaryOp, other: &Self) -> Result<Self> {
        self.buffer()
            .zip_lanes(other.buffer(), |a, b| op.apply_lanes(a, b))
            .map(Self::from_buffer)
            .map_err(|e| failed(&format!("element-wise {op}"), e))
    }
}

// Scalars have a fixed precision, so conversions and operator sugar are
// implemented per lane type
macro_rules! impl_scalar_arith {
    (@op $lane:ty, $scalar:ty, $trait:ident, $method:ident, $op:expr) => {
        impl core::ops::$trait<$scalar> for &Vector<$lane> {
            type Output = Vector<$lane>;

            #[inline]
            fn $method(self, rhs: $scalar) -> Vector<$lane> {
                self.scalar_op($op, rhs)
            }
        }
    };
    ($lane:ty, $scalar:ty) => {
        impl From<$scalar> for Operand<'_, $lane> {
            fn from(x: $scalar) -> Self {
                Self::Scalar(x)
            }
        }
        //
        impl_scalar_arith!(@op $lane, $scalar, Add, add, BinaryOp::Add);
        impl_scalar_arith!(@op $lane, $scalar, Sub, sub, BinaryOp::Sub);
        impl_scalar_arith!(@op $lane, $scalar, Mul, mul, BinaryOp::Mul);
        impl_scalar_arith!(@op $lane, $scalar, Div, div, BinaryOp::Div);
        //
        impl core::ops::Neg for &Vector<$lane> {
            type Output = Vector<$lane>;

            #[inline]
            fn neg(self) -> Vector<$lane> {
                self.fast_map(core::ops::Neg::neg)
            }
        }
    };
}
impl_scalar_arith!(f32x4, f32);
impl_scalar_arith!(f64x2, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        lane::tests::V,
        vector::tests::{any_vector, any_vector_pair},
    };
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn vector_operands() {
        let a = Vector::<f32x4>::from_scalars(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = Vector::<f32x4>::from_scalars(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(a.add(&b).unwrap().to_vec(), [6.0; 5]);
        assert_eq!(a.sub(&b).unwrap().to_vec(), [-4.0, -2.0, 0.0, 2.0, 4.0]);
        assert_eq!(a.mul(&b).unwrap().to_vec(), [5.0, 8.0, 9.0, 8.0, 5.0]);
        assert_eq!(a.div(&a).unwrap().to_vec(), [1.0; 5]);
        assert_eq!(
            a.add(&Vector::from_scalars(&[1.0])),
            Err(Error::LengthMismatch {
                expected: 5,
                actual: 1
            })
        );
    }

    #[test]
    fn scalar_operands() {
        let v = Vector::<f64x2>::from_scalars(&[1.0, 2.0, 3.0]);
        assert_eq!(v.add(1.0).unwrap().to_vec(), [2.0, 3.0, 4.0]);
        assert_eq!(v.sub(1.0).unwrap().to_vec(), [0.0, 1.0, 2.0]);
        assert_eq!(v.mul(2.0).unwrap().to_vec(), [2.0, 4.0, 6.0]);
        assert_eq!(v.div(2.0).unwrap().to_vec(), [0.5, 1.0, 1.5]);
        assert_eq!((&v + 1.0).to_vec(), [2.0, 3.0, 4.0]);
        assert_eq!((&v * 3.0).to_vec(), [3.0, 6.0, 9.0]);
        assert_eq!((&v - 1.0).to_vec(), [0.0, 1.0, 2.0]);
        assert_eq!((&v / 2.0).to_vec(), [0.5, 1.0, 1.5]);
        assert_eq!((-&v).to_vec(), [-1.0, -2.0, -3.0]);

        // Padding stays zero even when the operator would change it
        let shifted = v.add(10.0).unwrap();
        assert_eq!(shifted.lanes()[1].into_array(), [13.0, 0.0]);
        let by_zero = v.div(0.0).unwrap();
        assert_eq!(by_zero.lanes()[1].into_array()[1], 0.0);
        assert!(by_zero.iter().all(|x| x.is_infinite()));
    }

    #[test]
    fn matrix_operands() {
        let m = DenseMatrix::<f32x4>::from_flat(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let v = Vector::<f32x4>::ones(4);
        assert_eq!(v.add(&m).unwrap().to_vec(), [2.0, 3.0, 4.0, 5.0]);
        assert!(matches!(
            Vector::<f32x4>::ones(3).mul(&m),
            Err(Error::LengthMismatch { .. })
        ));
    }

    #[test]
    fn operators_by_name() {
        assert_eq!("*".parse::<BinaryOp>(), Ok(BinaryOp::Mul));
        assert_eq!(BinaryOp::Div.to_string(), "/");
        let v = Vector::<f32x4>::from_scalars(&[2.0, 4.0]);
        assert_eq!(v.apply_named("/", 2.0).unwrap().to_vec(), [1.0, 2.0]);
        assert_eq!(
            v.apply_named("%", 2.0),
            Err(Error::UnsupportedOperand("%".into()))
        );
    }

    proptest! {
        #[test]
        fn add_then_sub_round_trips((a, b) in any_vector_pair()) {
            let back = a.add(&b).unwrap().sub(&b).unwrap();
            for (x, y) in back.iter().zip(a.iter()) {
                assert_relative_eq!(x, y, epsilon = 1e-3, max_relative = 1e-5);
            }
        }

        #[test]
        fn add_commutes((a, b) in any_vector_pair()) {
            prop_assert_eq!(a.add(&b).unwrap(), b.add(&a).unwrap());
        }

        #[test]
        fn scale_then_unscale_round_trips(v in any_vector(), s in prop_oneof![-1.0e3f32..-1.0e-3, 1.0e-3f32..1.0e3]) {
            let back: Vector<V> = v.mul(s).unwrap().div(s).unwrap();
            for (x, y) in back.iter().zip(v.iter()) {
                assert_relative_eq!(x, y, epsilon = 1e-3, max_relative = 1e-5);
            }
        }
    }
}
