//! Fixed-width SIMD lanes and the [`LaneOps`] codec
//!
//! A lane packs `W` scalars into a single 16-byte aligned value that the
//! compiler can keep in one SIMD register. All lane operations are pure and
//! return new lanes. The [`LaneOps`] trait is the only thing the rest of the
//! crate knows about lanes, which lets one generic vector engine run on
//! every supported width and precision.

mod dtype;

use crate::{scalar::Scalar, Error, Result};
use core::fmt::Debug;

pub use dtype::DType;

// === GENERAL IMPLEMENTATION NOTES ===

// Per-lane operations are executed once per bucket of a packed buffer and
// must compile down to a handful of SIMD instructions, so they are all
// marked inline(always). Operations that are expected at most once per
// vector (error paths, list conversions) carry no inlining directive.

/// Fixed-width pack of `W` scalars
///
/// Use the [`f32x4`] and [`f64x2`] aliases rather than naming this type
/// directly: only those shapes implement [`LaneOps`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(C, align(16))]
pub struct Lane<B, const W: usize>([B; W]);

/// 4-wide single precision lane
#[allow(non_camel_case_types)]
pub type f32x4 = Lane<f32, 4>;

/// 2-wide double precision lane
#[allow(non_camel_case_types)]
pub type f64x2 = Lane<f64, 2>;

impl<B: Scalar, const W: usize> Lane<B, W> {
    /// Wrap an array of scalars
    #[inline(always)]
    pub const fn from_array(array: [B; W]) -> Self {
        Self(array)
    }

    /// Unwrap into an array of scalars
    #[inline(always)]
    pub const fn into_array(self) -> [B; W] {
        self.0
    }

    /// Build from an index -> element mapping
    #[inline(always)]
    fn from_fn(idx_to_elem: impl FnMut(usize) -> B) -> Self {
        Self(core::array::from_fn(idx_to_elem))
    }

    /// Apply a unary scalar operation to every position
    #[inline(always)]
    fn map(self, mut op: impl FnMut(B) -> B) -> Self {
        Self::from_fn(|idx| op(self.0[idx]))
    }

    /// Apply a binary scalar operation position by position
    #[inline(always)]
    fn zip(self, other: Self, mut op: impl FnMut(B, B) -> B) -> Self {
        Self::from_fn(|idx| op(self.0[idx], other.0[idx]))
    }

    /// Horizontal reduction seeded by the first position
    #[inline(always)]
    fn reduce(self, op: impl FnMut(B, B) -> B) -> B {
        self.0[1..].iter().copied().fold(self.0[0], op)
    }
}

/// Operations on one lane value
///
/// This is the interface between the packed storage and the hardware: the
/// vector engine only ever manipulates lanes through it. Implementations are
/// provided for [`f32x4`] and [`f64x2`].
///
/// Padding positions are not special at this level, every operation applies
/// to all `WIDTH` positions. It is up to callers to discard what lies past
/// the logical end of their data (see [`truncate()`](Self::truncate)).
pub trait LaneOps: Copy + Debug + PartialEq + Send + Sync + 'static {
    /// Element type
    type Scalar: Scalar;

    /// Number of scalars per lane
    const WIDTH: usize;

    /// Width/precision tag
    const DTYPE: DType;

    // Required methods

    /// Lane with every position set to `value`
    fn create_filled(value: Self::Scalar) -> Self;

    /// Lane built from the first `WIDTH` scalars of `scalars`, with missing
    /// trailing positions set to zero
    fn load_partial(scalars: &[Self::Scalar]) -> Self;

    /// Position-wise addition
    fn sum(self, other: Self) -> Self;

    /// Position-wise subtraction
    fn sub(self, other: Self) -> Self;

    /// Position-wise multiplication
    fn mul(self, other: Self) -> Self;

    /// Position-wise division
    fn div(self, other: Self) -> Self;

    /// Multiply every position by `factor`
    fn scale(self, factor: Self::Scalar) -> Self;

    /// Position-wise absolute value
    fn abs(self) -> Self;

    /// Position-wise square root
    fn sqrt(self) -> Self;

    /// Position-wise maximum
    ///
    /// NaN positions lose against numbers, as in [`f32::max`].
    fn select_max(self, other: Self) -> Self;

    /// Position-wise minimum
    ///
    /// NaN positions lose against numbers, as in [`f32::min`].
    fn select_min(self, other: Self) -> Self;

    /// Largest scalar of the lane
    fn get_max_lane(self) -> Self::Scalar;

    /// Smallest scalar of the lane
    fn get_min_lane(self) -> Self::Scalar;

    /// Sum of all positions
    fn sum_lanes(self) -> Self::Scalar;

    /// Sum of all positions, with NaN positions contributing zero
    ///
    /// Used by vector hashing so that the hash of a vector holding NaNs
    /// stays a usable number.
    fn sum_lanes_for_hash(self) -> Self::Scalar;

    /// View the lane as a slice of `WIDTH` scalars
    fn as_slice(&self) -> &[Self::Scalar];

    /// Copy of this lane where positions `live..WIDTH` are zero
    fn truncate(self, live: usize) -> Self;

    // Provided methods

    /// Lane built from at most `WIDTH` scalars, missing trailing positions
    /// being set to zero
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOffset`] if more than `WIDTH` scalars are provided.
    fn create_from_scalars(scalars: &[Self::Scalar]) -> Result<Self> {
        if scalars.len() > Self::WIDTH {
            return Err(Error::InvalidOffset {
                offset: Self::WIDTH,
                width: Self::WIDTH,
            });
        }
        Ok(Self::load_partial(scalars))
    }

    /// Read the scalar at position `offset`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOffset`] if `offset >= WIDTH`.
    #[inline]
    fn get_lane_by_index(self, offset: usize) -> Result<Self::Scalar> {
        self.as_slice()
            .get(offset)
            .copied()
            .ok_or(Error::InvalidOffset {
                offset,
                width: Self::WIDTH,
            })
    }

    /// Copy of this lane with position `offset` replaced by `value`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOffset`] if `offset >= WIDTH`.
    fn mutate(self, offset: usize, value: Self::Scalar) -> Result<Self> {
        if offset >= Self::WIDTH {
            return Err(Error::InvalidOffset {
                offset,
                width: Self::WIDTH,
            });
        }
        let mut scalars = self.to_scalar_list();
        scalars[offset] = value;
        Ok(Self::load_partial(&scalars))
    }

    /// Truth that all `WIDTH` positions compare equal
    ///
    /// Scalar comparison is IEEE-754 `==`, so a lane holding NaN is not
    /// equal to itself.
    #[inline(always)]
    fn equal(self, other: Self) -> bool {
        self.as_slice()
            .iter()
            .zip(other.as_slice())
            .all(|(a, b)| a == b)
    }

    /// Copy the lane into a list of `WIDTH` scalars
    fn to_scalar_list(self) -> Vec<Self::Scalar> {
        self.as_slice().to_vec()
    }

    /// Raise every position to the integer power `power`
    ///
    /// Uses recursive exponentiation by squaring, `x^0` being 1 for every
    /// `x` including NaN.
    #[inline]
    fn integer_power(self, power: u32) -> Self {
        if power == 0 {
            return Self::create_filled(<Self::Scalar as num_traits::One>::one());
        }
        let half = self.integer_power(power / 2);
        let square = half.mul(half);
        if power % 2 == 0 {
            square
        } else {
            self.mul(square)
        }
    }
}

macro_rules! impl_lane_ops {
    ($scalar:ty, $width:literal, $dtype:expr) => {
        impl LaneOps for Lane<$scalar, $width> {
            type Scalar = $scalar;
            const WIDTH: usize = $width;
            const DTYPE: DType = $dtype;

            #[inline(always)]
            fn create_filled(value: $scalar) -> Self {
                Self([value; $width])
            }

            #[inline(always)]
            fn load_partial(scalars: &[$scalar]) -> Self {
                Self::from_fn(|idx| scalars.get(idx).copied().unwrap_or(0.0))
            }

            #[inline(always)]
            fn sum(self, other: Self) -> Self {
                self.zip(other, |a, b| a + b)
            }

            #[inline(always)]
            fn sub(self, other: Self) -> Self {
                self.zip(other, |a, b| a - b)
            }

            #[inline(always)]
            fn mul(self, other: Self) -> Self {
                self.zip(other, |a, b| a * b)
            }

            #[inline(always)]
            fn div(self, other: Self) -> Self {
                self.zip(other, |a, b| a / b)
            }

            #[inline(always)]
            fn scale(self, factor: $scalar) -> Self {
                self.map(|a| a * factor)
            }

            #[inline(always)]
            fn abs(self) -> Self {
                self.map(<$scalar>::abs)
            }

            #[inline(always)]
            fn sqrt(self) -> Self {
                self.map(<$scalar>::sqrt)
            }

            #[inline(always)]
            fn select_max(self, other: Self) -> Self {
                self.zip(other, <$scalar>::max)
            }

            #[inline(always)]
            fn select_min(self, other: Self) -> Self {
                self.zip(other, <$scalar>::min)
            }

            #[inline(always)]
            fn get_max_lane(self) -> $scalar {
                self.reduce(<$scalar>::max)
            }

            #[inline(always)]
            fn get_min_lane(self) -> $scalar {
                self.reduce(<$scalar>::min)
            }

            #[inline(always)]
            fn sum_lanes(self) -> $scalar {
                self.reduce(|a, b| a + b)
            }

            #[inline(always)]
            fn sum_lanes_for_hash(self) -> $scalar {
                self.map(|a| if a.is_nan() { 0.0 } else { a })
                    .reduce(|a, b| a + b)
            }

            #[inline(always)]
            fn as_slice(&self) -> &[$scalar] {
                &self.0
            }

            #[inline(always)]
            fn truncate(self, live: usize) -> Self {
                Self::from_fn(|idx| if idx < live { self.0[idx] } else { 0.0 })
            }
        }
    };
}
impl_lane_ops!(f32, 4, DType::Float32x4);
impl_lane_ops!(f64, 2, DType::Float64x2);

// === Operator sugar for code that works on lanes directly (fast_map) ===

macro_rules! impl_lane_operator {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<B: Scalar, const W: usize> core::ops::$trait for Lane<B, W> {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| a $op b)
            }
        }
    };
}
impl_lane_operator!(Add, add, +);
impl_lane_operator!(Sub, sub, -);
impl_lane_operator!(Mul, mul, *);
impl_lane_operator!(Div, div, /);
//
impl<B: Scalar, const W: usize> core::ops::Neg for Lane<B, W> {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        self.map(|a| -a)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Lane type used by most tests of this crate
    pub(crate) type V = f32x4;

    /// Arbitrary finite lane
    pub(crate) fn any_v() -> impl Strategy<Value = V> {
        prop::array::uniform4(-1.0e3f32..1.0e3).prop_map(V::from_array)
    }

    #[test]
    fn creation() {
        assert_eq!(f32x4::create_filled(2.5).into_array(), [2.5; 4]);
        assert_eq!(
            f32x4::create_from_scalars(&[1.0, 2.0]).unwrap().into_array(),
            [1.0, 2.0, 0.0, 0.0]
        );
        assert_eq!(
            f64x2::create_from_scalars(&[1.0, 2.0, 3.0]),
            Err(Error::InvalidOffset {
                offset: 2,
                width: 2
            })
        );
        assert_eq!(f64x2::create_from_scalars(&[]).unwrap().into_array(), [0.0; 2]);
    }

    #[test]
    fn offsets() {
        let lane = f32x4::from_array([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(lane.get_lane_by_index(2), Ok(3.0));
        assert_eq!(
            lane.get_lane_by_index(4),
            Err(Error::InvalidOffset {
                offset: 4,
                width: 4
            })
        );
        let mutated = lane.mutate(1, 9.0).unwrap();
        assert_eq!(mutated.into_array(), [1.0, 9.0, 3.0, 4.0]);
        assert_eq!(lane.into_array(), [1.0, 2.0, 3.0, 4.0]);
        assert!(lane.mutate(7, 0.0).is_err());
    }

    #[test]
    fn horizontal_reductions() {
        let lane = f64x2::from_array([-3.0, 5.0]);
        assert_eq!(lane.get_max_lane(), 5.0);
        assert_eq!(lane.get_min_lane(), -3.0);
        assert_eq!(lane.sum_lanes(), 2.0);

        let with_nan = f32x4::from_array([1.0, f32::NAN, 2.0, 3.0]);
        assert!(with_nan.sum_lanes().is_nan());
        assert_eq!(with_nan.sum_lanes_for_hash(), 6.0);
    }

    #[test]
    fn equality_is_ieee() {
        let nan = f32x4::create_filled(f32::NAN);
        assert!(!nan.equal(nan));
        let zeros = f32x4::create_filled(0.0);
        assert!(zeros.equal(f32x4::create_filled(-0.0)));
    }

    #[test]
    fn truncation() {
        let lane = f32x4::from_array([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(lane.truncate(1).into_array(), [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(lane.truncate(4), lane);
        assert_eq!(lane.truncate(0), f32x4::create_filled(0.0));
    }

    proptest! {
        #[test]
        fn arithmetic_is_positionwise(a in any_v(), b in any_v()) {
            let (sum, diff, prod) = (a.sum(b), LaneOps::sub(a, b), LaneOps::mul(a, b));
            for idx in 0..V::WIDTH {
                let (x, y) = (a.as_slice()[idx], b.as_slice()[idx]);
                prop_assert_eq!(sum.as_slice()[idx], x + y);
                prop_assert_eq!(diff.as_slice()[idx], x - y);
                prop_assert_eq!(prod.as_slice()[idx], x * y);
                prop_assert_eq!(a.select_max(b).as_slice()[idx], x.max(y));
                prop_assert_eq!(a.select_min(b).as_slice()[idx], x.min(y));
            }
            prop_assert_eq!(a + b, sum);
        }

        #[test]
        fn integer_power_matches_powi(a in any_v(), power in 0u32..6) {
            let expected = a.map(|x| x.powi(power as i32));
            let actual = a.integer_power(power);
            for (x, y) in actual.as_slice().iter().zip(expected.as_slice()) {
                prop_assert!((x - y).abs() <= 1e-3 * y.abs().max(1.0));
            }
        }

        #[test]
        fn extrema_bound_every_position(a in any_v()) {
            let (max, min) = (a.get_max_lane(), a.get_min_lane());
            for &x in a.as_slice() {
                prop_assert!(min <= x && x <= max);
            }
        }
    }
}
