//! Scalar element types that can be packed into lanes

use core::{
    fmt::{Debug, Display},
    iter::Sum,
};
use num_traits::Float;
use rand::distributions::uniform::SampleUniform;

/// Floating-point element of a [`Lane`](crate::lane::Lane)
///
/// Implemented for `f32` and `f64`. Most arithmetic comes from
/// [`num_traits::Float`], this trait only adds the few conversions that the
/// vector engine needs and that `Float` does not provide with the exact
/// semantics we want.
pub trait Scalar:
    Float + SampleUniform + Debug + Display + Default + Sum + Send + Sync + 'static
{
    /// Convert a count or a weight into this scalar type
    fn from_usize(n: usize) -> Self;

    /// Truncate towards zero, saturating at the `i64` bounds, with NaN
    /// mapping to 0
    fn truncate_i64(self) -> i64;

    /// Bit pattern under which scalars that compare equal are identical
    ///
    /// `-0.0` maps to the pattern of `0.0` and every NaN maps to a single
    /// canonical NaN pattern.
    fn canonical_bits(self) -> u64;
}

macro_rules! impl_scalar {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                #[inline(always)]
                fn from_usize(n: usize) -> Self {
                    n as $t
                }

                #[inline(always)]
                fn truncate_i64(self) -> i64 {
                    self as i64
                }

                #[inline]
                fn canonical_bits(self) -> u64 {
                    if self.is_nan() {
                        <$t>::NAN.to_bits() as u64
                    } else if self == 0.0 {
                        (0.0 as $t).to_bits() as u64
                    } else {
                        self.to_bits() as u64
                    }
                }
            }
        )*
    };
}
impl_scalar!(f32, f64);
