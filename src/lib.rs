//! Immutable numeric vectors and matrices packed into SIMD lanes
//!
//! This crate stores sequences of `f32` or `f64` in fixed-width lanes
//! ([`f32x4`](lane::f32x4), [`f64x2`](lane::f64x2)) and runs element-wise
//! arithmetic and reductions lane by lane, so that the compiler can turn
//! them into SIMD instructions. The last lane of a vector whose length is
//! not a multiple of the lane width is padded with zeros, and every
//! operation that could be fooled by this padding (extrema, indexing,
//! iteration) only looks at live scalars.
//!
//! [`Vector`] values are immutable. Derived quantities such as norms,
//! extrema or the hash code are computed on first request and cached for
//! the lifetime of the vector and its clones.
//!
//! Most users will want to start from the [`prelude`].
//!
//! # Examples
//!
//! ```rust
//! use lanevec::prelude::*;
//!
//! # fn main() -> lanevec::Result<()> {
//! let a = Vector::<f64x2>::from_scalars(&[1.0, 2.0, 3.0]);
//! let b = Vector::<f64x2>::filled(2.0, 3);
//! assert_eq!(a.mul(&b)?.to_vec(), [2.0, 4.0, 6.0]);
//! assert_eq!(a.dot(&b)?, 12.0);
//! assert_eq!(a.rescale()?.to_vec(), [0.0, 0.5, 1.0]);
//!
//! let m = DenseMatrix::<f64x2>::identity(3);
//! assert_eq!(a.mul_matrix(&m)?, a);
//! # Ok(())
//! # }
//! ```
//!
//! # Crate features
//!
//! - `iterator_ilp` implements `iterator_ilp::TrustedLowerBound` for the
//!   iterators of this crate and folds sums over several independent
//!   instruction streams.

#![warn(missing_docs)]

mod error;
pub mod lane;
pub mod matrix;
pub mod norm;
pub mod scalar;
pub mod storage;
pub mod vector;

pub use error::{Error, Result};
pub use vector::Vector;

/// Commonly used types and traits
pub mod prelude {
    pub use crate::{
        lane::{f32x4, f64x2, DType, LaneOps},
        matrix::{DenseMatrix, Matrix},
        norm::{Distance, Norm},
        vector::{BinaryOp, Operand, Vector},
        Error, Result,
    };
}
