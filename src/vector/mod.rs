//! Immutable packed numeric vectors
//!
//! [`Vector`] is the user-facing numeric type of this crate. It wraps a
//! [`PackedBuffer`] and never changes after construction: every operation
//! returns a new vector. This immutability is what allows expensive derived
//! values (norms, extrema, hash...) to be computed lazily and cached for the
//! lifetime of the vector.
//!
//! The engine is split by concern:
//!
//! - This module holds construction, element access, equality and hashing.
//! - `arith` holds element-wise arithmetic against vectors, matrices and
//!   scalars.
//! - `reduce` holds reductions (sum, norms, extrema, dot, cosine...).
//! - `transform` holds operations that derive a new vector (abs, powers,
//!   normalization, slicing...).
//!
//! # Examples
//!
//! ```rust
//! use lanevec::prelude::*;
//!
//! let v = Vector::<f32x4>::from_scalars(&[3.0, 4.0]);
//! assert_eq!(v.norm(Norm::Manhattan), 7.0);
//! assert_eq!(v.max().unwrap(), 4.0);
//! ```

mod arith;
mod memo;
mod reduce;
mod transform;

use crate::{
    lane::{DType, LaneOps},
    scalar::Scalar,
    storage::{index_failed, Chunks, Iter, PackedBuffer},
    Error, Result,
};
use core::{
    fmt,
    hash::{Hash, Hasher},
    ops::{Index, Range},
};
use log::debug;
use memo::Memo;
use num_traits::{One, Zero};
use rand::Rng;
use std::sync::Arc;

pub use arith::{BinaryOp, Operand};

/// Report an error detected at the API boundary, then hand it back
#[cold]
#[inline(never)]
fn failed(operation: &str, error: Error) -> Error {
    debug!("[Vector] FAILED: {operation}: {error}");
    error
}

/// Shared state of a vector and its clones
struct Inner<L: LaneOps> {
    buffer: PackedBuffer<L>,
    memo: Memo<L>,
}

/// Immutable vector of scalars packed into lanes of type `L`
///
/// Cloning is cheap and shares both the lane storage and the cache of
/// derived values.
pub struct Vector<L: LaneOps> {
    inner: Arc<Inner<L>>,
}
//
impl<L: LaneOps> Vector<L> {
    // === CONSTRUCTION ===

    /// Wrap a packed buffer
    pub fn from_buffer(buffer: PackedBuffer<L>) -> Self {
        Self {
            inner: Arc::new(Inner {
                buffer,
                memo: Memo::new(),
            }),
        }
    }

    /// Vector of length 0
    pub fn empty() -> Self {
        Self::from_buffer(PackedBuffer::empty())
    }

    /// Vector holding a copy of `scalars`, in the same order
    pub fn from_scalars(scalars: &[L::Scalar]) -> Self {
        Self::from_buffer(PackedBuffer::from_scalars(scalars))
    }

    /// Vector of `len` scalars stored in the given lanes
    ///
    /// Lanes passed as an `Arc<[L]>` are shared without copying. Padding
    /// positions past `len` in the last lane are ignored and read back as
    /// zero.
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`](crate::Error::LengthMismatch) if `len`
    /// scalars do not occupy exactly `lanes.len()` lanes.
    pub fn from_lanes(lanes: impl Into<Arc<[L]>>, len: usize) -> Result<Self> {
        PackedBuffer::from_lanes(lanes, len).map(Self::from_buffer)
    }

    /// Vector of `len` copies of `value`
    pub fn filled(value: L::Scalar, len: usize) -> Self {
        Self::from_buffer(PackedBuffer::filled(value, len))
    }

    /// Vector of `len` zeros
    pub fn zeros(len: usize) -> Self {
        Self::filled(L::Scalar::zero(), len)
    }

    /// Vector of `len` ones
    pub fn ones(len: usize) -> Self {
        Self::filled(L::Scalar::one(), len)
    }

    /// Vector of `len` scalars drawn uniformly from `range`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSampleRange`](crate::Error::InvalidSampleRange) if
    /// `range` is empty or unbounded.
    pub fn random<R: Rng + ?Sized>(
        len: usize,
        range: Range<L::Scalar>,
        rng: &mut R,
    ) -> Result<Self> {
        PackedBuffer::random(len, range, rng).map(Self::from_buffer)
    }

    /// Vector of `len` scalars drawn uniformly from `range` by a generator
    /// seeded with `seed`
    ///
    /// # Errors
    ///
    /// Same as [`random()`](Self::random).
    pub fn random_seeded(len: usize, range: Range<L::Scalar>, seed: u64) -> Result<Self> {
        PackedBuffer::random_seeded(len, range, seed).map(Self::from_buffer)
    }

    // === ACCESSORS ===

    /// Underlying packed storage
    #[inline]
    pub fn buffer(&self) -> &PackedBuffer<L> {
        &self.inner.buffer
    }

    #[inline]
    fn memo(&self) -> &Memo<L> {
        &self.inner.memo
    }

    /// Number of scalars
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    /// Truth that the vector holds no scalar
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }

    /// Lane width and precision
    #[inline]
    pub const fn dtype(&self) -> DType {
        L::DTYPE
    }

    /// Number of lanes backing the vector
    #[inline]
    pub fn lane_count(&self) -> usize {
        self.buffer().lane_count()
    }

    /// Lane storage, with the padding of the last lane zeroed
    #[inline]
    pub fn lanes(&self) -> &[L] {
        self.buffer().lanes()
    }

    /// Scalar at `index`
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyVector`](crate::Error::EmptyVector) on an empty vector
    /// - [`Error::IndexOutOfBounds`](crate::Error::IndexOutOfBounds) if
    ///   `index >= len`
    #[inline]
    pub fn get(&self, index: usize) -> Result<L::Scalar> {
        self.buffer().get(index)
    }

    /// Iterate over the scalars
    ///
    /// Every call restarts from the first scalar.
    #[inline]
    pub fn iter(&self) -> Iter<'_, L> {
        self.buffer().iter()
    }

    /// Iterate over `(lane, live scalars)` pairs
    #[inline]
    pub fn chunks(&self) -> Chunks<'_, L> {
        self.buffer().chunks()
    }

    /// Flat view of the scalars, built on first use
    #[inline]
    pub fn as_slice(&self) -> &[L::Scalar] {
        self.buffer().as_flat()
    }

    /// Copy the scalars into a `Vec`
    pub fn to_vec(&self) -> Vec<L::Scalar> {
        self.as_slice().to_vec()
    }

    // === IDENTITY ===

    /// Position-weighted hash of the lanes
    ///
    /// Lane `i` is scaled by `31 * i` and summed horizontally with NaN
    /// positions counting as zero, then all lane sums are added and the
    /// total is truncated to an integer. The empty vector hashes to 0.
    /// Computed once per vector.
    pub fn hash_code(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        memo::get_or_init(&self.memo().hash, "hash", || {
            self.lanes()
                .iter()
                .enumerate()
                .map(|(idx, lane)| {
                    lane.scale(L::Scalar::from_usize(31 * idx))
                        .sum_lanes_for_hash()
                })
                .fold(L::Scalar::zero(), |acc, x| acc + x)
                .truncate_i64()
        })
    }
}
//
impl<L: LaneOps> Clone for Vector<L> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
//
impl<L: LaneOps> Default for Vector<L> {
    fn default() -> Self {
        Self::empty()
    }
}
//
impl<L: LaneOps> PartialEq for Vector<L> {
    /// Vectors are equal when they have the same length and all their lanes
    /// are equal position by position
    ///
    /// Padding is compared too, which is sound because it is always zero.
    /// Scalar comparison follows IEEE-754, so a vector holding NaN is not
    /// equal to itself.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .lanes()
                .iter()
                .zip(other.lanes())
                .all(|(a, b)| a.equal(*b))
    }
}
//
impl<L: LaneOps> Hash for Vector<L> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        state.write_i64(self.hash_code());
    }
}
//
impl<L: LaneOps> Index<usize> for Vector<L> {
    type Output = L::Scalar;

    #[inline]
    fn index(&self, index: usize) -> &L::Scalar {
        if let Err(e) = self.buffer().check_index(index) {
            index_failed(e)
        }
        self.buffer().scalar_ref(index)
    }
}
//
impl<L: LaneOps> fmt::Debug for Vector<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector<{}>", L::DTYPE)?;
        f.debug_list().entries(self.iter()).finish()
    }
}
//
impl<L: LaneOps> fmt::Display for Vector<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, x) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(&x, f)?;
        }
        f.write_str("]")
    }
}
//
impl<L: LaneOps> From<PackedBuffer<L>> for Vector<L> {
    fn from(buffer: PackedBuffer<L>) -> Self {
        Self::from_buffer(buffer)
    }
}
//
impl<L: LaneOps> From<&[L::Scalar]> for Vector<L> {
    fn from(scalars: &[L::Scalar]) -> Self {
        Self::from_scalars(scalars)
    }
}
//
impl<L: LaneOps> From<Vec<L::Scalar>> for Vector<L> {
    fn from(scalars: Vec<L::Scalar>) -> Self {
        Self::from_scalars(&scalars)
    }
}
//
impl<L: LaneOps> FromIterator<L::Scalar> for Vector<L> {
    fn from_iter<I: IntoIterator<Item = L::Scalar>>(iter: I) -> Self {
        Self::from_scalars(&iter.into_iter().collect::<Vec<_>>())
    }
}
//
impl<'vector, L: LaneOps> IntoIterator for &'vector Vector<L> {
    type Item = L::Scalar;
    type IntoIter = Iter<'vector, L>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
