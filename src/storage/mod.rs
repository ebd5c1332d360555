//! Packed lane storage
//!
//! This module implements [`PackedBuffer`], the owner of the lanes behind a
//! vector. It keeps the logical scalar length separate from the physical
//! lane count and is the only place where lane sequences are assembled, so
//! it is also where the padding invariant is enforced:
//!
//! > Positions of the last lane that lie past the logical length are zero.
//!
//! Every constructor and every lane kernel goes through
//! [`PackedBuffer::from_lane_vec()`] or re-checks the invariant, so that
//! lane-wise equality and sums are never polluted by padding garbage.

mod iterators;

use crate::{lane::LaneOps, Error, Result};
use core::{
    fmt,
    ops::{Index, Range},
};
use log::debug;
use num_traits::{Float, ToPrimitive, Zero};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::{Arc, OnceLock};

pub use iterators::{Chunks, Iter, Lanes};

/// Number of independent accumulators used by ILP-folded reductions
#[cfg(feature = "iterator_ilp")]
const ILP_STREAMS: usize = 4;

/// Number of lanes needed to hold `len` scalars
#[inline(always)]
pub(crate) const fn lane_count_for(len: usize, width: usize) -> usize {
    len / width + (len % width != 0) as usize
}

/// Indexing failure
#[cold]
#[inline(never)]
pub(crate) fn index_failed(error: Error) -> ! {
    panic!("{error}")
}

/// Immutable sequence of lanes holding `len` scalars
///
/// The lanes are reference-counted, so cloning a buffer or building one
/// from an existing `Arc<[L]>` never copies scalar data. Nothing ever
/// mutates lanes once they are inside a buffer.
pub struct PackedBuffer<L: LaneOps> {
    lanes: Arc<[L]>,
    len: usize,
    flat: OnceLock<Box<[L::Scalar]>>,
}
//
impl<L: LaneOps> PackedBuffer<L> {
    // === CONSTRUCTION ===

    /// Buffer of length 0
    pub fn empty() -> Self {
        Self::from_lane_vec(Vec::new(), 0)
    }

    /// Pack a flat sequence of scalars, preserving order
    pub fn from_scalars(scalars: &[L::Scalar]) -> Self {
        let lanes = scalars.chunks(L::WIDTH).map(L::load_partial).collect();
        Self::from_lane_vec(lanes, scalars.len())
    }

    /// Buffer of `len` copies of `value`
    pub fn filled(value: L::Scalar, len: usize) -> Self {
        let lanes = vec![L::create_filled(value); lane_count_for(len, L::WIDTH)];
        Self::from_lane_vec(lanes, len)
    }

    /// Buffer of `len` scalars drawn uniformly from `range` using `rng`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSampleRange`] if `range` is empty or unbounded.
    pub fn random<R: Rng + ?Sized>(
        len: usize,
        range: Range<L::Scalar>,
        rng: &mut R,
    ) -> Result<Self> {
        if !(range.start < range.end) || !(range.end - range.start).is_finite() {
            debug!(
                "[PackedBuffer] FAILED: cannot sample from {:?}..{:?}",
                range.start, range.end
            );
            return Err(Error::InvalidSampleRange {
                low: range.start.to_f64().unwrap_or(f64::NAN),
                high: range.end.to_f64().unwrap_or(f64::NAN),
            });
        }
        debug!(
            "[PackedBuffer] sampling {len} {} scalars from {:?}..{:?}",
            L::DTYPE,
            range.start,
            range.end
        );
        let scalars = (0..len)
            .map(|_| rng.gen_range(range.clone()))
            .collect::<Vec<_>>();
        Ok(Self::from_scalars(&scalars))
    }

    /// Reproducible variant of [`random()`](Self::random)
    ///
    /// # Errors
    ///
    /// Same as [`random()`](Self::random).
    pub fn random_seeded(len: usize, range: Range<L::Scalar>, seed: u64) -> Result<Self> {
        Self::random(len, range, &mut StdRng::seed_from_u64(seed))
    }

    /// Wrap an existing lane sequence holding `len` scalars
    ///
    /// When given an `Arc<[L]>`, the lanes are shared rather than copied,
    /// unless the last lane holds nonzero padding, in which case a zero-padded
    /// copy is made.
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if `len` scalars do not occupy exactly
    /// `lanes.len()` lanes.
    pub fn from_lanes(lanes: impl Into<Arc<[L]>>, len: usize) -> Result<Self> {
        let lanes = lanes.into();
        let expected = lane_count_for(len, L::WIDTH);
        if lanes.len() != expected {
            debug!(
                "[PackedBuffer] FAILED: {len} scalars need {expected} lanes, got {}",
                lanes.len()
            );
            return Err(Error::LengthMismatch {
                expected,
                actual: lanes.len(),
            });
        }
        let live = len % L::WIDTH;
        let padding_is_zero = live == 0
            || lanes[lanes.len() - 1].as_slice()[live..]
                .iter()
                .all(|x| x.is_zero());
        if padding_is_zero {
            Ok(Self::from_parts(lanes, len))
        } else {
            Ok(Self::from_lane_vec(lanes.to_vec(), len))
        }
    }

    /// Take ownership of a lane vector holding `len` scalars, zeroing the
    /// padding of its last lane
    ///
    /// The caller guarantees that `lanes.len()` matches `len`.
    pub(crate) fn from_lane_vec(mut lanes: Vec<L>, len: usize) -> Self {
        debug_assert_eq!(lanes.len(), lane_count_for(len, L::WIDTH));
        let live = len % L::WIDTH;
        if live != 0 {
            if let Some(last) = lanes.last_mut() {
                *last = last.truncate(live);
            }
        }
        Self::from_parts(lanes.into(), len)
    }

    #[inline]
    fn from_parts(lanes: Arc<[L]>, len: usize) -> Self {
        Self {
            lanes,
            len,
            flat: OnceLock::new(),
        }
    }

    // === ACCESSORS ===

    /// Number of scalars
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Truth that there are no scalars
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of lanes, i.e. `ceil(len / WIDTH)`
    #[inline]
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Number of live scalars in the last lane (0 if the buffer is empty)
    #[inline]
    pub fn last_lane_live(&self) -> usize {
        match self.len % L::WIDTH {
            0 if self.len > 0 => L::WIDTH,
            live => live,
        }
    }

    /// Physical lane storage, including the zeroed padding of the last lane
    #[inline]
    pub fn lanes(&self) -> &[L] {
        &self.lanes
    }

    /// Shared handle to the lane storage
    #[inline]
    pub fn shared_lanes(&self) -> Arc<[L]> {
        self.lanes.clone()
    }

    /// Scalar at `index`
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyVector`] if the buffer is empty
    /// - [`Error::IndexOutOfBounds`] if `index >= len`
    #[inline]
    pub fn get(&self, index: usize) -> Result<L::Scalar> {
        self.check_index(index)?;
        self.lanes[index / L::WIDTH].get_lane_by_index(index % L::WIDTH)
    }

    /// Reference to the scalar at `index`, which must be valid
    #[inline(always)]
    pub(crate) fn scalar_ref(&self, index: usize) -> &L::Scalar {
        debug_assert!(index < self.len);
        &self.lanes[index / L::WIDTH].as_slice()[index % L::WIDTH]
    }

    /// Check that `index` designates a live scalar
    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        if self.is_empty() {
            Err(Error::EmptyVector)
        } else if index >= self.len {
            Err(Error::IndexOutOfBounds {
                index,
                len: self.len,
            })
        } else {
            Ok(())
        }
    }

    /// Flat scalar view, materialized on first use and cached afterwards
    pub fn as_flat(&self) -> &[L::Scalar] {
        self.flat.get_or_init(|| self.iter().collect())
    }

    /// Iterate over the live scalars
    ///
    /// Each call starts a fresh pass over the buffer.
    #[inline]
    pub fn iter(&self) -> Iter<'_, L> {
        Iter::new(self)
    }

    /// Iterate over lanes by value
    #[inline]
    pub fn lanes_iter(&self) -> Lanes<'_, L> {
        Lanes::new(&self.lanes)
    }

    /// Iterate over `(lane, live scalars in lane)` pairs
    #[inline]
    pub fn chunks(&self) -> Chunks<'_, L> {
        Chunks::new(self)
    }

    // === LANE KERNELS ===

    /// Apply `op` to every lane
    #[inline]
    pub fn map_lanes(&self, op: impl FnMut(L) -> L) -> Self {
        Self::from_lane_vec(self.lanes_iter().map(op).collect(), self.len)
    }

    /// Combine two buffers of equal length lane by lane
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if the lengths differ.
    #[inline]
    pub fn zip_lanes(&self, other: &Self, mut op: impl FnMut(L, L) -> L) -> Result<Self> {
        if self.len != other.len {
            return Err(Error::LengthMismatch {
                expected: self.len,
                actual: other.len,
            });
        }
        let lanes = self
            .lanes_iter()
            .zip(other.lanes_iter())
            .map(|(a, b)| op(a, b))
            .collect();
        Ok(Self::from_lane_vec(lanes, self.len))
    }

    /// Fold every lane into one using an associative operation with
    /// neutral element `identity`
    ///
    /// Padding takes part in the fold, so this is only suitable for
    /// operations whose neutral element is zero.
    #[inline]
    pub fn fold_lanes(&self, identity: L, op: impl Fn(L, L) -> L) -> L {
        #[cfg(feature = "iterator_ilp")]
        {
            use iterator_ilp::IteratorILP;
            self.lanes_iter()
                .fold_ilp::<ILP_STREAMS, _>(|| identity, &op, &op)
        }
        #[cfg(not(feature = "iterator_ilp"))]
        {
            self.lanes_iter().fold(identity, op)
        }
    }
}
//
impl<L: LaneOps> Clone for PackedBuffer<L> {
    fn clone(&self) -> Self {
        Self {
            lanes: self.lanes.clone(),
            len: self.len,
            flat: self.flat.clone(),
        }
    }
}
//
impl<L: LaneOps> fmt::Debug for PackedBuffer<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedBuffer")
            .field("len", &self.len)
            .field("lanes", &&self.lanes[..])
            .finish()
    }
}
//
impl<L: LaneOps> Index<usize> for PackedBuffer<L> {
    type Output = L::Scalar;

    #[inline]
    fn index(&self, index: usize) -> &L::Scalar {
        if let Err(e) = self.check_index(index) {
            index_failed(e)
        }
        self.scalar_ref(index)
    }
}
//
impl<'buffer, L: LaneOps> IntoIterator for &'buffer PackedBuffer<L> {
    type Item = L::Scalar;
    type IntoIter = Iter<'buffer, L>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
