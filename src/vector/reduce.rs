//! Reductions to a single scalar

use super::{failed, memo, Vector};
use crate::{
    lane::LaneOps,
    norm::{Distance, Norm},
    scalar::Scalar,
    Error, Result,
};
use num_traits::{Float, One, Zero};

impl<L: LaneOps> Vector<L> {
    /// Sum of all scalars, 0 for an empty vector
    ///
    /// Lanes are added position-wise first, then the resulting lane is
    /// summed horizontally. Zero padding does not affect the result.
    pub fn sum(&self) -> L::Scalar {
        memo::get_or_init(&self.memo().sum, "sum", || {
            self.buffer()
                .fold_lanes(L::create_filled(L::Scalar::zero()), L::sum)
                .sum_lanes()
        })
    }

    /// Arithmetic mean
    ///
    /// # Errors
    ///
    /// [`Error::EmptyVector`] if the vector is empty.
    pub fn mean(&self) -> Result<L::Scalar> {
        if self.is_empty() {
            return Err(failed("mean", Error::EmptyVector));
        }
        Ok(self.sum() / L::Scalar::from_usize(self.len()))
    }

    /// Norm of the vector, computed once per kind
    pub fn norm(&self, kind: Norm) -> L::Scalar {
        memo::get_or_init(&self.memo().norms[kind.slot()], kind.name(), || match kind {
            Norm::Euclidean => {
                let half = L::Scalar::from_usize(2).recip();
                self.to_integer_power(2).sum().powf(half)
            }
            Norm::Manhattan => self.abs().sum(),
        })
    }

    /// Norm of the vector, with the kind given by name
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedNorm`] if `kind` does not name a norm.
    pub fn norm_named(&self, kind: &str) -> Result<L::Scalar> {
        let kind = kind.parse().map_err(|e| failed("norm", e))?;
        Ok(self.norm(kind))
    }

    /// Largest scalar
    ///
    /// NaN scalars are ignored unless every scalar is NaN.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyVector`] if the vector is empty.
    pub fn max(&self) -> Result<L::Scalar> {
        memo::get_or_try_init(&self.memo().max, "max", || {
            self.extremum(L::select_max, L::get_max_lane, Float::max)
                .ok_or_else(|| failed("max", Error::EmptyVector))
        })
    }

    /// Smallest scalar
    ///
    /// NaN scalars are ignored unless every scalar is NaN.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyVector`] if the vector is empty.
    pub fn min(&self) -> Result<L::Scalar> {
        memo::get_or_try_init(&self.memo().min, "min", || {
            self.extremum(L::select_min, L::get_min_lane, Float::min)
                .ok_or_else(|| failed("min", Error::EmptyVector))
        })
    }

    /// Extremum of the live scalars, `None` if there is none
    ///
    /// Full lanes are reduced position-wise with `select`, then horizontally
    /// with `horizontal`. The ragged last lane, if any, only contributes its
    /// live positions, which are folded in one by one with `scalar`. Padding
    /// never takes part.
    fn extremum(
        &self,
        select: impl Fn(L, L) -> L,
        horizontal: impl Fn(L) -> L::Scalar,
        scalar: impl Fn(L::Scalar, L::Scalar) -> L::Scalar,
    ) -> Option<L::Scalar> {
        let lanes = self.lanes();
        let live = self.len() % L::WIDTH;
        let (full, ragged) = match lanes.split_last() {
            Some((last, rest)) if live != 0 => (rest, Some(last)),
            _ => (lanes, None),
        };
        let from_full = full.iter().copied().reduce(select).map(horizontal);
        let from_ragged = ragged.and_then(|last| {
            last.as_slice()[..live]
                .iter()
                .copied()
                .reduce(&scalar)
        });
        match (from_full, from_ragged) {
            (Some(a), Some(b)) => Some(scalar(a, b)),
            (a, b) => a.or(b),
        }
    }

    /// Inner product
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if the lengths differ.
    pub fn dot(&self, other: &Self) -> Result<L::Scalar> {
        Ok(self.mul(other)?.sum())
    }

    /// Cosine of the angle between two vectors
    ///
    /// # Errors
    ///
    /// - [`Error::LengthMismatch`] if the lengths differ
    /// - [`Error::DegenerateVector`] if the result is not finite, which
    ///   happens when either vector has zero norm
    pub fn cosine(&self, other: &Self) -> Result<L::Scalar> {
        let cosine =
            self.dot(other)? / (self.norm(Norm::Euclidean) * other.norm(Norm::Euclidean));
        if cosine.is_finite() {
            Ok(cosine)
        } else {
            Err(failed("cosine", Error::DegenerateVector))
        }
    }

    /// Distance between two vectors
    ///
    /// Euclidean and Manhattan distances are the matching norm of
    /// `self - other`. Cosine distance is `1 - cosine(self, other)`.
    ///
    /// # Errors
    ///
    /// Same as [`sub()`](Self::sub) for norm-based distances, same as
    /// [`cosine()`](Self::cosine) for cosine distance.
    pub fn distance_to(&self, other: &Self, distance: Distance) -> Result<L::Scalar> {
        match distance {
            Distance::Cosine => Ok(L::Scalar::one() - self.cosine(other)?),
            Distance::Euclidean | Distance::Manhattan => {
                Ok(self.sub(other)?.norm(distance.norm()?))
            }
        }
    }
}
