//! Memoized derived values of a `Vector`
//!
//! A vector never changes after construction, so anything computed from it
//! stays valid for its whole lifetime. Each field below goes from empty to
//! filled at most once. `OnceLock` publishes the value as a whole, so
//! concurrent readers either see nothing or the complete value, and racing
//! computations of the same field are harmless: the first one to finish
//! wins and the others get its result.

use super::Vector;
use crate::{lane::LaneOps, norm::Norm, Result};
use log::trace;
use std::sync::OnceLock;

/// Cache of derived values
pub(crate) struct Memo<L: LaneOps> {
    pub(crate) hash: OnceLock<i64>,
    pub(crate) sum: OnceLock<L::Scalar>,
    pub(crate) min: OnceLock<L::Scalar>,
    pub(crate) max: OnceLock<L::Scalar>,
    pub(crate) norms: [OnceLock<L::Scalar>; Norm::COUNT],
    pub(crate) abs: OnceLock<Vector<L>>,
    pub(crate) rescaled: OnceLock<Vector<L>>,
    pub(crate) unique: OnceLock<Vector<L>>,
    pub(crate) normalized: [OnceLock<Vector<L>>; Norm::COUNT],
}
//
impl<L: LaneOps> Memo<L> {
    pub(crate) fn new() -> Self {
        Self {
            hash: OnceLock::new(),
            sum: OnceLock::new(),
            min: OnceLock::new(),
            max: OnceLock::new(),
            norms: core::array::from_fn(|_| OnceLock::new()),
            abs: OnceLock::new(),
            rescaled: OnceLock::new(),
            unique: OnceLock::new(),
            normalized: core::array::from_fn(|_| OnceLock::new()),
        }
    }
}

/// Read a memoized value, computing it on first access
#[inline]
pub(crate) fn get_or_init<T: Clone>(
    cell: &OnceLock<T>,
    field: &'static str,
    init: impl FnOnce() -> T,
) -> T {
    cell.get_or_init(|| {
        trace!("[Vector] memoizing {field}");
        init()
    })
    .clone()
}

/// Read a memoized value, computing it on first access with a fallible
/// computation
///
/// Failures are not cached: the next call tries again and, the vector being
/// immutable, fails the same way.
#[inline]
pub(crate) fn get_or_try_init<T: Clone>(
    cell: &OnceLock<T>,
    field: &'static str,
    init: impl FnOnce() -> Result<T>,
) -> Result<T> {
    if let Some(value) = cell.get() {
        return Ok(value.clone());
    }
    let value = init()?;
    trace!("[Vector] memoizing {field}");
    Ok(cell.get_or_init(move || value).clone())
}
