//! Error type shared by every fallible operation of this crate

use thiserror::Error;

/// Failure of a vector, lane or matrix operation
///
/// All failures are local and synchronous: an operation either returns a
/// complete result or one of these, never a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// Element-wise operation between containers of different lengths
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length of the left-hand operand
        expected: usize,
        /// Length of the right-hand operand
        actual: usize,
    },

    /// Vector/matrix product with incompatible inner dimension
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension required by the left-hand operand
        expected: usize,
        /// Dimension provided by the right-hand operand
        actual: usize,
    },

    /// Operation that needs at least one element was given none
    #[error("operation requires a non-empty vector")]
    EmptyVector,

    /// Scalar index past the logical length
    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Logical length of the container
        len: usize,
    },

    /// Out-of-bounds or inverted range
    #[error("invalid range {start}..{end} for length {len}")]
    InvalidRange {
        /// Requested start
        start: usize,
        /// Requested end (exclusive)
        end: usize,
        /// Logical length of the container
        len: usize,
    },

    /// Sampling range that is empty, inverted or not finite
    #[error("cannot sample scalars from {low}..{high}")]
    InvalidSampleRange {
        /// Lower bound (inclusive)
        low: f64,
        /// Upper bound (exclusive)
        high: f64,
    },

    /// Position inside a lane outside of `0..width`
    #[error("lane offset {offset} is out of range for lane width {width}")]
    InvalidOffset {
        /// Requested offset
        offset: usize,
        /// Lane width
        width: usize,
    },

    /// Norm or distance kind that cannot be used in this context
    #[error("unsupported norm: {0}")]
    UnsupportedNorm(String),

    /// Operator or operand kind that an operation does not handle
    #[error("unsupported operand: {0}")]
    UnsupportedOperand(String),

    /// Result is infinite or NaN because an operand has zero magnitude
    #[error("degenerate vector: result is not finite")]
    DegenerateVector,
}

/// Result type of this crate
pub type Result<T> = core::result::Result<T, Error>;
