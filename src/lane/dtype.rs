//! Tag identifying the width and precision of a lane type

use core::fmt;

/// Lane width and scalar precision of a packed vector
///
/// Every [`LaneOps`](super::LaneOps) implementation carries one of these as
/// an associated constant, so the tag of a `Vector<L>` is known at compile
/// time and vectors of different precision can never be mixed.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum DType {
    /// 4 lanes of `f32`
    Float32x4,

    /// 2 lanes of `f64`
    Float64x2,
}
//
impl DType {
    /// Number of scalars per lane
    #[inline]
    pub const fn lane_width(self) -> usize {
        match self {
            Self::Float32x4 => 4,
            Self::Float64x2 => 2,
        }
    }

    /// Size of one scalar in bytes
    #[inline]
    pub const fn scalar_size(self) -> usize {
        match self {
            Self::Float32x4 => core::mem::size_of::<f32>(),
            Self::Float64x2 => core::mem::size_of::<f64>(),
        }
    }

    /// Short lowercase name, as used in `Debug` output of vectors
    pub const fn name(self) -> &'static str {
        match self {
            Self::Float32x4 => "f32x4",
            Self::Float64x2 => "f64x2",
        }
    }
}
//
impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_lane_types_span_one_register() {
        for dtype in [DType::Float32x4, DType::Float64x2] {
            assert_eq!(dtype.lane_width() * dtype.scalar_size(), 16);
        }
        assert_eq!(DType::Float64x2.to_string(), "f64x2");
    }
}
