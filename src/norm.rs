//! Norm and distance kinds understood by the vector engine

use crate::{Error, Result};
use core::{fmt, str::FromStr};

/// Vector norm
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Norm {
    /// Square root of the sum of squares
    Euclidean,

    /// Sum of absolute values
    Manhattan,
}
//
impl Norm {
    /// Number of norm kinds, for per-kind caches
    pub(crate) const COUNT: usize = 2;

    /// Every norm kind, in cache slot order
    pub const ALL: [Norm; Self::COUNT] = [Norm::Euclidean, Norm::Manhattan];

    /// Cache slot of this norm kind
    #[inline]
    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::Euclidean => 0,
            Self::Manhattan => 1,
        }
    }

    /// Lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Manhattan => "manhattan",
        }
    }
}
//
impl fmt::Display for Norm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
//
impl FromStr for Norm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Self::Euclidean),
            "manhattan" | "l1" => Ok(Self::Manhattan),
            _ => Err(Error::UnsupportedNorm(s.to_owned())),
        }
    }
}

/// Distance between two vectors
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Distance {
    /// Euclidean norm of the difference
    Euclidean,

    /// Manhattan norm of the difference
    Manhattan,

    /// One minus the cosine similarity
    Cosine,
}
//
impl Distance {
    /// Norm of the difference vector that this distance measures
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedNorm`] for [`Distance::Cosine`], which is not
    /// defined in terms of a norm of the difference.
    pub fn norm(self) -> Result<Norm> {
        match self {
            Self::Euclidean => Ok(Norm::Euclidean),
            Self::Manhattan => Ok(Norm::Manhattan),
            Self::Cosine => Err(Error::UnsupportedNorm(self.to_string())),
        }
    }

    /// Lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Manhattan => "manhattan",
            Self::Cosine => "cosine",
        }
    }
}
//
impl From<Norm> for Distance {
    fn from(norm: Norm) -> Self {
        match norm {
            Norm::Euclidean => Self::Euclidean,
            Norm::Manhattan => Self::Manhattan,
        }
    }
}
//
impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
//
impl FromStr for Distance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            other => other.parse::<Norm>().map(Self::from),
        }
    }
}
