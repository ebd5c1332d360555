//! Iteration over `PackedBuffer`
//!
//! All iterators are cursors over an immutable buffer, so they are cheap to
//! create and a fresh one always restarts from the beginning.

use super::PackedBuffer;
use crate::lane::LaneOps;
use core::iter::FusedIterator;

// Iterator, DoubleEndedIterator, ExactSizeIterator... impls shared by all
// the cursor types of this module. Each cursor must provide a `get_elem()`
// method that reads the element at a valid index.
macro_rules! impl_iterator {
    (
        $(#[$attr:meta])*
        ($name:ident, $source:ty, $item:ty)
    ) => {
        $(#[$attr])*
        #[derive(Clone, Debug)]
        pub struct $name<'buffer, L: LaneOps> {
            source: $source,
            start: usize,
            end: usize,
        }
        //
        impl<'buffer, L: LaneOps> Iterator for $name<'buffer, L> {
            type Item = $item;

            #[inline(always)]
            fn next(&mut self) -> Option<Self::Item> {
                if self.start < self.end {
                    self.start += 1;
                    Some(self.get_elem(self.start - 1))
                } else {
                    None
                }
            }

            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                (self.len(), Some(self.len()))
            }

            #[inline]
            fn count(self) -> usize {
                self.len()
            }

            #[inline]
            fn last(mut self) -> Option<Self::Item> {
                self.next_back()
            }

            #[inline]
            fn nth(&mut self, n: usize) -> Option<Self::Item> {
                if n < self.len() {
                    self.start += n;
                    self.next()
                } else {
                    self.start = self.end;
                    None
                }
            }
        }
        //
        impl<'buffer, L: LaneOps> DoubleEndedIterator for $name<'buffer, L> {
            #[inline(always)]
            fn next_back(&mut self) -> Option<Self::Item> {
                if self.start < self.end {
                    self.end -= 1;
                    Some(self.get_elem(self.end))
                } else {
                    None
                }
            }

            #[inline]
            fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
                if n < self.len() {
                    self.end -= n;
                    self.next_back()
                } else {
                    self.end = self.start;
                    None
                }
            }
        }
        //
        impl<'buffer, L: LaneOps> ExactSizeIterator for $name<'buffer, L> {
            #[inline]
            fn len(&self) -> usize {
                self.end - self.start
            }
        }
        //
        impl<'buffer, L: LaneOps> FusedIterator for $name<'buffer, L> {}
        //
        #[cfg(feature = "iterator_ilp")]
        unsafe impl<'buffer, L: LaneOps> iterator_ilp::TrustedLowerBound for $name<'buffer, L> {}
    };
}

impl_iterator!(
    /// Iterator over the live scalars of a [`PackedBuffer`]
    (Iter, &'buffer PackedBuffer<L>, L::Scalar)
);
//
impl<'buffer, L: LaneOps> Iter<'buffer, L> {
    #[inline]
    pub(crate) fn new(buffer: &'buffer PackedBuffer<L>) -> Self {
        Self {
            source: buffer,
            start: 0,
            end: buffer.len(),
        }
    }

    #[inline(always)]
    fn get_elem(&self, idx: usize) -> L::Scalar {
        *self.source.scalar_ref(idx)
    }
}

impl_iterator!(
    /// Iterator over the lanes of a [`PackedBuffer`], padding included
    (Lanes, &'buffer [L], L)
);
//
impl<'buffer, L: LaneOps> Lanes<'buffer, L> {
    #[inline]
    pub(crate) fn new(lanes: &'buffer [L]) -> Self {
        Self {
            source: lanes,
            start: 0,
            end: lanes.len(),
        }
    }

    #[inline(always)]
    fn get_elem(&self, idx: usize) -> L {
        self.source[idx]
    }
}

impl_iterator!(
    /// Iterator over the lanes of a [`PackedBuffer`] along with the number of
    /// live scalars that each of them holds
    ///
    /// Every lane but the last one is full. The last lane may be ragged.
    (Chunks, &'buffer PackedBuffer<L>, (L, usize))
);
//
impl<'buffer, L: LaneOps> Chunks<'buffer, L> {
    #[inline]
    pub(crate) fn new(buffer: &'buffer PackedBuffer<L>) -> Self {
        Self {
            source: buffer,
            start: 0,
            end: buffer.lane_count(),
        }
    }

    #[inline(always)]
    fn get_elem(&self, idx: usize) -> (L, usize) {
        let live = if idx + 1 == self.source.lane_count() {
            self.source.last_lane_live()
        } else {
            L::WIDTH
        };
        (self.source.lanes()[idx], live)
    }
}
