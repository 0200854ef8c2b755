//! A growable output container that can be reused across queries.
//!
//! Allocation is the dominant cost of issuing many small queries in a loop (e.g. the
//! correspondence step of iterative closest point). Every batch query therefore writes into a
//! caller supplied [`ResultBuffer`], resizing it in place: growing only allocates the missing
//! tail, shrinking truncates and keeps the capacity around for the next call.

use std::ops::{Bound, Deref, DerefMut, Index, IndexMut, RangeBounds};
use std::slice::ChunksExact;

use crate::error::{PointIndexError, Result};

/// A growable, homogeneous, reusable result container.
///
/// Used with [`Neighbor`][crate::Neighbor]s for kNN queries (row-major, `k` per query), with
/// `Vec<Neighbor>` rows for radius queries and with `Vec<u32>` rows for box queries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultBuffer<T> {
    items: Vec<T>,
}

impl<T> ResultBuffer<T> {
    /// Create a new, empty buffer. Does not allocate.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create an empty buffer able to hold `capacity` items without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// The number of items in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` if the buffer holds no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The number of items the buffer can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Positional access. Negative positions count from the end: `-1` is the last item.
    ///
    /// Returns `None` when the position is out of bounds.
    pub fn get(&self, pos: isize) -> Option<&T> {
        resolve_position(pos, self.items.len()).map(|i| &self.items[i])
    }

    /// Mutable positional access, see [`get`][Self::get].
    pub fn get_mut(&mut self, pos: isize) -> Option<&mut T> {
        resolve_position(pos, self.items.len()).map(move |i| &mut self.items[i])
    }

    /// Resize in place, filling new slots with `f`.
    ///
    /// Existing items below `len` are kept. Items at or above `len` are dropped; the capacity is
    /// not released.
    pub fn resize_with(&mut self, len: usize, f: impl FnMut() -> T) {
        self.items.resize_with(len, f);
    }

    /// Shorten the buffer to `len` items. No-op when already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    /// Remove all items, keeping the capacity.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// View the items as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// View the items as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Consume the buffer, returning the underlying vector.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Iterate over consecutive rows of `row_len` items.
    ///
    /// A kNN batch result holds `k` neighbors per query, so `rows(k)` yields one row per query.
    ///
    /// # Panics
    ///
    /// Panics if `row_len` is 0.
    pub fn rows(&self, row_len: usize) -> ChunksExact<'_, T> {
        self.items.chunks_exact(row_len)
    }
}

impl<T: Clone> ResultBuffer<T> {
    /// Resize in place, filling new slots with clones of `value`.
    pub fn resize(&mut self, len: usize, value: T) {
        self.items.resize(len, value);
    }

    /// Copy a contiguous range into a new, independent buffer.
    ///
    /// Range ends may be negative to count from the end, and are clamped to the buffer. An empty
    /// or inverted range yields an empty buffer. Mutating the result never affects `self`.
    pub fn slice(&self, range: impl RangeBounds<isize>) -> Self {
        let (start, end) = resolve_range(range, self.items.len());
        Self {
            items: self.items[start..end].to_vec(),
        }
    }

    /// Like [`slice`][Self::slice], keeping only every `step`-th item of the range.
    pub fn slice_step(&self, range: impl RangeBounds<isize>, step: usize) -> Result<Self> {
        if step == 0 {
            return Err(PointIndexError::InvalidParameter(
                "slice step must be positive".to_string(),
            ));
        }
        let (start, end) = resolve_range(range, self.items.len());
        Ok(Self {
            items: self.items[start..end].iter().step_by(step).cloned().collect(),
        })
    }
}

impl<U> ResultBuffer<Vec<U>> {
    /// Resize to `rows` variable-length rows.
    ///
    /// Surviving rows keep their allocation but are *not* cleared here; the query clears each row
    /// right before filling it.
    pub(crate) fn reset_rows(&mut self, rows: usize) {
        self.items.truncate(rows);
        self.items.resize_with(rows, Vec::new);
    }

    /// The total number of items over all rows.
    pub fn total_len(&self) -> usize {
        self.items.iter().map(Vec::len).sum()
    }
}

impl<T> Deref for ResultBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T> DerefMut for ResultBuffer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.items
    }
}

impl<T> Index<usize> for ResultBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<T> IndexMut<usize> for ResultBuffer<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.items[index]
    }
}

impl<T> From<Vec<T>> for ResultBuffer<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> From<ResultBuffer<T>> for Vec<T> {
    fn from(buffer: ResultBuffer<T>) -> Self {
        buffer.items
    }
}

impl<T> FromIterator<T> for ResultBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for ResultBuffer<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResultBuffer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[inline]
fn resolve_position(pos: isize, len: usize) -> Option<usize> {
    let resolved = if pos < 0 {
        len.checked_sub(pos.unsigned_abs())?
    } else {
        pos as usize
    };
    (resolved < len).then_some(resolved)
}

/// Turn a possibly negative range into clamped `start..end` offsets with `start <= end`.
fn resolve_range(range: impl RangeBounds<isize>, len: usize) -> (usize, usize) {
    let clamp = |pos: isize| -> usize {
        if pos < 0 {
            len.saturating_sub(pos.unsigned_abs())
        } else {
            (pos as usize).min(len)
        }
    };
    let start = match range.start_bound() {
        Bound::Included(&s) => clamp(s),
        Bound::Excluded(&s) => clamp(s).saturating_add(1).min(len),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => clamp(e).saturating_add(1).min(len),
        Bound::Excluded(&e) => clamp(e),
        Bound::Unbounded => len,
    };
    (start, end.max(start))
}

#[cfg(test)]
mod test {
    use super::*;

    fn buffer() -> ResultBuffer<u32> {
        ResultBuffer::from(vec![10, 11, 12, 13, 14])
    }

    #[test]
    fn negative_positions() {
        let b = buffer();
        assert_eq!(b.get(0), Some(&10));
        assert_eq!(b.get(-1), Some(&14));
        assert_eq!(b.get(-2), Some(&13));
        assert_eq!(b.get(-5), Some(&10));
        assert_eq!(b.get(-6), None);
        assert_eq!(b.get(5), None);
        assert_eq!(ResultBuffer::<u32>::new().get(-1), None);
    }

    #[test]
    fn get_mut_writes_through() {
        let mut b = buffer();
        *b.get_mut(-1).unwrap() = 99;
        assert_eq!(b[4], 99);
    }

    #[test]
    fn slices_are_independent() {
        let b = buffer();
        let mut s = b.slice(1..3);
        assert_eq!(s.as_slice(), &[11, 12]);
        s[0] = 0;
        assert_eq!(b[1], 11);

        assert_eq!(b.slice(-2..).as_slice(), &[13, 14]);
        assert_eq!(b.slice(..-3).as_slice(), &[10, 11]);
        assert_eq!(b.slice(..=-1).as_slice(), b.as_slice());
        assert_eq!(b.slice(0..=1).as_slice(), &[10, 11]);
        assert!(b.slice(3..1).is_empty());
        assert_eq!(b.slice(2..100).as_slice(), &[12, 13, 14]);
    }

    #[test]
    fn stepped_slices() {
        let b = buffer();
        assert_eq!(b.slice_step(0..4, 2).unwrap().as_slice(), &[10, 12]);
        assert_eq!(b.slice_step(.., 3).unwrap().as_slice(), &[10, 13]);
        assert!(matches!(
            b.slice_step(.., 0),
            Err(PointIndexError::InvalidParameter(_))
        ));
    }

    #[test]
    fn resize_keeps_prefix_and_capacity() {
        let mut b = buffer();
        let capacity = b.capacity();
        b.resize(2, 0);
        assert_eq!(b.as_slice(), &[10, 11]);
        assert_eq!(b.capacity(), capacity);

        b.resize(4, 7);
        assert_eq!(b.as_slice(), &[10, 11, 7, 7]);
        assert_eq!(b.len(), 4);
    }

    #[test]
    fn reset_rows_truncates_and_grows() {
        let mut b: ResultBuffer<Vec<u32>> = ResultBuffer::from(vec![vec![1, 2], vec![3], vec![4]]);
        assert_eq!(b.total_len(), 4);
        b.reset_rows(2);
        assert_eq!(b.len(), 2);
        b.reset_rows(4);
        assert_eq!(b.len(), 4);
        assert!(b[3].is_empty());
    }

    #[test]
    fn rows_split_matrix() {
        let b = ResultBuffer::from(vec![1, 2, 3, 4, 5, 6]);
        let rows: Vec<&[i32]> = b.rows(3).collect();
        assert_eq!(rows, vec![&[1, 2, 3][..], &[4, 5, 6][..]]);
    }
}
