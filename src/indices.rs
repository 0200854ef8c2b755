//! Data structures to hold indices that may be either `u16` or `u32` to save space.
//!
//! A built tree keeps one permutation of the point indices: each node covers a contiguous range
//! of it. Trees with at most 65536 points store the permutation as `u16`.

/// An owned permutation of point indices.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedIndices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl OwnedIndices {
    /// The identity permutation `0..num_items`, using `u16` storage when it fits.
    ///
    /// `num_items` must not exceed `u32::MAX + 1`; the builder checks this.
    pub fn identity(num_items: usize) -> Self {
        if num_items <= u16::MAX as usize + 1 {
            Self::U16((0..num_items).map(|i| i as u16).collect())
        } else {
            Self::U32((0..num_items).map(|i| i as u32).collect())
        }
    }

    pub fn view_mut(&mut self) -> MutableIndices<'_> {
        match self {
            Self::U16(arr) => MutableIndices::U16(arr),
            Self::U32(arr) => MutableIndices::U32(arr),
        }
    }

    pub fn view(&self) -> Indices<'_> {
        match self {
            Self::U16(arr) => Indices::U16(arr),
            Self::U32(arr) => Indices::U32(arr),
        }
    }

    #[inline]
    pub fn bytes_per_element(&self) -> usize {
        match self {
            Self::U16(_) => 2,
            Self::U32(_) => 4,
        }
    }
}

/// A mutable slice of indices that may be either `u16` or `u32`.
#[derive(Debug)]
pub enum MutableIndices<'a> {
    U16(&'a mut [u16]),
    U32(&'a mut [u32]),
}

impl MutableIndices<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::U16(arr) => arr.len(),
            Self::U32(arr) => arr.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        match self {
            Self::U16(arr) => arr.swap(a, b),
            Self::U32(arr) => arr.swap(a, b),
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> usize {
        match self {
            Self::U16(arr) => arr[index] as usize,
            Self::U32(arr) => arr[index] as usize,
        }
    }

    pub fn split_at_mut(&mut self, mid: usize) -> (MutableIndices<'_>, MutableIndices<'_>) {
        match self {
            Self::U16(arr) => {
                let (left, right) = arr.split_at_mut(mid);
                (MutableIndices::U16(left), MutableIndices::U16(right))
            }
            Self::U32(arr) => {
                let (left, right) = arr.split_at_mut(mid);
                (MutableIndices::U32(left), MutableIndices::U32(right))
            }
        }
    }
}

/// A slice of indices that may be either `u16` or `u32`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Indices<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl<'a> Indices<'a> {
    pub fn len(&self) -> usize {
        match self {
            Self::U16(arr) => arr.len(),
            Self::U32(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn get(&self, index: usize) -> usize {
        match self {
            Self::U16(arr) => arr[index] as usize,
            Self::U32(arr) => arr[index] as usize,
        }
    }

    /// The sub-range `start..end`.
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> Indices<'a> {
        match self {
            Self::U16(arr) => Indices::U16(&arr[start..end]),
            Self::U32(arr) => Indices::U32(&arr[start..end]),
        }
    }

    /// Append every index, widened to `u32`, to `out`.
    #[inline]
    pub fn extend_into(&self, out: &mut Vec<u32>) {
        match self {
            Self::U16(arr) => out.extend(arr.iter().map(|&i| i as u32)),
            Self::U32(arr) => out.extend_from_slice(arr),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + 'a {
        let (short, long): (&'a [u16], &'a [u32]) = match *self {
            Self::U16(arr) => (arr, &[]),
            Self::U32(arr) => (&[], arr),
        };
        short.iter().map(|&i| i as u32).chain(long.iter().copied())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn picks_storage_width() {
        assert_eq!(OwnedIndices::identity(10).bytes_per_element(), 2);
        assert_eq!(OwnedIndices::identity(65536).bytes_per_element(), 2);
        assert_eq!(OwnedIndices::identity(65537).bytes_per_element(), 4);
    }

    #[test]
    fn swap_and_slice() {
        let mut owned = OwnedIndices::identity(5);
        {
            let mut ids = owned.view_mut();
            ids.swap(0, 4);
            let (left, right) = ids.split_at_mut(2);
            assert_eq!(left.len(), 2);
            assert_eq!(right.get(0), 2);
        }
        let ids = owned.view();
        assert_eq!(ids.get(0), 4);
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec![4, 1, 2, 3, 0]);

        let mut out = vec![];
        ids.slice(1, 3).extend_into(&mut out);
        assert_eq!(out, vec![1, 2]);
    }
}
