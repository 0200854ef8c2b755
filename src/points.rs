//! Read-only views over caller owned coordinate buffers.

use bytemuck::cast_slice;

use crate::error::{PointIndexError, Result};
use crate::r#type::IndexableNum;

/// An indexed view of `npts` points in `sdim` dimensions over a row-major coordinate buffer.
///
/// The buffer is borrowed, never copied. A [`KDTree`][crate::kdtree::KDTree] built from a
/// `PointSet` borrows the same buffer, so the borrow checker keeps the coordinates alive (and
/// unmodified) for as long as the tree exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSet<'a, N: IndexableNum> {
    coords: &'a [N],
    sdim: usize,
    npts: usize,
}

impl<'a, N: IndexableNum> PointSet<'a, N> {
    /// View a flat row-major buffer holding points of `sdim` coordinates each.
    ///
    /// Fails with [`PointIndexError::InvalidShape`] if `sdim` is zero or the buffer length is not
    /// a multiple of `sdim`, and with [`PointIndexError::EmptyInput`] if there are no points.
    pub fn try_new(coords: &'a [N], sdim: usize) -> Result<Self> {
        if sdim == 0 {
            return Err(PointIndexError::InvalidShape(
                "spatial dimension must be positive".to_string(),
            ));
        }
        if coords.len() % sdim != 0 {
            return Err(PointIndexError::InvalidShape(format!(
                "buffer of {} coordinates is not a multiple of dimension {}",
                coords.len(),
                sdim
            )));
        }
        if coords.is_empty() {
            return Err(PointIndexError::EmptyInput);
        }
        Ok(Self {
            coords,
            sdim,
            npts: coords.len() / sdim,
        })
    }

    /// View a slice of fixed-size rows.
    pub fn from_rows<const D: usize>(rows: &'a [[N; D]]) -> Result<Self> {
        if D == 0 {
            return Self::try_new(&[], D);
        }
        Self::try_new(cast_slice(rows), D)
    }

    /// The number of points.
    #[inline]
    pub fn npts(&self) -> usize {
        self.npts
    }

    /// The spatial dimension of every point.
    #[inline]
    pub fn sdim(&self) -> usize {
        self.sdim
    }

    /// The coordinates of point `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= npts`.
    #[inline]
    pub fn point(&self, i: usize) -> &'a [N] {
        &self.coords[i * self.sdim..(i + 1) * self.sdim]
    }

    /// Coordinate `axis` of point `i`.
    #[inline]
    pub fn coord(&self, i: usize, axis: usize) -> N {
        self.coords[i * self.sdim + axis]
    }

    /// The underlying row-major buffer.
    #[inline]
    pub fn coords(&self) -> &'a [N] {
        self.coords
    }

    /// Iterate over all points in index order.
    pub fn iter(&self) -> std::slice::ChunksExact<'a, N> {
        self.coords.chunks_exact(self.sdim)
    }
}

/// Copy nested rows into a flat row-major buffer, validating that every row has the same length.
///
/// Returns the buffer and the shared dimension, ready for [`PointSet::try_new`].
pub fn flatten_rows<N: IndexableNum, R: AsRef<[N]>>(rows: &[R]) -> Result<(Vec<N>, usize)> {
    let first = rows.first().ok_or(PointIndexError::EmptyInput)?;
    let sdim = first.as_ref().len();
    let mut flat = Vec::with_capacity(rows.len() * sdim);
    for (i, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != sdim {
            return Err(PointIndexError::InvalidShape(format!(
                "row {} has {} coordinates, expected {}",
                i,
                row.len(),
                sdim
            )));
        }
        flat.extend_from_slice(row);
    }
    Ok((flat, sdim))
}
