//! Batched queries writing into reusable [`ResultBuffer`]s.
//!
//! Every call validates all of its inputs first and only then resizes the output buffer, so a
//! failing call leaves the buffer exactly as it was. Each query row is independent; with the
//! `rayon` feature rows are filled in parallel.

use log::trace;
#[cfg(feature = "rayon")]
use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};
#[cfg(feature = "rayon")]
use rayon::slice::ParallelSliceMut;

use crate::buffer::ResultBuffer;
use crate::error::{check_dim, PointIndexError, Result};
use crate::kdtree::knn::{check_k, knn_into};
use crate::kdtree::radius::{check_radius, radius_into};
use crate::kdtree::range::box_into;
use crate::kdtree::KDTree;
use crate::metric::Metric;
use crate::neighbor::Neighbor;
use crate::points::PointSet;
use crate::r#type::IndexableNum;

impl<N: IndexableNum, M: Metric<N>> KDTree<'_, N, M> {
    /// Search the `k` nearest neighbors of every query point.
    ///
    /// `out` is resized to `queries.npts() * k`; row `i` (see [`ResultBuffer::rows`]) holds the
    /// neighbors of query `i`, laid out like [`search_knn`][Self::search_knn].
    pub fn search_knn_batch(
        &self,
        queries: &PointSet<N>,
        k: usize,
        out: &mut ResultBuffer<Neighbor<N>>,
    ) -> Result<()> {
        self.check_batch(queries)?;
        check_k(k)?;
        let total = knn_len(queries.npts(), k)?;
        trace!("kNN batch of {} queries, k = {}", queries.npts(), k);

        out.resize(total, Neighbor::sentinel());
        fill_rows(out.as_mut_slice(), k, |i, row| {
            knn_into(self, queries.point(i), row, N::one())
        });
        Ok(())
    }

    /// Search `k` approximate nearest neighbors of every query point.
    ///
    /// See [`search_aknn`][Self::search_aknn] for the meaning of `max_error_ratio` and
    /// [`search_knn_batch`][Self::search_knn_batch] for the layout of `out`.
    pub fn search_aknn_batch(
        &self,
        queries: &PointSet<N>,
        k: usize,
        max_error_ratio: N,
        out: &mut ResultBuffer<Neighbor<N>>,
    ) -> Result<()> {
        self.check_batch(queries)?;
        check_k(k)?;
        self.check_error_ratio(max_error_ratio)?;
        let total = knn_len(queries.npts(), k)?;
        trace!(
            "approximate kNN batch of {} queries, k = {}, ratio = {:?}",
            queries.npts(),
            k,
            max_error_ratio
        );

        out.resize(total, Neighbor::sentinel());
        fill_rows(out.as_mut_slice(), k, |i, row| {
            knn_into(self, queries.point(i), row, max_error_ratio)
        });
        Ok(())
    }

    /// Search all points within `radius` of every query point.
    ///
    /// `out` gets one row per query. Rows kept from an earlier call are cleared but keep their
    /// allocation.
    pub fn search_radius_batch(
        &self,
        queries: &PointSet<N>,
        radius: N,
        out: &mut ResultBuffer<Vec<Neighbor<N>>>,
    ) -> Result<()> {
        self.check_batch(queries)?;
        check_radius(radius)?;
        trace!(
            "radius batch of {} queries, radius = {:?}",
            queries.npts(),
            radius
        );

        out.reset_rows(queries.npts());
        fill_var_rows(out.as_mut_slice(), |i, row| {
            row.clear();
            radius_into(self, queries.point(i), radius, row);
        });
        Ok(())
    }

    /// Search the points inside each box `[mins.point(i), maxs.point(i)]`.
    ///
    /// `mins` and `maxs` must hold the same number of corners. `out` gets one row of point
    /// indices per box.
    pub fn search_box_batch(
        &self,
        mins: &PointSet<N>,
        maxs: &PointSet<N>,
        out: &mut ResultBuffer<Vec<u32>>,
    ) -> Result<()> {
        self.check_batch(mins)?;
        self.check_batch(maxs)?;
        if mins.npts() != maxs.npts() {
            return Err(PointIndexError::InvalidShape(format!(
                "got {} minimum corners but {} maximum corners",
                mins.npts(),
                maxs.npts()
            )));
        }
        trace!("box batch of {} queries", mins.npts());

        out.reset_rows(mins.npts());
        fill_var_rows(out.as_mut_slice(), |i, row| {
            row.clear();
            box_into(self, mins.point(i), maxs.point(i), row);
        });
        Ok(())
    }

    fn check_batch(&self, queries: &PointSet<N>) -> Result<()> {
        check_dim(self.sdim(), queries.sdim())
    }
}

fn knn_len(num_queries: usize, k: usize) -> Result<usize> {
    num_queries.checked_mul(k).ok_or_else(|| {
        PointIndexError::InvalidParameter(format!(
            "{} queries with k = {} overflow the result buffer",
            num_queries, k
        ))
    })
}

/// Call `f(i, row)` for every fixed-size row of `out`.
fn fill_rows<T, F>(out: &mut [T], row_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    #[cfg(feature = "rayon")]
    {
        out.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(i, row)| f(i, row));
    }

    #[cfg(not(feature = "rayon"))]
    {
        for (i, row) in out.chunks_mut(row_len).enumerate() {
            f(i, row);
        }
    }
}

/// Call `f(i, row)` for every variable-length row of `out`.
fn fill_var_rows<T, F>(out: &mut [Vec<T>], f: F)
where
    T: Send,
    F: Fn(usize, &mut Vec<T>) + Sync + Send,
{
    #[cfg(feature = "rayon")]
    {
        out.par_iter_mut()
            .enumerate()
            .for_each(|(i, row)| f(i, row));
    }

    #[cfg(not(feature = "rayon"))]
    {
        for (i, row) in out.iter_mut().enumerate() {
            f(i, row);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn knn_len_overflow() {
        assert_eq!(knn_len(3, 4).unwrap(), 12);
        assert!(matches!(
            knn_len(usize::MAX, 2),
            Err(PointIndexError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rows_are_visited_once() {
        let mut out = vec![0usize; 12];
        fill_rows(&mut out, 3, |i, row| row.fill(i));
        assert_eq!(out, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3]);

        let mut rows = vec![vec![7usize]; 3];
        fill_var_rows(&mut rows, |i, row| {
            row.clear();
            row.extend(0..i);
        });
        assert_eq!(rows, vec![vec![], vec![0], vec![0, 1]]);
    }
}
