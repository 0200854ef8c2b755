//! Exact and approximate k-nearest-neighbor search.

use tinyvec::TinyVec;

use crate::error::{PointIndexError, Result};
use crate::kdtree::index::NodeKind;
use crate::kdtree::KDTree;
use crate::metric::Metric;
use crate::neighbor::Neighbor;
use crate::r#type::IndexableNum;

impl<N: IndexableNum, M: Metric<N>> KDTree<'_, N, M> {
    /// Search the `k` nearest neighbors of `query`.
    ///
    /// The result always holds exactly `k` entries, sorted by ascending distance with ties broken
    /// by lower index. When the tree holds fewer than `k` points the tail is padded with
    /// [`Neighbor::sentinel`] entries.
    pub fn search_knn(&self, query: &[N], k: usize) -> Result<Vec<Neighbor<N>>> {
        self.check_point(query)?;
        check_k(k)?;
        let mut out = vec![Neighbor::sentinel(); k];
        knn_into(self, query, &mut out, N::one());
        Ok(out)
    }

    /// Search `k` approximate nearest neighbors of `query`.
    ///
    /// `max_error_ratio` is `metric.scale(1 + e)` for a relative error `e >= 0`; see
    /// [`KDTree::metric_scale`]. The i-th returned distance is at most `max_error_ratio` times the
    /// true i-th nearest distance. Distances are the actual metric distances of the returned
    /// points; they are not divided by the ratio.
    pub fn search_aknn(
        &self,
        query: &[N],
        k: usize,
        max_error_ratio: N,
    ) -> Result<Vec<Neighbor<N>>> {
        self.check_point(query)?;
        check_k(k)?;
        self.check_error_ratio(max_error_ratio)?;
        let mut out = vec![Neighbor::sentinel(); k];
        knn_into(self, query, &mut out, max_error_ratio);
        Ok(out)
    }

    pub(crate) fn check_error_ratio(&self, max_error_ratio: N) -> Result<()> {
        let one = self.metric.scale(N::one());
        if max_error_ratio.is_nan() || max_error_ratio < one {
            return Err(PointIndexError::InvalidParameter(format!(
                "max error ratio {:?} is below the metric's unit {:?}",
                max_error_ratio, one
            )));
        }
        Ok(())
    }
}

pub(crate) fn check_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(PointIndexError::InvalidParameter(
            "k must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Fill `out` with the `out.len()` nearest neighbors of `query`.
///
/// A subtree is skipped once `lower_bound * ratio` exceeds the current k-th distance. With
/// `ratio == 1` the search is exact. Inputs must already be validated.
pub(crate) fn knn_into<N: IndexableNum, M: Metric<N>>(
    tree: &KDTree<N, M>,
    query: &[N],
    out: &mut [Neighbor<N>],
    ratio: N,
) {
    debug_assert!(!out.is_empty());
    out.fill(Neighbor::sentinel());

    let arena = &tree.arena;
    let indices = tree.indices.view();
    let metric = &tree.metric;
    let last = out.len() - 1;

    // Use TinyVec to avoid heap allocations. Entries are (node id, lower bound).
    let mut stack: TinyVec<[(usize, N); 32]> = TinyVec::new();
    stack.push((0, metric.dist_to_box(query, arena.min(0), arena.max(0))));

    while let Some((id, bound)) = stack.pop() {
        // The k-th distance may have shrunk since this node was queued
        if bound * ratio > out[last].distance {
            continue;
        }

        let node = arena.node(id);
        match node.kind {
            NodeKind::Leaf => {
                for i in node.begin..node.end {
                    let index = indices.get(i);
                    let candidate =
                        Neighbor::new(index as u32, metric.dist(query, tree.points.point(index)));
                    insert_sorted(out, candidate);
                }
            }
            NodeKind::Branch { left, right, .. } => {
                let d_left = metric.dist_to_box(query, arena.min(left), arena.max(left));
                let d_right = metric.dist_to_box(query, arena.min(right), arena.max(right));
                let worst = out[last].distance;

                // Push the far child first so the near one is visited first
                let (near, d_near, far, d_far) = if d_left <= d_right {
                    (left, d_left, right, d_right)
                } else {
                    (right, d_right, left, d_left)
                };
                if d_far * ratio <= worst {
                    stack.push((far, d_far));
                }
                if d_near * ratio <= worst {
                    stack.push((near, d_near));
                }
            }
        }
    }
}

/// Insert `candidate` into the sorted, full `out` if it beats the current last entry.
#[inline]
fn insert_sorted<N: IndexableNum>(out: &mut [Neighbor<N>], candidate: Neighbor<N>) {
    let mut i = out.len() - 1;
    if !candidate.is_closer_than(&out[i]) {
        return;
    }
    while i > 0 && candidate.is_closer_than(&out[i - 1]) {
        out[i] = out[i - 1];
        i -= 1;
    }
    out[i] = candidate;
}
