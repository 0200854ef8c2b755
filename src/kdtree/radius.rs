//! Fixed-radius search.

use tinyvec::TinyVec;

use crate::error::{PointIndexError, Result};
use crate::kdtree::index::NodeKind;
use crate::kdtree::KDTree;
use crate::metric::Metric;
use crate::neighbor::Neighbor;
use crate::r#type::IndexableNum;

impl<N: IndexableNum, M: Metric<N>> KDTree<'_, N, M> {
    /// Search all points within `radius` of `query`.
    ///
    /// `radius` is in the metric's native space: for [`L2Squared`][crate::metric::L2Squared] pass
    /// `tree.metric_scale(r)`. A point exactly at the radius is included. Results are unordered;
    /// see [`sort_neighbors`][crate::sort_neighbors].
    pub fn search_radius(&self, query: &[N], radius: N) -> Result<Vec<Neighbor<N>>> {
        self.check_point(query)?;
        check_radius(radius)?;
        let mut out = vec![];
        radius_into(self, query, radius, &mut out);
        Ok(out)
    }
}

pub(crate) fn check_radius<N: IndexableNum>(radius: N) -> Result<()> {
    if radius.is_nan() || radius < N::zero() {
        return Err(PointIndexError::InvalidParameter(format!(
            "radius must be non-negative, got {:?}",
            radius
        )));
    }
    Ok(())
}

/// Append every point within `radius` of `query` to `out`. Inputs must already be validated.
pub(crate) fn radius_into<N: IndexableNum, M: Metric<N>>(
    tree: &KDTree<N, M>,
    query: &[N],
    radius: N,
    out: &mut Vec<Neighbor<N>>,
) {
    let arena = &tree.arena;
    let indices = tree.indices.view();
    let metric = &tree.metric;

    if metric.dist_to_box(query, arena.min(0), arena.max(0)) > radius {
        return;
    }

    // Use TinyVec to avoid heap allocations
    let mut stack: TinyVec<[usize; 32]> = TinyVec::new();
    stack.push(0);

    while let Some(id) = stack.pop() {
        let node = arena.node(id);
        match node.kind {
            NodeKind::Leaf => {
                for i in node.begin..node.end {
                    let index = indices.get(i);
                    let d = metric.dist(query, tree.points.point(index));
                    if d <= radius {
                        out.push(Neighbor::new(index as u32, d));
                    }
                }
            }
            NodeKind::Branch { left, right, .. } => {
                // queue the children whose bounding box reaches into the ball
                if metric.dist_to_box(query, arena.min(right), arena.max(right)) <= radius {
                    stack.push(right);
                }
                if metric.dist_to_box(query, arena.min(left), arena.max(left)) <= radius {
                    stack.push(left);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validates_radius() {
        assert!(check_radius(0.0f64).is_ok());
        assert!(check_radius(f64::INFINITY).is_ok());
        assert!(matches!(
            check_radius(-1.0f64),
            Err(PointIndexError::InvalidParameter(_))
        ));
        assert!(matches!(
            check_radius(f32::NAN),
            Err(PointIndexError::InvalidParameter(_))
        ));
    }
}
