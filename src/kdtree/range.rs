//! Axis-aligned box search.

use tinyvec::TinyVec;

use crate::error::{check_dim, Result};
use crate::kdtree::index::NodeKind;
use crate::kdtree::KDTree;
use crate::metric::Metric;
use crate::r#type::IndexableNum;

impl<N: IndexableNum, M: Metric<N>> KDTree<'_, N, M> {
    /// Search the index for points within the box spanned by `min` and `max`.
    ///
    /// Bounds are inclusive on every axis. A box with `min > max` on any axis is empty.
    ///
    /// Returns indices of found points, unordered.
    pub fn search_box(&self, min: &[N], max: &[N]) -> Result<Vec<u32>> {
        self.check_point(min)?;
        check_dim(self.sdim(), max.len())?;
        let mut out = vec![];
        box_into(self, min, max, &mut out);
        Ok(out)
    }
}

/// Append the index of every point inside `[min, max]` to `out`. Inputs must already be
/// validated.
pub(crate) fn box_into<N: IndexableNum, M: Metric<N>>(
    tree: &KDTree<N, M>,
    min: &[N],
    max: &[N],
    out: &mut Vec<u32>,
) {
    let arena = &tree.arena;
    let indices = tree.indices.view();

    if !intersects(min, max, arena.min(0), arena.max(0)) {
        return;
    }

    // Use TinyVec to avoid heap allocations
    let mut stack: TinyVec<[usize; 32]> = TinyVec::new();
    stack.push(0);

    while let Some(id) = stack.pop() {
        let node = arena.node(id);

        // every point of a node that lies fully inside the query matches
        if contains(min, max, arena.min(id), arena.max(id)) {
            indices.slice(node.begin, node.end).extend_into(out);
            continue;
        }

        match node.kind {
            NodeKind::Leaf => {
                for i in node.begin..node.end {
                    let index = indices.get(i);
                    if contains_point(min, max, tree.points.point(index)) {
                        out.push(index as u32);
                    }
                }
            }
            NodeKind::Branch { left, right, .. } => {
                if intersects(min, max, arena.min(right), arena.max(right)) {
                    stack.push(right);
                }
                if intersects(min, max, arena.min(left), arena.max(left)) {
                    stack.push(left);
                }
            }
        }
    }
}

/// `true` if the query box `[min, max]` and the node box `[node_min, node_max]` overlap.
#[inline]
fn intersects<N: IndexableNum>(min: &[N], max: &[N], node_min: &[N], node_max: &[N]) -> bool {
    (0..min.len()).all(|d| max[d] >= node_min[d] && min[d] <= node_max[d])
}

/// `true` if the node box lies fully inside the query box.
#[inline]
fn contains<N: IndexableNum>(min: &[N], max: &[N], node_min: &[N], node_max: &[N]) -> bool {
    (0..min.len()).all(|d| min[d] <= node_min[d] && node_max[d] <= max[d])
}

#[inline]
fn contains_point<N: IndexableNum>(min: &[N], max: &[N], point: &[N]) -> bool {
    (0..min.len()).all(|d| point[d] >= min[d] && point[d] <= max[d])
}
