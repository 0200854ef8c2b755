use log::debug;

use crate::error::{PointIndexError, Result};
use crate::indices::{MutableIndices, OwnedIndices};
use crate::kdtree::index::{KDTreeMetadata, NodeArena, NodeKind};
use crate::kdtree::split::{longest_median, sliding_midpoint, Splitter};
use crate::kdtree::KDTree;
use crate::metric::{L2Squared, Metric};
use crate::points::PointSet;
use crate::r#type::IndexableNum;

/// The default leaf size used by [`KDTreeBuilder::new`].
pub const DEFAULT_LEAF_SIZE: usize = 10;

/// Ranges at least this long are split across the rayon thread pool.
#[cfg(feature = "rayon")]
const PARALLEL_BUILD_THRESHOLD: usize = 1 << 14;

/// A builder to create a [`KDTree`].
///
/// ```
/// use point_index::kdtree::{KDTreeBuilder, Splitter};
/// use point_index::metric::L1;
/// use point_index::PointSet;
///
/// let coords = [0.0f64, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0];
/// let points = PointSet::try_new(&coords, 2).unwrap();
/// let tree = KDTreeBuilder::new(points)
///     .metric(L1)
///     .leaf_size(1)
///     .splitter(Splitter::LongestMedian)
///     .build()
///     .unwrap();
/// assert_eq!(tree.metadata().num_leaves(), 4);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct KDTreeBuilder<'a, N: IndexableNum, M: Metric<N> = L2Squared> {
    points: PointSet<'a, N>,
    metric: M,
    leaf_size: usize,
    splitter: Splitter,
}

impl<'a, N: IndexableNum> KDTreeBuilder<'a, N> {
    /// Create a new builder over `points` with the [`L2Squared`] metric, the default leaf size
    /// and the default split rule.
    pub fn new(points: PointSet<'a, N>) -> Self {
        Self {
            points,
            metric: L2Squared,
            leaf_size: DEFAULT_LEAF_SIZE,
            splitter: Splitter::default(),
        }
    }
}

impl<'a, N: IndexableNum, M: Metric<N>> KDTreeBuilder<'a, N, M> {
    /// Use `metric` for all queries against the built tree.
    pub fn metric<M2: Metric<N>>(self, metric: M2) -> KDTreeBuilder<'a, N, M2> {
        KDTreeBuilder {
            points: self.points,
            metric,
            leaf_size: self.leaf_size,
            splitter: self.splitter,
        }
    }

    /// Stop splitting once a node holds at most `leaf_size` points. Must be at least 1.
    pub fn leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    /// Choose the split rule.
    pub fn splitter(mut self, splitter: Splitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Consume this builder, partitioning the points and generating a KDTree ready for queries.
    ///
    /// Fails with [`PointIndexError::InvalidParameter`] if the leaf size is zero, if there are
    /// more than `u32::MAX` points, or if a coordinate is not finite.
    pub fn build(self) -> Result<KDTree<'a, N, M>> {
        if self.leaf_size == 0 {
            return Err(PointIndexError::InvalidParameter(
                "leaf size must be at least 1".to_string(),
            ));
        }
        let npts = self.points.npts();
        if npts > u32::MAX as usize {
            return Err(PointIndexError::InvalidParameter(format!(
                "cannot index {} points, the maximum is {}",
                npts,
                u32::MAX
            )));
        }
        if let Some(pos) = self.points.coords().iter().position(|c| !c.is_finite()) {
            return Err(PointIndexError::InvalidParameter(format!(
                "coordinate {} of point {} is not finite",
                pos % self.points.sdim(),
                pos / self.points.sdim()
            )));
        }

        let sdim = self.points.sdim();
        let ctx = BuildContext {
            points: self.points,
            leaf_size: self.leaf_size,
            splitter: self.splitter,
            depth_limit: depth_limit(npts),
        };

        let mut indices = OwnedIndices::identity(npts);
        // A tree with leaves of at least leaf_size / 2 points has at most this many nodes
        let expected_nodes = 2 * npts.div_ceil(self.leaf_size.div_ceil(2).max(1));
        let mut arena = NodeArena::with_capacity(sdim, expected_nodes);
        let mut stats = BuildStats::default();
        build_node(&ctx, &mut arena, &mut indices.view_mut(), 0, 0, &mut stats);

        let metadata = KDTreeMetadata {
            npts,
            sdim,
            leaf_size: self.leaf_size,
            num_nodes: arena.len(),
            num_leaves: stats.num_leaves,
            depth: stats.depth,
            splitter: self.splitter,
        };
        debug!(
            "built kd-tree over {} points in {} dimensions: {} nodes, {} leaves, depth {}, {} bytes per index",
            npts,
            sdim,
            metadata.num_nodes,
            metadata.num_leaves,
            metadata.depth,
            indices.bytes_per_element()
        );

        Ok(KDTree {
            points: self.points,
            metric: self.metric,
            arena,
            indices,
            metadata,
        })
    }
}

/// Below this depth sliding midpoint splits are used as-is; deeper nodes switch to median splits.
fn depth_limit(npts: usize) -> usize {
    let log2 = usize::BITS - npts.max(1).leading_zeros();
    2 * log2 as usize + 8
}

struct BuildContext<'p, N: IndexableNum> {
    points: PointSet<'p, N>,
    leaf_size: usize,
    splitter: Splitter,
    depth_limit: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct BuildStats {
    num_leaves: usize,
    depth: usize,
}

impl BuildStats {
    fn merge(&mut self, other: BuildStats) {
        self.num_leaves += other.num_leaves;
        self.depth = self.depth.max(other.depth);
    }
}

/// Recursively build the subtree over `ids`, which sits at `offset` in the full permutation.
///
/// Returns the id of the subtree root in `arena`.
fn build_node<N: IndexableNum>(
    ctx: &BuildContext<N>,
    arena: &mut NodeArena<N>,
    ids: &mut MutableIndices,
    offset: usize,
    depth: usize,
    stats: &mut BuildStats,
) -> usize {
    let len = ids.len();
    let id = arena.push(offset, offset + len);
    compute_bounds(ctx, arena, id, ids);

    // axis of largest extent, the lowest one on ties
    let (min, max) = (arena.min(id), arena.max(id));
    let mut axis = 0;
    let mut extent = max[0] - min[0];
    for d in 1..min.len() {
        let e = max[d] - min[d];
        if e > extent {
            axis = d;
            extent = e;
        }
    }
    let (axis_min, axis_max) = (min[axis], max[axis]);

    // Coincident points cannot be separated, so they stay together in one leaf
    if len <= ctx.leaf_size || extent <= N::zero() {
        stats.num_leaves += 1;
        stats.depth = stats.depth.max(depth);
        return id;
    }

    let (split, mid) = match ctx.splitter {
        Splitter::SlidingMidpoint if depth < ctx.depth_limit => {
            sliding_midpoint(&ctx.points, ids, axis, axis_min, axis_max)
        }
        _ => longest_median(&ctx.points, ids, axis, axis_min),
    };

    let (mut left_ids, mut right_ids) = ids.split_at_mut(mid);

    #[cfg(feature = "rayon")]
    if len >= PARALLEL_BUILD_THRESHOLD {
        let sdim = arena.sdim;
        let build_detached = |ids: &mut MutableIndices, offset: usize| {
            let mut sub_arena = NodeArena::new(sdim);
            let mut sub_stats = BuildStats::default();
            build_node(ctx, &mut sub_arena, ids, offset, depth + 1, &mut sub_stats);
            (sub_arena, sub_stats)
        };
        let ((left_arena, left_stats), (right_arena, right_stats)) = rayon::join(
            || build_detached(&mut left_ids, offset),
            || build_detached(&mut right_ids, offset + mid),
        );
        let left = arena.graft(left_arena);
        let right = arena.graft(right_arena);
        stats.merge(left_stats);
        stats.merge(right_stats);
        arena.nodes[id].kind = NodeKind::Branch {
            axis,
            split,
            left,
            right,
        };
        return id;
    }

    let left = build_node(ctx, arena, &mut left_ids, offset, depth + 1, stats);
    let right = build_node(ctx, arena, &mut right_ids, offset + mid, depth + 1, stats);
    arena.nodes[id].kind = NodeKind::Branch {
        axis,
        split,
        left,
        right,
    };
    id
}

/// Fill in the tight bounding box of node `id` over the points in `ids`.
fn compute_bounds<N: IndexableNum>(
    ctx: &BuildContext<N>,
    arena: &mut NodeArena<N>,
    id: usize,
    ids: &MutableIndices,
) {
    let (min, max) = arena.bounds_mut(id);
    for i in 0..ids.len() {
        let point = ctx.points.point(ids.get(i));
        for d in 0..point.len() {
            if point[d] < min[d] {
                min[d] = point[d];
            }
            if point[d] > max[d] {
                max[d] = point[d];
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_zero_leaf_size() {
        let rows = [[0.0f64, 0.0]];
        let points = PointSet::from_rows(&rows).unwrap();
        let err = KDTreeBuilder::new(points).leaf_size(0).build().unwrap_err();
        assert!(matches!(err, PointIndexError::InvalidParameter(_)));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let rows = [[0.0f64, 0.0], [1.0, f64::NAN]];
        let points = PointSet::from_rows(&rows).unwrap();
        let err = KDTreeBuilder::new(points).build().unwrap_err();
        assert!(matches!(err, PointIndexError::InvalidParameter(_)));
    }

    #[test]
    fn single_point_is_a_leaf() {
        let rows = [[3.0f32, 4.0, 5.0]];
        let points = PointSet::from_rows(&rows).unwrap();
        let tree = KDTreeBuilder::new(points).leaf_size(1).build().unwrap();
        assert_eq!(tree.metadata().num_nodes(), 1);
        assert_eq!(tree.metadata().depth(), 0);
        assert!(tree.root().is_leaf());
    }

    #[test]
    fn coincident_points_share_a_leaf() {
        let rows = [[1.0f64, 1.0]; 20];
        let points = PointSet::from_rows(&rows).unwrap();
        let tree = KDTreeBuilder::new(points).leaf_size(2).build().unwrap();
        assert_eq!(tree.metadata().num_nodes(), 1);
        assert_eq!(tree.root().indices().len(), 20);
    }

    #[test]
    fn depth_is_bounded_on_skewed_input() {
        // exponentially spaced points make every sliding midpoint split peel off one value
        let npts: usize = 1000;
        let rows: Vec<[f64; 1]> = (0..npts as i32).map(|i| [2f64.powi(-(i % 900))]).collect();
        let points = PointSet::from_rows(&rows).unwrap();
        let tree = KDTreeBuilder::new(points).leaf_size(1).build().unwrap();

        // median splits take over below the limit and roughly halve every level from there
        let bit_length = (usize::BITS - npts.leading_zeros()) as usize;
        let depth = tree.metadata().depth();
        assert!(depth > depth_limit(npts), "depth {}", depth);
        assert!(depth <= depth_limit(npts) + bit_length + 2, "depth {}", depth);
    }

    #[test]
    fn depth_limit_grows_with_log() {
        assert_eq!(depth_limit(1), 10);
        assert_eq!(depth_limit(1024), 30);
    }
}
