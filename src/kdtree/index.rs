use crate::error::{check_dim, Result};
use crate::indices::{Indices, OwnedIndices};
use crate::kdtree::split::Splitter;
use crate::kdtree::traversal::Node;
use crate::metric::{L2Squared, Metric};
use crate::points::PointSet;
use crate::r#type::IndexableNum;

/// What a node of the arena holds besides its range and bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum NodeKind<N: IndexableNum> {
    Leaf,
    /// Points with `coord[axis] < split` live under `left`, the rest under `right`.
    Branch {
        axis: usize,
        split: N,
        left: usize,
        right: usize,
    },
}

/// A node of the arena. `begin..end` is the node's range in the tree's index permutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct NodeData<N: IndexableNum> {
    pub(crate) begin: usize,
    pub(crate) end: usize,
    pub(crate) kind: NodeKind<N>,
}

/// Flat storage of the tree's nodes, addressed by integer ids. The root has id 0.
///
/// Bounding boxes live in a parallel buffer: node `id` owns `bounds[2 * sdim * id..]`, minimum
/// corner first, then maximum corner.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodeArena<N: IndexableNum> {
    pub(crate) nodes: Vec<NodeData<N>>,
    pub(crate) bounds: Vec<N>,
    pub(crate) sdim: usize,
}

impl<N: IndexableNum> NodeArena<N> {
    #[cfg(feature = "rayon")]
    pub(crate) fn new(sdim: usize) -> Self {
        Self {
            nodes: vec![],
            bounds: vec![],
            sdim,
        }
    }

    pub(crate) fn with_capacity(sdim: usize, num_nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(num_nodes),
            bounds: Vec::with_capacity(num_nodes * 2 * sdim),
            sdim,
        }
    }

    /// Append a leaf covering `begin..end` with an empty (inverted) bounding box.
    pub(crate) fn push(&mut self, begin: usize, end: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            begin,
            end,
            kind: NodeKind::Leaf,
        });
        self.bounds
            .extend(std::iter::repeat(N::infinity()).take(self.sdim));
        self.bounds
            .extend(std::iter::repeat(N::neg_infinity()).take(self.sdim));
        id
    }

    /// Move every node of `other` to the end of this arena, returning the new id of its root.
    #[cfg(feature = "rayon")]
    pub(crate) fn graft(&mut self, other: NodeArena<N>) -> usize {
        debug_assert_eq!(self.sdim, other.sdim);
        let base = self.nodes.len();
        self.nodes.extend(other.nodes.into_iter().map(|mut node| {
            if let NodeKind::Branch { left, right, .. } = &mut node.kind {
                *left += base;
                *right += base;
            }
            node
        }));
        self.bounds.extend(other.bounds);
        base
    }

    #[inline]
    pub(crate) fn node(&self, id: usize) -> &NodeData<N> {
        &self.nodes[id]
    }

    #[inline]
    pub(crate) fn min(&self, id: usize) -> &[N] {
        let start = 2 * self.sdim * id;
        &self.bounds[start..start + self.sdim]
    }

    #[inline]
    pub(crate) fn max(&self, id: usize) -> &[N] {
        let start = 2 * self.sdim * id + self.sdim;
        &self.bounds[start..start + self.sdim]
    }

    /// Both corners of node `id`, mutably.
    #[inline]
    pub(crate) fn bounds_mut(&mut self, id: usize) -> (&mut [N], &mut [N]) {
        let start = 2 * self.sdim * id;
        self.bounds[start..start + 2 * self.sdim].split_at_mut(self.sdim)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Summary of a built [`KDTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KDTreeMetadata {
    pub(crate) npts: usize,
    pub(crate) sdim: usize,
    pub(crate) leaf_size: usize,
    pub(crate) num_nodes: usize,
    pub(crate) num_leaves: usize,
    pub(crate) depth: usize,
    pub(crate) splitter: Splitter,
}

impl KDTreeMetadata {
    /// The number of indexed points.
    pub fn npts(&self) -> usize {
        self.npts
    }

    /// The spatial dimension of the indexed points.
    pub fn sdim(&self) -> usize {
        self.sdim
    }

    /// The maximum number of points per leaf requested at build time.
    ///
    /// A leaf only exceeds it when all of its points are coincident.
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// The total number of nodes, leaves included.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// The number of leaf nodes.
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    /// The number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The split rule the tree was built with.
    pub fn splitter(&self) -> Splitter {
        self.splitter
    }
}

/// An immutable k-d tree over a borrowed [`PointSet`].
///
/// Create one with [`KDTreeBuilder`][crate::kdtree::KDTreeBuilder] or [`KDTree::try_new`]. The
/// tree borrows the coordinate buffer behind the point set for its whole lifetime, and it never
/// changes after construction: rebuild it to index different points.
///
/// ```
/// use point_index::kdtree::KDTree;
/// use point_index::metric::L2Squared;
/// use point_index::PointSet;
///
/// let rows = [[2.0f32, 1.0], [4.0, 3.0], [8.0, 7.0]];
/// let points = PointSet::from_rows(&rows).unwrap();
/// let tree = KDTree::try_new(points, L2Squared, 1).unwrap();
///
/// let nn = tree.search_knn(&[4.5, 3.0], 1).unwrap();
/// assert_eq!(nn[0].index, 1);
/// assert_eq!(nn[0].distance, 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct KDTree<'a, N: IndexableNum, M: Metric<N> = L2Squared> {
    pub(crate) points: PointSet<'a, N>,
    pub(crate) metric: M,
    pub(crate) arena: NodeArena<N>,
    pub(crate) indices: OwnedIndices,
    pub(crate) metadata: KDTreeMetadata,
}

impl<'a, N: IndexableNum, M: Metric<N>> KDTree<'a, N, M> {
    /// Build a tree with the default split rule.
    ///
    /// Shorthand for `KDTreeBuilder::new(points).metric(metric).leaf_size(leaf_size).build()`.
    pub fn try_new(points: PointSet<'a, N>, metric: M, leaf_size: usize) -> Result<Self> {
        crate::kdtree::KDTreeBuilder::new(points)
            .metric(metric)
            .leaf_size(leaf_size)
            .build()
    }

    /// The number of indexed points.
    #[inline]
    pub fn npts(&self) -> usize {
        self.points.npts()
    }

    /// The spatial dimension of the indexed points.
    #[inline]
    pub fn sdim(&self) -> usize {
        self.points.sdim()
    }

    /// The points this tree was built from.
    #[inline]
    pub fn points(&self) -> &PointSet<'a, N> {
        &self.points
    }

    /// The metric used for every query.
    #[inline]
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Map a plain linear value (a radius, `1 + e`) into the metric's native unit.
    #[inline]
    pub fn metric_scale(&self, x: N) -> N {
        self.metric.scale(x)
    }

    /// Access the metadata describing this tree.
    #[inline]
    pub fn metadata(&self) -> &KDTreeMetadata {
        &self.metadata
    }

    /// The permutation of point indices; every node covers a contiguous range of it.
    #[inline]
    pub fn indices(&self) -> Indices<'_> {
        self.indices.view()
    }

    /// Access the root node of the tree for manual traversal.
    pub fn root(&self) -> Node<'_, 'a, N, M> {
        Node::new(self, 0)
    }

    /// Fail unless `point` has exactly `sdim` coordinates.
    #[inline]
    pub(crate) fn check_point(&self, point: &[N]) -> Result<()> {
        check_dim(self.sdim(), point.len())
    }
}
