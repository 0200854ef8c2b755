//! Utilities to traverse the KDTree structure.

use crate::indices::Indices;
use crate::kdtree::index::NodeKind;
use crate::kdtree::KDTree;
use crate::metric::Metric;
use crate::r#type::IndexableNum;

/// A node in the KDTree.
///
/// Leaves hold a short range of point indices; branches split their points between two children
/// along one axis.
#[derive(Debug, Clone, Copy)]
pub struct Node<'t, 'a, N: IndexableNum, M: Metric<N>> {
    /// The tree that this node is a reference onto
    tree: &'t KDTree<'a, N, M>,
    id: usize,
}

impl<'t, 'a, N: IndexableNum, M: Metric<N>> Node<'t, 'a, N, M> {
    pub(crate) fn new(tree: &'t KDTree<'a, N, M>, id: usize) -> Self {
        Self { tree, id }
    }

    /// The position of this node in the tree's node arena. The root is 0.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.tree.arena.node(self.id).kind, NodeKind::Leaf)
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    /// The axis the children of this node are split over, `None` for leaves.
    pub fn split_axis(&self) -> Option<usize> {
        match self.tree.arena.node(self.id).kind {
            NodeKind::Branch { axis, .. } => Some(axis),
            NodeKind::Leaf => None,
        }
    }

    /// The split value, `None` for leaves.
    ///
    /// Points of the left child are strictly below it along [`split_axis`][Self::split_axis];
    /// points equal to it belong to the right child.
    pub fn split_value(&self) -> Option<N> {
        match self.tree.arena.node(self.id).kind {
            NodeKind::Branch { split, .. } => Some(split),
            NodeKind::Leaf => None,
        }
    }

    /// The child node holding the points below the split value.
    pub fn left_child(&self) -> Option<Node<'t, 'a, N, M>> {
        match self.tree.arena.node(self.id).kind {
            NodeKind::Branch { left, .. } => Some(Node::new(self.tree, left)),
            NodeKind::Leaf => None,
        }
    }

    /// The child node holding the points at or above the split value.
    pub fn right_child(&self) -> Option<Node<'t, 'a, N, M>> {
        match self.tree.arena.node(self.id).kind {
            NodeKind::Branch { right, .. } => Some(Node::new(self.tree, right)),
            NodeKind::Leaf => None,
        }
    }

    /// The minimum corner of the bounding box of all points under this node.
    #[inline]
    pub fn min(&self) -> &'t [N] {
        self.tree.arena.min(self.id)
    }

    /// The maximum corner of the bounding box of all points under this node.
    #[inline]
    pub fn max(&self) -> &'t [N] {
        self.tree.arena.max(self.id)
    }

    /// The indices of all points under this node.
    pub fn indices(&self) -> Indices<'t> {
        let node = self.tree.arena.node(self.id);
        self.tree.indices.view().slice(node.begin, node.end)
    }

    /// The number of points under this node.
    #[inline]
    pub fn len(&self) -> usize {
        let node = self.tree.arena.node(self.id);
        node.end - node.begin
    }

    /// Nodes always hold at least one point; provided for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use crate::kdtree::KDTree;
    use crate::metric::L2Squared;
    use crate::PointSet;

    #[test]
    fn walk_the_tree() {
        let rows = [[0.0f64, 0.0], [10.0, 1.0], [2.0, 0.5], [8.0, 0.0]];
        let points = PointSet::from_rows(&rows).unwrap();
        let tree = KDTree::try_new(points, L2Squared, 1).unwrap();

        let root = tree.root();
        assert!(root.is_parent());
        assert_eq!(root.id(), 0);
        assert_eq!(root.len(), 4);
        assert_eq!(root.min(), &[0.0, 0.0]);
        assert_eq!(root.max(), &[10.0, 1.0]);
        assert_eq!(root.split_axis(), Some(0));
        assert_eq!(root.split_value(), Some(5.0));

        let left = root.left_child().unwrap();
        let right = root.right_child().unwrap();
        let mut left_ids: Vec<u32> = left.indices().iter().collect();
        left_ids.sort();
        assert_eq!(left_ids, vec![0, 2]);
        assert_eq!(left.max(), &[2.0, 0.5]);
        assert_eq!(right.min(), &[8.0, 0.0]);

        let leaf = left.left_child().unwrap();
        assert!(leaf.is_leaf());
        assert_eq!(leaf.split_axis(), None);
        assert!(leaf.left_child().is_none());
        assert_eq!(leaf.indices().iter().collect::<Vec<_>>(), vec![0]);
    }
}
