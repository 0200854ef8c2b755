//! Query adapters for planar geometries described by [`geo_traits`].
//!
//! These only apply to trees over 2D points; any other dimension fails with
//! [`DimensionMismatch`][crate::PointIndexError::DimensionMismatch].

use geo_traits::{CoordTrait, RectTrait};

use crate::error::Result;
use crate::kdtree::KDTree;
use crate::metric::Metric;
use crate::neighbor::Neighbor;
use crate::r#type::IndexableNum;

impl<N: IndexableNum, M: Metric<N>> KDTree<'_, N, M> {
    /// Search the `k` nearest neighbors of a coordinate. See [`search_knn`][Self::search_knn].
    pub fn search_knn_coord(
        &self,
        coord: &impl CoordTrait<T = N>,
        k: usize,
    ) -> Result<Vec<Neighbor<N>>> {
        self.search_knn(&[coord.x(), coord.y()], k)
    }

    /// Search all points within `radius` of a coordinate. See
    /// [`search_radius`][Self::search_radius].
    pub fn search_radius_coord(
        &self,
        coord: &impl CoordTrait<T = N>,
        radius: N,
    ) -> Result<Vec<Neighbor<N>>> {
        self.search_radius(&[coord.x(), coord.y()], radius)
    }

    /// Search the points inside a rectangle. See [`search_box`][Self::search_box].
    pub fn search_box_rect(&self, rect: &impl RectTrait<T = N>) -> Result<Vec<u32>> {
        let (min, max) = (rect.min(), rect.max());
        self.search_box(&[min.x(), min.y()], &[max.x(), max.y()])
    }
}

#[cfg(test)]
mod test {
    use geo_0_31::{coord, Rect};

    use super::*;
    use crate::error::PointIndexError;
    use crate::metric::L2Squared;
    use crate::PointSet;

    #[test]
    fn planar_adapters() {
        let rows = [[2.0f64, 1.0], [4.0, 3.0], [8.0, 7.0]];
        let points = PointSet::from_rows(&rows).unwrap();
        let tree = KDTree::try_new(points, L2Squared, 1).unwrap();

        let nn = tree.search_knn_coord(&coord! { x: 7.0, y: 7.0 }, 1).unwrap();
        assert_eq!(nn, vec![Neighbor::new(2, 1.0)]);

        let mut found = tree
            .search_radius_coord(&coord! { x: 3.0, y: 2.0 }, 2.0)
            .unwrap();
        found.sort_by_key(|n| n.index);
        assert_eq!(found, vec![Neighbor::new(0, 2.0), Neighbor::new(1, 2.0)]);

        let rect = Rect::new(coord! { x: 3.0, y: 0.0 }, coord! { x: 10.0, y: 10.0 });
        let mut ids = tree.search_box_rect(&rect).unwrap();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);

        // corners given in any order are normalized by the rectangle
        let flipped = Rect::new(coord! { x: 3.0, y: 3.0 }, coord! { x: 0.0, y: 0.0 });
        assert_eq!(tree.search_box_rect(&flipped).unwrap(), vec![0]);
    }

    #[test]
    fn planar_adapters_need_2d_trees() {
        let rows = [[0.0f64, 0.0, 0.0]];
        let points = PointSet::from_rows(&rows).unwrap();
        let tree = KDTree::try_new(points, L2Squared, 1).unwrap();
        let mismatch = PointIndexError::DimensionMismatch {
            expected: 3,
            actual: 2,
        };
        let origin = coord! { x: 0.0, y: 0.0 };
        assert_eq!(tree.search_knn_coord(&origin, 1).unwrap_err(), mismatch);
        assert_eq!(
            tree.search_box_rect(&Rect::new(origin, origin)).unwrap_err(),
            mismatch
        );
    }
}
