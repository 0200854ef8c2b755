use std::cmp::Ordering;

use crate::r#type::IndexableNum;

/// A single query result: the insertion index of a point and its distance to the query.
///
/// The distance is in the native space of the metric the tree was built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<N: IndexableNum> {
    /// Index of the point in the build point set.
    pub index: u32,
    /// Distance from the query, in metric space.
    pub distance: N,
}

impl<N: IndexableNum> Neighbor<N> {
    /// Index carried by padding entries.
    pub const INVALID_INDEX: u32 = u32::MAX;

    /// Create a new neighbor.
    #[inline]
    pub fn new(index: u32, distance: N) -> Self {
        Self { index, distance }
    }

    /// The padding entry written to kNN slots that could not be filled because the tree holds
    /// fewer than `k` points: index [`INVALID_INDEX`][Self::INVALID_INDEX], distance `+inf`.
    #[inline]
    pub fn sentinel() -> Self {
        Self {
            index: Self::INVALID_INDEX,
            distance: N::infinity(),
        }
    }

    /// `false` for sentinel entries.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.index != Self::INVALID_INDEX
    }

    /// Order by distance, then by index.
    ///
    /// NaN distances compare equal to everything and therefore fall back to the index.
    #[inline]
    pub fn cmp_by_distance(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then(self.index.cmp(&other.index))
    }

    #[inline]
    pub(crate) fn is_closer_than(&self, other: &Self) -> bool {
        self.distance < other.distance
            || (self.distance == other.distance && self.index < other.index)
    }
}

impl<N: IndexableNum> Default for Neighbor<N> {
    fn default() -> Self {
        Self::sentinel()
    }
}

/// Sort neighbors by ascending distance, breaking ties by index.
///
/// Radius queries return their neighbors unordered; this puts them in kNN order.
pub fn sort_neighbors<N: IndexableNum>(neighbors: &mut [Neighbor<N>]) {
    neighbors.sort_unstable_by(Neighbor::cmp_by_distance);
}
