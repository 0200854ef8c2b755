//! Fixtures and brute-force reference searches shared by the unit tests.

use proptest::collection::vec;
use proptest::strategy::Strategy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::metric::Metric;
use crate::neighbor::Neighbor;
use crate::points::PointSet;
use crate::r#type::IndexableNum;

/// `npts` uniformly distributed points in `[-100, 100)^sdim`, reproducible from `seed`.
pub(crate) fn random_coords(seed: u64, npts: usize, sdim: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..npts * sdim).map(|_| rng.gen_range(-100.0..100.0)).collect()
}

/// Points on a small integer lattice, so that many distances tie.
pub(crate) fn lattice_coords(seed: u64, npts: usize, sdim: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..npts * sdim)
        .map(|_| rng.gen_range(0..8) as f64)
        .collect()
}

/// A proptest strategy for between 1 and `max_len` planar points.
pub(crate) fn random_points(max_len: usize) -> impl Strategy<Value = Vec<[f64; 2]>> {
    vec((-100.0..100.0, -100.0..100.0), 1..max_len)
        .prop_map(|xy| xy.into_iter().map(|(x, y)| [x, y]).collect())
}

/// The exact `k` nearest neighbors by exhaustive scan, padded like a tree search.
pub(crate) fn brute_force_knn<N: IndexableNum, M: Metric<N>>(
    points: &PointSet<N>,
    metric: &M,
    query: &[N],
    k: usize,
) -> Vec<Neighbor<N>> {
    let mut all: Vec<_> = points
        .iter()
        .enumerate()
        .map(|(i, p)| Neighbor::new(i as u32, metric.dist(query, p)))
        .collect();
    all.sort_by(Neighbor::cmp_by_distance);
    all.truncate(k);
    all.resize(k, Neighbor::sentinel());
    all
}

/// Sorted indices of all points within `radius`.
pub(crate) fn brute_force_radius<N: IndexableNum, M: Metric<N>>(
    points: &PointSet<N>,
    metric: &M,
    query: &[N],
    radius: N,
) -> Vec<u32> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| metric.dist(query, p) <= radius)
        .map(|(i, _)| i as u32)
        .collect()
}

/// Sorted indices of all points inside the inclusive box.
pub(crate) fn brute_force_box<N: IndexableNum>(
    points: &PointSet<N>,
    min: &[N],
    max: &[N],
) -> Vec<u32> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| (0..p.len()).all(|d| p[d] >= min[d] && p[d] <= max[d]))
        .map(|(i, _)| i as u32)
        .collect()
}

/// Sort unordered search results by point index.
pub(crate) fn sorted<T: Ord>(mut items: Vec<T>) -> Vec<T> {
    items.sort();
    items
}
