//! Split rules: where a node's point range is cut in two.
//!
//! Every rule partitions the range in place and returns the split value together with the size of
//! the left part. Points with `coord[axis] < split` end up left and the rest right, so ties go
//! right. The returned split always leaves both parts non-empty; callers must only ask to split a
//! range whose extent along `axis` is positive.

use std::cmp;

use crate::indices::MutableIndices;
use crate::points::PointSet;
use crate::r#type::IndexableNum;

/// The rule used to choose split values while building a [`KDTree`][crate::kdtree::KDTree].
///
/// Both rules split along the axis of largest extent of the node's bounding box, preferring the
/// lowest axis on ties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Splitter {
    /// Split at the middle of the bounding box. If that leaves one side empty, slide the split to
    /// the nearest point so both sides get at least one point.
    ///
    /// Cells keep a bounded aspect ratio, which favors nearest neighbor queries. Deep, lopsided
    /// subtrees fall back to [`LongestMedian`][Splitter::LongestMedian] below a depth limit.
    #[default]
    SlidingMidpoint,
    /// Split at the median coordinate, giving a balanced tree.
    LongestMedian,
}

/// Split at the middle of `min..max`, sliding to the nearest point when one side would be empty.
pub(crate) fn sliding_midpoint<N: IndexableNum>(
    points: &PointSet<N>,
    ids: &mut MutableIndices,
    axis: usize,
    min: N,
    max: N,
) -> (N, usize) {
    debug_assert!(min < max);
    let mut split = N::halfway(min, max);
    let mut mid = partition(points, ids, axis, split);

    if mid == 0 {
        // The midpoint rounded down onto the minimum. Keep only the points at the minimum left.
        split = next_above(points, ids, axis, min);
        mid = partition(points, ids, axis, split);
    } else if mid == ids.len() {
        // Everything is below the midpoint, keep only the points at the maximum right.
        split = max;
        mid = partition(points, ids, axis, split);
    }

    debug_assert!(mid > 0 && mid < ids.len());
    (split, mid)
}

/// Split at the median along `axis`.
///
/// The median is found with a selection algorithm; then the range is partitioned strictly at its
/// value. When the median equals the minimum (many duplicates), the split slides up to the next
/// coordinate.
pub(crate) fn longest_median<N: IndexableNum>(
    points: &PointSet<N>,
    ids: &mut MutableIndices,
    axis: usize,
    min: N,
) -> (N, usize) {
    let len = ids.len();
    debug_assert!(len >= 2);
    let k = len / 2;
    select(points, ids, k, 0, len - 1, axis);

    let mut split = points.coord(ids.get(k), axis);
    if split <= min {
        split = next_above(points, ids, axis, min);
    }
    let mid = partition(points, ids, axis, split);

    debug_assert!(mid > 0 && mid < len);
    (split, mid)
}

/// Two-way partition: move every index with `coord[axis] < split` to the front.
///
/// Returns the number of such indices. Linear time, no allocation.
pub(crate) fn partition<N: IndexableNum>(
    points: &PointSet<N>,
    ids: &mut MutableIndices,
    axis: usize,
    split: N,
) -> usize {
    let mut lo = 0;
    let mut hi = ids.len();
    while lo < hi {
        if points.coord(ids.get(lo), axis) < split {
            lo += 1;
        } else {
            hi -= 1;
            ids.swap(lo, hi);
        }
    }
    lo
}

/// The smallest coordinate along `axis` that is strictly greater than `value`.
fn next_above<N: IndexableNum>(
    points: &PointSet<N>,
    ids: &MutableIndices,
    axis: usize,
    value: N,
) -> N {
    let mut best = N::infinity();
    for i in 0..ids.len() {
        let c = points.coord(ids.get(i), axis);
        if c > value && c < best {
            best = c;
        }
    }
    best
}

/// Custom Floyd-Rivest selection algorithm: reorder `ids[left..=right]` so that the item at `k`
/// is the one a full sort along `axis` would put there, with no larger item before it and no
/// smaller item after it.
fn select<N: IndexableNum>(
    points: &PointSet<N>,
    ids: &mut MutableIndices,
    k: usize,
    mut left: usize,
    mut right: usize,
    axis: usize,
) {
    let value = |ids: &MutableIndices, i: usize| points.coord(ids.get(i), axis);

    while right > left {
        if right - left > 600 {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = f64::ln(n);
            let s = 0.5 * f64::exp((2.0 * z) / 3.0);
            let sd = 0.5
                * f64::sqrt((z * s * (n - s)) / n)
                * (if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 });
            let new_left = cmp::max(left, f64::floor(k as f64 - (m * s) / n + sd) as usize);
            let new_right = cmp::min(
                right,
                f64::floor(k as f64 + ((n - m) * s) / n + sd) as usize,
            );
            select(points, ids, k, new_left, new_right, axis);
        }

        let t = value(ids, k);
        let mut i = left;
        let mut j = right;

        ids.swap(left, k);
        if value(ids, right) > t {
            ids.swap(left, right);
        }

        while i < j {
            ids.swap(i, j);
            i += 1;
            j -= 1;
            while value(ids, i) < t {
                i += 1;
            }
            while value(ids, j) > t {
                j -= 1;
            }
        }

        if value(ids, left) == t {
            ids.swap(left, j);
        } else {
            j += 1;
            ids.swap(j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            match j.checked_sub(1) {
                Some(r) => right = r,
                None => break,
            }
        }
    }
}
