//! Distance metrics for spatial queries.
//!
//! A metric measures distances in its own *native* space. For [`L2Squared`] that is the squared
//! Euclidean distance, so any radius or error ratio handed to a query must first be mapped into
//! that space with [`Metric::scale`]. Distances reported by queries are never mapped back.

use std::fmt::Debug;

use crate::error::{check_dim, Result};
use crate::r#type::IndexableNum;

/// A trait for measuring distances between points and from points to axis-aligned boxes.
///
/// `dist` and `dist_to_box` assume their operands have equal length; use
/// [`distance`][Metric::distance] for a checked call.
pub trait Metric<N: IndexableNum>: Copy + Debug + Send + Sync {
    /// The distance between two points.
    fn dist(&self, a: &[N], b: &[N]) -> N;

    /// A lower bound of the distance between `point` and any point inside the box spanned by
    /// `min` and `max`. Zero when the point lies inside the box.
    fn dist_to_box(&self, point: &[N], min: &[N], max: &[N]) -> N;

    /// Map a plain linear value into this metric's native unit.
    ///
    /// `scale(0) == 0` and the mapping is non-decreasing for non-negative input.
    fn scale(&self, x: N) -> N;

    /// The distance between two points, failing when their dimensions differ.
    fn distance(&self, a: &[N], b: &[N]) -> Result<N> {
        check_dim(a.len(), b.len())?;
        Ok(self.dist(a, b))
    }
}

/// The L1 (taxicab) metric: the sum of absolute coordinate differences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L1;

impl<N: IndexableNum> Metric<N> for L1 {
    #[inline]
    fn dist(&self, a: &[N], b: &[N]) -> N {
        a.iter()
            .zip(b)
            .fold(N::zero(), |acc, (&x, &y)| acc + (x - y).abs())
    }

    #[inline]
    fn dist_to_box(&self, point: &[N], min: &[N], max: &[N]) -> N {
        let mut d = N::zero();
        for i in 0..point.len() {
            d = d + axis_dist(point[i], min[i], max[i]);
        }
        d
    }

    #[inline]
    fn scale(&self, x: N) -> N {
        x.abs()
    }
}

/// The squared Euclidean metric.
///
/// Distances, radii and error ratios are all squared: a radius of 2.5 is passed as
/// `L2Squared.scale(2.5) == 6.25`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L2Squared;

impl<N: IndexableNum> Metric<N> for L2Squared {
    #[inline]
    fn dist(&self, a: &[N], b: &[N]) -> N {
        a.iter().zip(b).fold(N::zero(), |acc, (&x, &y)| {
            let d = x - y;
            acc + d * d
        })
    }

    #[inline]
    fn dist_to_box(&self, point: &[N], min: &[N], max: &[N]) -> N {
        let mut d = N::zero();
        for i in 0..point.len() {
            let v = axis_dist(point[i], min[i], max[i]);
            d = d + v * v;
        }
        d
    }

    #[inline]
    fn scale(&self, x: N) -> N {
        x * x
    }
}

/// The Chebyshev (L∞) metric: the largest absolute coordinate difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Chebyshev;

impl<N: IndexableNum> Metric<N> for Chebyshev {
    #[inline]
    fn dist(&self, a: &[N], b: &[N]) -> N {
        a.iter()
            .zip(b)
            .fold(N::zero(), |acc, (&x, &y)| acc.max((x - y).abs()))
    }

    #[inline]
    fn dist_to_box(&self, point: &[N], min: &[N], max: &[N]) -> N {
        let mut d = N::zero();
        for i in 0..point.len() {
            d = d.max(axis_dist(point[i], min[i], max[i]));
        }
        d
    }

    #[inline]
    fn scale(&self, x: N) -> N {
        x.abs()
    }
}

/// A metric chosen at runtime.
///
/// Useful when the metric comes from configuration rather than from a type parameter. Dispatch
/// is a single `match` per call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetricKind {
    /// See [`L1`].
    L1,
    /// See [`L2Squared`].
    #[default]
    L2Squared,
    /// See [`Chebyshev`].
    Chebyshev,
}

impl<N: IndexableNum> Metric<N> for MetricKind {
    #[inline]
    fn dist(&self, a: &[N], b: &[N]) -> N {
        match self {
            Self::L1 => L1.dist(a, b),
            Self::L2Squared => L2Squared.dist(a, b),
            Self::Chebyshev => Chebyshev.dist(a, b),
        }
    }

    #[inline]
    fn dist_to_box(&self, point: &[N], min: &[N], max: &[N]) -> N {
        match self {
            Self::L1 => L1.dist_to_box(point, min, max),
            Self::L2Squared => L2Squared.dist_to_box(point, min, max),
            Self::Chebyshev => Chebyshev.dist_to_box(point, min, max),
        }
    }

    #[inline]
    fn scale(&self, x: N) -> N {
        match self {
            Self::L1 => <L1 as Metric<N>>::scale(&L1, x),
            Self::L2Squared => <L2Squared as Metric<N>>::scale(&L2Squared, x),
            Self::Chebyshev => <Chebyshev as Metric<N>>::scale(&Chebyshev, x),
        }
    }
}

/// 1D distance from a value to a range.
#[inline]
pub(crate) fn axis_dist<N: IndexableNum>(k: N, min: N, max: N) -> N {
    if k < min {
        min - k
    } else if k <= max {
        N::zero()
    } else {
        k - max
    }
}
