use std::fmt::Debug;

use num_traits::Float;

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Only `f32` and `f64` are
/// supported: the search algorithms rely on `+inf` as the "no neighbor yet" distance and on
/// floating point midpoints when splitting.
pub trait IndexableNum:
    private::Sealed + Float + Default + Debug + Send + Sync + bytemuck::Pod
{
    /// Half of the sum of `a` and `b`, computed without overflowing to infinity.
    #[inline]
    fn halfway(a: Self, b: Self) -> Self {
        let two = Self::one() + Self::one();
        let mid = a / two + b / two;
        // Rounding can push the midpoint just outside of [a, b]
        if mid < a {
            a
        } else if mid > b {
            b
        } else {
            mid
        }
    }
}

impl IndexableNum for f32 {}

impl IndexableNum for f64 {}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

#[cfg(test)]
mod test {
    use super::IndexableNum;

    #[test]
    fn halfway_stays_in_range() {
        assert_eq!(<f64 as IndexableNum>::halfway(2.0, 4.0), 3.0);
        assert_eq!(<f32 as IndexableNum>::halfway(f32::MAX, f32::MAX), f32::MAX);
        let a = 1.0f64;
        let b = f64::from_bits(a.to_bits() + 1);
        let m = <f64 as IndexableNum>::halfway(a, b);
        assert!(m >= a && m <= b);
    }
}
