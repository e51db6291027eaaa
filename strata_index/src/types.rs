// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle and scalar types shared by the index and its backends.

use core::fmt::Debug;

/// Axis-aligned bounding box in 2D, stored as min/max corners.
///
/// Edges are inclusive: two boxes that only share a border overlap, and a
/// degenerate box (zero width or height) still overlaps anything crossing it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb2D<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (top)
    pub min_y: T,
    /// Maximum x (right)
    pub max_x: T,
    /// Maximum y (bottom)
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new AABB from min/max corners.
    #[inline(always)]
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Whether this AABB contains the point (edges included).
    #[inline]
    pub fn contains_point(&self, x: T, y: T) -> bool {
        self.min_x <= x && self.min_y <= y && x <= self.max_x && y <= self.max_y
    }

    /// Whether this AABB overlaps `other`, counting shared edges and corners.
    ///
    /// ```
    /// use strata_index::Aabb2D;
    ///
    /// let a = Aabb2D::new(0.0, 0.0, 10.0, 10.0);
    /// assert!(a.overlaps(&Aabb2D::new(10.0, 0.0, 20.0, 10.0)));
    /// assert!(!a.overlaps(&Aabb2D::new(11.0, 0.0, 20.0, 10.0)));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// Create an AABB from an origin and a size, the `(x, y, w, h)` form used
    /// by shape bounding rectangles.
    #[inline]
    pub fn from_xywh(x: T, y: T, w: T, h: T) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: T::add(x, w),
            max_y: T::add(y, h),
        }
    }

    /// A box of unit size anchored at `(x, y)`, used to promote points to rectangles.
    #[inline]
    pub fn unit_at(x: T, y: T) -> Self {
        Self::from_xywh(x, y, T::one(), T::one())
    }
}

/// Numeric coordinate type accepted by the index.
///
/// Floating-point implementations assume finite values; NaN coordinates make
/// every comparison false and such boxes are never found.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Add two scalar values.
    fn add(a: Self, b: Self) -> Self;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// One unit, the side of a promoted point.
    fn one() -> Self;
}

macro_rules! float_scalar {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            #[inline]
            fn add(a: Self, b: Self) -> Self {
                a + b
            }

            #[inline(always)]
            fn zero() -> Self {
                0.0
            }

            #[inline(always)]
            fn one() -> Self {
                1.0
            }
        }
    )*};
}

float_scalar!(f32, f64);

impl Scalar for i64 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a.saturating_add(b)
    }

    #[inline(always)]
    fn zero() -> Self {
        0
    }

    #[inline(always)]
    fn one() -> Self {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2D;

    #[test]
    fn degenerate_boxes_still_overlap() {
        // A horizontal segment's box has zero height.
        let seg = Aabb2D::<f64>::from_xywh(0.0, 5.0, 10.0, 0.0);
        let probe = Aabb2D::from_xywh(4.0, 4.0, 2.0, 2.0);
        assert!(seg.overlaps(&probe));
        assert!(probe.overlaps(&seg));

        let below = Aabb2D::from_xywh(4.0, 6.5, 2.0, 2.0);
        assert!(!seg.overlaps(&below));
    }

    #[test]
    fn unit_box_contains_its_anchor() {
        let b = Aabb2D::<i64>::unit_at(-3, 7);
        assert!(b.contains_point(-3, 7));
        assert!(b.contains_point(-2, 8));
        assert!(!b.contains_point(-4, 7));
    }

    #[test]
    fn saturating_integer_extent() {
        let b = Aabb2D::<i64>::from_xywh(i64::MAX - 1, 0, 10, 1);
        assert_eq!(b.max_x, i64::MAX);
    }
}
