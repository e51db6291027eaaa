// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Infinite lines and the small point helpers the intersection tests share.

use kurbo::{Point, Vec2};

/// Below this `|sin θ|` two directions count as parallel.
const PARALLEL_EPSILON: f64 = 1e-10;

/// An infinite line through `anchor` along a unit `direction`.
///
/// A line built from two equal points has a zero direction. It has no unique
/// intersection with anything and its closest point to any query is the anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfiniteLine {
    /// A point on the line.
    pub anchor: Point,
    /// Unit direction, or zero for a degenerate line.
    pub direction: Vec2,
}

impl InfiniteLine {
    /// Line through `anchor` along `direction` (normalized here).
    pub fn new(anchor: Point, direction: Vec2) -> Self {
        let len = direction.hypot();
        let direction = if len > 0.0 { direction / len } else { Vec2::ZERO };
        Self { anchor, direction }
    }

    /// Line through `a` and `b`, directed from `a` to `b`.
    pub fn through(a: Point, b: Point) -> Self {
        Self::new(a, b - a)
    }

    /// The unique crossing point with `other`, or `None` for parallel,
    /// coincident or degenerate lines.
    pub fn intersection(&self, other: &Self) -> Option<Point> {
        let denom = self.direction.cross(other.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (other.anchor - self.anchor).cross(other.direction) / denom;
        Some(self.anchor + self.direction * t)
    }

    /// Orthogonal projection of `p` onto the line.
    pub fn closest_point(&self, p: Point) -> Point {
        let t = (p - self.anchor).dot(self.direction);
        self.anchor + self.direction * t
    }

    /// Perpendicular distance from `p` to the line.
    pub fn distance_from(&self, p: Point) -> f64 {
        self.closest_point(p).distance(p)
    }
}

/// Round both coordinates to the nearest multiple of `grid`.
///
/// Computed crossings on axis-aligned edges come out a few ulps off the edge;
/// snapping puts them back so the span checks in [`within_span`] hold.
/// A non-positive `grid` leaves the point untouched.
pub fn snap(p: Point, grid: f64) -> Point {
    if grid <= 0.0 {
        return p;
    }
    // Scale by the inverse so integral inputs survive unchanged.
    let scale = (1.0 / grid).round();
    if scale < 1.0 {
        return p;
    }
    Point::new((p.x * scale).round() / scale, (p.y * scale).round() / scale)
}

/// Whether `p` lies inside the axis-aligned box spanned by `a` and `b`,
/// grown by `slack` on every side (inclusive).
///
/// Rotated endpoints carry float noise of their own, so a crossing snapped
/// onto the grid needs `slack` of about one grid step to stay on its edge.
pub fn within_span(p: Point, a: Point, b: Point, slack: f64) -> bool {
    p.x >= a.x.min(b.x) - slack
        && p.x <= a.x.max(b.x) + slack
        && p.y >= a.y.min(b.y) - slack
        && p.y <= a.y.max(b.y) + slack
}
