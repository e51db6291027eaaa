// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canonical shapes and the normalization pipeline that builds them.

use kurbo::{Affine, Point, Rect, Size};

use crate::GeometryError;
use crate::input::{Rotation, ShapeSpec};
use crate::line::InfiniteLine;

/// Identifier attached to shapes that belong to a stored record.
pub type ShapeId = u64;

/// Canonical shape kinds, declared in rank order.
///
/// The derived ordering is the dispatch rank: intersection tests always see
/// the lower-ranked shape first, so one test covers each unordered pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeKind {
    /// A single point.
    Point,
    /// A thin segment between two points.
    LineSegment,
    /// A closed polygon (rects and wide segments included).
    Polygon,
    /// A circle (center plus radius).
    Circle,
}

/// A directed segment between two adjacent canonical points.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
    /// The infinite line carrying the edge.
    pub line: InfiniteLine,
}

impl Edge {
    /// Edge from `start` to `end`.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            line: InfiniteLine::through(start, end),
        }
    }
}

/// A normalized shape, ready for indexing and exact tests.
///
/// Built only by [`normalize`], so the per-kind layout always holds: points
/// have one point, segments two points and one edge, polygons three or more
/// points with a closing edge, circles one point (the center) and a radius.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CanonicalShape {
    id: Option<ShapeId>,
    kind: ShapeKind,
    points: Vec<Point>,
    edges: Vec<Edge>,
    center: Point,
    bounding_rect: Rect,
    radius: f64,
    rotated: bool,
}

impl CanonicalShape {
    /// Record id, when the shape belongs to a stored record.
    pub fn id(&self) -> Option<ShapeId> {
        self.id
    }

    /// The same shape tagged with a record id.
    #[must_use]
    pub fn with_id(mut self, id: ShapeId) -> Self {
        self.id = Some(id);
        self
    }

    /// Canonical kind.
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Ordered points after rotation.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Edges between adjacent points, including the closing edge of polygons.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Center point after rotation.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Axis-aligned bounding rectangle used for index prefiltering.
    pub fn bounding_rect(&self) -> Rect {
        self.bounding_rect
    }

    /// Radius, for circles only.
    pub fn radius(&self) -> Option<f64> {
        (self.kind == ShapeKind::Circle).then_some(self.radius)
    }

    /// Whether a rotation was applied.
    pub fn rotated(&self) -> bool {
        self.rotated
    }

    pub(crate) fn first_point(&self) -> Point {
        self.points[0]
    }

    pub(crate) fn first_edge(&self) -> &Edge {
        &self.edges[0]
    }

    pub(crate) fn raw_radius(&self) -> f64 {
        self.radius
    }
}

/// Normalize a raw shape into its canonical form.
///
/// Pure and deterministic. Rotation is applied before edges and the bounding
/// rectangle are derived, so both always describe the final geometry.
///
/// ```
/// use strata_geometry::{normalize, Rotation, ShapeKind, ShapeSpec};
///
/// let rect = ShapeSpec::Rect { x: 0.0, y: 0.0, w: 4.0, h: 2.0 };
/// let shape = normalize(&rect, None).unwrap();
/// assert_eq!(shape.kind(), ShapeKind::Polygon);
/// assert_eq!(shape.edges().len(), 4);
///
/// let turned = normalize(&rect, Some(&Rotation::about_center(std::f64::consts::FRAC_PI_2))).unwrap();
/// assert!(turned.rotated());
/// assert!((turned.bounding_rect().width() - 2.0).abs() < 1e-9);
/// ```
pub fn normalize(
    spec: &ShapeSpec,
    rotation: Option<&Rotation>,
) -> Result<CanonicalShape, GeometryError> {
    spec.validate()?;
    if let Some(rot) = rotation {
        rot.validate()?;
    }

    let mut radius = 0.0;
    let (kind, mut points, mut center) = match spec {
        ShapeSpec::Point { x, y } => {
            let p = Point::new(*x, *y);
            (ShapeKind::Point, vec![p], p)
        }
        ShapeSpec::LineSeg {
            p1,
            p2,
            width,
            enclose_ends,
        } => match width {
            Some(w) if *w > 1.0 => (
                ShapeKind::Polygon,
                wide_segment_corners(*p1, *p2, *w, *enclose_ends),
                p1.midpoint(*p2),
            ),
            _ => (ShapeKind::LineSegment, vec![*p1, *p2], p1.midpoint(*p2)),
        },
        ShapeSpec::Rect { x, y, w, h } => (
            ShapeKind::Polygon,
            vec![
                Point::new(*x, *y),
                Point::new(x + w, *y),
                Point::new(x + w, y + h),
                Point::new(*x, y + h),
            ],
            Point::new(x + w / 2.0, y + h / 2.0),
        ),
        ShapeSpec::Polygon { points } => (ShapeKind::Polygon, points.clone(), vertex_mean(points)),
        ShapeSpec::Circle { x, y, r } => {
            radius = *r;
            let c = Point::new(*x, *y);
            (ShapeKind::Circle, vec![c], c)
        }
    };

    let rotated = match rotation {
        Some(rot) => {
            let turn = Affine::rotate_about(rot.angle, rot.pivot.unwrap_or(center));
            center = turn * center;
            for p in &mut points {
                *p = turn * *p;
            }
            true
        }
        None => false,
    };

    let edges = edges_for(&points);
    let bounding_rect = match kind {
        ShapeKind::Point => Rect::from_origin_size(points[0], Size::new(1.0, 1.0)),
        ShapeKind::LineSegment => Rect::from_points(points[0], points[1]),
        ShapeKind::Polygon => points_bounds(&points),
        ShapeKind::Circle => Rect::from_center_size(center, Size::new(2.0 * radius, 2.0 * radius)),
    };

    Ok(CanonicalShape {
        id: None,
        kind,
        points,
        edges,
        center,
        bounding_rect,
        radius,
        rotated,
    })
}

/// Rectangle around a wide segment, turned to the segment's heading.
fn wide_segment_corners(p1: Point, p2: Point, width: f64, enclose_ends: bool) -> Vec<Point> {
    let mut length = p1.distance(p2);
    if enclose_ends {
        length += width;
    }
    let center = p1.midpoint(p2);
    let x = center.x - length / 2.0;
    let y = center.y - width / 2.0;
    let turn = Affine::rotate_about((p2 - p1).atan2(), center);
    [
        Point::new(x, y),
        Point::new(x + length, y),
        Point::new(x + length, y + width),
        Point::new(x, y + width),
    ]
    .into_iter()
    .map(|p| turn * p)
    .collect()
}

fn vertex_mean(points: &[Point]) -> Point {
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// Edges between consecutive points; closed with a wrap-around edge when
/// there are more than two points.
fn edges_for(points: &[Point]) -> Vec<Edge> {
    match points.len() {
        0 | 1 => Vec::new(),
        2 => vec![Edge::new(points[0], points[1])],
        n => (0..n)
            .map(|i| Edge::new(points[i], points[(i + 1) % n]))
            .collect(),
    }
}

/// Min/max box over all points, seeded from the first one.
fn points_bounds(points: &[Point]) -> Rect {
    let first = Rect::from_origin_size(points[0], Size::ZERO);
    points[1..]
        .iter()
        .fold(first, |acc, p| acc.union_pt(*p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn point_gets_unit_box() {
        let s = normalize(&ShapeSpec::Point { x: 3.0, y: -2.0 }, None).unwrap();
        assert_eq!(s.kind(), ShapeKind::Point);
        assert!(s.edges().is_empty());
        assert_eq!(s.bounding_rect(), Rect::new(3.0, -2.0, 4.0, -1.0));
    }

    #[test]
    fn thin_segment_stays_segment() {
        let spec = ShapeSpec::LineSeg {
            p1: Point::new(10.0, 0.0),
            p2: Point::new(0.0, 4.0),
            width: Some(1.0),
            enclose_ends: false,
        };
        let s = normalize(&spec, None).unwrap();
        assert_eq!(s.kind(), ShapeKind::LineSegment);
        assert_eq!(s.edges().len(), 1);
        assert_eq!(s.center(), Point::new(5.0, 2.0));
        assert_eq!(s.bounding_rect(), Rect::new(0.0, 0.0, 10.0, 4.0));
    }

    #[test]
    fn wide_segment_becomes_rotated_rectangle() {
        let spec = ShapeSpec::LineSeg {
            p1: Point::new(0.0, 0.0),
            p2: Point::new(0.0, 10.0),
            width: Some(4.0),
            enclose_ends: false,
        };
        let s = normalize(&spec, None).unwrap();
        assert_eq!(s.kind(), ShapeKind::Polygon);
        assert_eq!(s.points().len(), 4);
        assert_eq!(s.edges().len(), 4);
        // A vertical segment of length 10 and width 4 covers x in [-2, 2].
        let r = s.bounding_rect();
        assert!((r.x0 + 2.0).abs() < 1e-9 && (r.x1 - 2.0).abs() < 1e-9);
        assert!(r.y0.abs() < 1e-9 && (r.y1 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn enclosed_ends_extend_the_rectangle() {
        let spec = ShapeSpec::LineSeg {
            p1: Point::new(0.0, 0.0),
            p2: Point::new(10.0, 0.0),
            width: Some(2.0),
            enclose_ends: true,
        };
        let r = normalize(&spec, None).unwrap().bounding_rect();
        assert!((r.x0 + 1.0).abs() < 1e-9 && (r.x1 - 11.0).abs() < 1e-9);
        assert!((r.height() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn polygon_center_is_vertex_mean() {
        let s = normalize(
            &ShapeSpec::polygon([(0.0, 0.0), (6.0, 0.0), (6.0, 6.0), (0.0, 6.0)]),
            None,
        )
        .unwrap();
        assert_eq!(s.center(), Point::new(3.0, 3.0));
    }

    #[test]
    fn polygon_bounds_ignore_origin() {
        let s = normalize(
            &ShapeSpec::polygon([(50.0, 60.0), (70.0, 60.0), (60.0, 80.0)]),
            None,
        )
        .unwrap();
        assert_eq!(s.bounding_rect(), Rect::new(50.0, 60.0, 70.0, 80.0));
    }

    #[test]
    fn circle_box_is_centered() {
        let s = normalize(
            &ShapeSpec::Circle {
                x: 5.0,
                y: 5.0,
                r: 2.0,
            },
            None,
        )
        .unwrap();
        assert_eq!(s.radius(), Some(2.0));
        assert_eq!(s.bounding_rect(), Rect::new(3.0, 3.0, 7.0, 7.0));
    }

    #[test]
    fn rotation_about_explicit_pivot_moves_center() {
        let s = normalize(
            &ShapeSpec::Point { x: 1.0, y: 0.0 },
            Some(&Rotation::about(FRAC_PI_2, (0.0, 0.0))),
        )
        .unwrap();
        assert!(s.rotated());
        assert!(close(s.points()[0], Point::new(0.0, 1.0)));
        assert!(close(s.center(), Point::new(0.0, 1.0)));
        assert!(close(s.bounding_rect().origin(), Point::new(0.0, 1.0)));
    }

    #[test]
    fn rotation_about_own_center_keeps_center() {
        let s = normalize(
            &ShapeSpec::Rect {
                x: 0.0,
                y: 0.0,
                w: 10.0,
                h: 2.0,
            },
            Some(&Rotation::about_center(FRAC_PI_2)),
        )
        .unwrap();
        assert!(close(s.center(), Point::new(5.0, 1.0)));
        let r = s.bounding_rect();
        assert!((r.width() - 2.0).abs() < 1e-9);
        assert!((r.height() - 10.0).abs() < 1e-9);
        // Edges were rebuilt from the rotated points.
        assert!(close(s.edges()[0].start, s.points()[0]));
    }

    #[test]
    fn normalization_is_deterministic() {
        let spec = ShapeSpec::polygon([(0.0, 0.0), (3.0, 1.0), (1.0, 4.0)]);
        let rot = Rotation::about(0.3, (2.0, 2.0));
        assert_eq!(
            normalize(&spec, Some(&rot)).unwrap(),
            normalize(&spec, Some(&rot)).unwrap()
        );
    }
}
