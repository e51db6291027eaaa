// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exact pairwise intersection tests between canonical shapes.
//!
//! Operands are put in rank order first ([`ShapeKind`] declares the ranks), so
//! each unordered pair of kinds has exactly one test. A miss is an ordinary
//! [`IntersectionResult`], never an error.

use kurbo::{Point, Vec2};

use crate::GeometryError;
use crate::line::{InfiniteLine, snap, within_span};
use crate::shape::{CanonicalShape, Edge, ShapeKind};

/// Tolerances used by the exact tests.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TestParams {
    /// Maximum distance between a point and a segment's line for a hit.
    pub line_tolerance: f64,
    /// Ray-cast crossings closer than this are counted once.
    ///
    /// A ray through a shared vertex crosses both adjacent edges at the same
    /// spot; without merging, the vertex would flip the parity twice.
    pub vertex_merge: f64,
    /// Grid that computed crossing points are rounded to before span checks.
    /// Zero disables rounding.
    pub snap: f64,
}

impl Default for TestParams {
    fn default() -> Self {
        Self {
            line_tolerance: 1.0,
            vertex_merge: 0.01,
            snap: 1e-6,
        }
    }
}

/// Outcome of one pairwise test.
///
/// `points` lists the crossing points found, which may be empty even for a hit
/// (one shape enclosing the other, concentric circles).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntersectionResult {
    /// Whether the shapes intersect.
    pub success: bool,
    /// Crossing points, in discovery order.
    pub points: Vec<Point>,
}

impl IntersectionResult {
    /// A miss.
    pub fn miss() -> Self {
        Self::default()
    }

    /// A hit with the given crossing points.
    pub fn hit(points: Vec<Point>) -> Self {
        Self {
            success: true,
            points,
        }
    }

    fn from_bool(success: bool, points: impl FnOnce() -> Vec<Point>) -> Self {
        if success { Self::hit(points()) } else { Self::miss() }
    }
}

/// Stateless dispatcher over the pairwise tests, carrying its tolerances.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IntersectionEngine {
    params: TestParams,
}

impl IntersectionEngine {
    /// Engine with explicit tolerances.
    pub const fn new(params: TestParams) -> Self {
        Self { params }
    }

    /// The tolerances in use.
    pub fn params(&self) -> &TestParams {
        &self.params
    }

    /// Test two canonical shapes for intersection.
    ///
    /// ```
    /// use strata_geometry::{normalize, IntersectionEngine, ShapeSpec};
    ///
    /// let seg = normalize(&ShapeSpec::segment((0.0, 0.0), (10.0, 0.0)), None).unwrap();
    /// let circle = normalize(&ShapeSpec::Circle { x: 5.0, y: 0.0, r: 2.0 }, None).unwrap();
    /// let result = IntersectionEngine::default().test(&circle, &seg).unwrap();
    /// assert!(result.success);
    /// assert_eq!(result.points.len(), 2);
    /// ```
    pub fn test(
        &self,
        a: &CanonicalShape,
        b: &CanonicalShape,
    ) -> Result<IntersectionResult, GeometryError> {
        let (lo, hi) = if a.kind() > b.kind() { (b, a) } else { (a, b) };
        let p = &self.params;
        let result = match (lo.kind(), hi.kind()) {
            (ShapeKind::Point, ShapeKind::Point) => point_point(lo.first_point(), hi.first_point()),
            (ShapeKind::Point, ShapeKind::LineSegment) => {
                point_segment(lo.first_point(), hi.first_edge(), p)
            }
            (ShapeKind::Point, ShapeKind::Polygon) => {
                let pt = lo.first_point();
                IntersectionResult::from_bool(point_in_polygon(pt, hi, p), || vec![pt])
            }
            (ShapeKind::Point, ShapeKind::Circle) => {
                let pt = lo.first_point();
                let inside = pt.distance(hi.center()) <= hi.raw_radius();
                IntersectionResult::from_bool(inside, || vec![pt])
            }
            (ShapeKind::LineSegment, ShapeKind::LineSegment) => {
                let crossing = segment_segment(lo.first_edge(), hi.first_edge(), p);
                IntersectionResult::from_bool(crossing.is_some(), || crossing.into_iter().collect())
            }
            (ShapeKind::LineSegment, ShapeKind::Polygon) => segment_polygon(lo.first_edge(), hi, p),
            (ShapeKind::LineSegment, ShapeKind::Circle) => {
                segment_circle(lo.first_edge(), hi.center(), hi.raw_radius(), p)
            }
            (ShapeKind::Polygon, ShapeKind::Polygon) => polygon_polygon(lo, hi, p),
            (ShapeKind::Polygon, ShapeKind::Circle) => polygon_circle(lo, hi, p),
            (ShapeKind::Circle, ShapeKind::Circle) => circle_circle(lo, hi, p),
            (a, b) => return Err(GeometryError::UnsupportedIntersection { a, b }),
        };
        Ok(result)
    }
}

/// Test two shapes with the default tolerances.
pub fn test(a: &CanonicalShape, b: &CanonicalShape) -> Result<IntersectionResult, GeometryError> {
    IntersectionEngine::default().test(a, b)
}

/// Test two shapes with explicit tolerances.
pub fn test_with(
    a: &CanonicalShape,
    b: &CanonicalShape,
    params: &TestParams,
) -> Result<IntersectionResult, GeometryError> {
    IntersectionEngine::new(*params).test(a, b)
}

fn point_point(a: Point, b: Point) -> IntersectionResult {
    IntersectionResult::from_bool(a == b, || vec![a])
}

fn point_segment(pt: Point, edge: &Edge, p: &TestParams) -> IntersectionResult {
    let near_line = edge.line.distance_from(pt) <= p.line_tolerance;
    let on_segment = near_line && within_span(pt, edge.start, edge.end, p.snap);
    IntersectionResult::from_bool(on_segment, || vec![pt])
}

/// A ray crossing, with the side of the ray the edge leaves towards when the
/// crossing sits on one of its vertices.
struct RayCrossing {
    at: Point,
    above: Option<bool>,
}

/// Even-odd ray cast from just left of the polygon towards `pt`.
///
/// Crossings within `vertex_merge` of each other count once, unless both sit
/// on a vertex whose edges stay on the same side of the ray: an apex that
/// only touches the ray counts twice and leaves the parity alone.
fn point_in_polygon(pt: Point, poly: &CanonicalShape, p: &TestParams) -> bool {
    let anchor = Point::new(poly.bounding_rect().x0 - 1.0, pt.y);
    let ray = InfiniteLine::through(anchor, Point::new(anchor.x + 1.0, pt.y));
    let mut crossings: Vec<RayCrossing> = Vec::new();
    for edge in poly.edges() {
        let Some(hit) = ray.intersection(&edge.line) else {
            continue;
        };
        let hit = snap(hit, p.snap);
        if hit.x > pt.x || !within_span(hit, edge.start, edge.end, p.snap) {
            continue;
        }
        let far = if hit.distance(edge.start) < p.vertex_merge {
            Some(edge.end)
        } else if hit.distance(edge.end) < p.vertex_merge {
            Some(edge.start)
        } else {
            None
        };
        let above = far.map(|f| f.y > pt.y);
        let merged = crossings.iter().any(|c| {
            let touching = matches!((c.above, above), (Some(x), Some(y)) if x == y);
            c.at.distance(hit) < p.vertex_merge && !touching
        });
        if !merged {
            crossings.push(RayCrossing { at: hit, above });
        }
    }
    crossings.len() % 2 == 1
}

fn segment_segment(a: &Edge, b: &Edge, p: &TestParams) -> Option<Point> {
    let hit = snap(a.line.intersection(&b.line)?, p.snap);
    (within_span(hit, a.start, a.end, p.snap) && within_span(hit, b.start, b.end, p.snap))
        .then_some(hit)
}

fn segment_polygon(edge: &Edge, poly: &CanonicalShape, p: &TestParams) -> IntersectionResult {
    let points: Vec<Point> = poly
        .edges()
        .iter()
        .filter_map(|side| segment_segment(edge, side, p))
        .collect();
    if !points.is_empty() {
        return IntersectionResult::hit(points);
    }
    // Segment entirely inside the polygon.
    let inside = point_in_polygon(edge.start, poly, p) || point_in_polygon(edge.end, poly, p);
    IntersectionResult::from_bool(inside, Vec::new)
}

fn segment_circle(edge: &Edge, center: Point, radius: f64, p: &TestParams) -> IntersectionResult {
    let foot = edge.line.closest_point(center);
    let perpendicular = foot.distance(center);
    let foot = snap(foot, p.snap);

    // Distance from the center to the segment itself, not its line.
    let gap = if within_span(foot, edge.start, edge.end, p.snap) {
        perpendicular
    } else {
        center.distance(edge.start).min(center.distance(edge.end))
    };
    if gap > radius {
        return IntersectionResult::miss();
    }

    let half_chord = (radius * radius - perpendicular * perpendicular).max(0.0).sqrt();
    let offset = edge.line.direction * half_chord;
    let mut points = Vec::with_capacity(2);
    for candidate in [foot + offset, foot - offset] {
        let candidate = snap(candidate, p.snap);
        if within_span(candidate, edge.start, edge.end, p.snap) && !points.contains(&candidate) {
            points.push(candidate);
        }
    }
    IntersectionResult::hit(points)
}

fn polygon_polygon(a: &CanonicalShape, b: &CanonicalShape, p: &TestParams) -> IntersectionResult {
    let mut success = false;
    let mut points = Vec::new();
    for edge in a.edges() {
        let r = segment_polygon(edge, b, p);
        if r.success {
            success = true;
            points.extend(r.points);
        }
    }
    // `b` wholly inside `a` never touches an edge of `a`.
    if !success {
        success = b.points().iter().any(|v| point_in_polygon(*v, a, p));
    }
    IntersectionResult::from_bool(success, || points)
}

fn polygon_circle(poly: &CanonicalShape, circle: &CanonicalShape, p: &TestParams) -> IntersectionResult {
    let mut success = false;
    let mut points = Vec::new();
    for edge in poly.edges() {
        let r = segment_circle(edge, circle.center(), circle.raw_radius(), p);
        if r.success {
            success = true;
            points.extend(r.points);
        }
    }
    if !success {
        success = point_in_polygon(circle.center(), poly, p);
    }
    IntersectionResult::from_bool(success, || points)
}

fn circle_circle(a: &CanonicalShape, b: &CanonicalShape, p: &TestParams) -> IntersectionResult {
    let (ca, ra) = (a.center(), a.raw_radius());
    let (cb, rb) = (b.center(), b.raw_radius());
    let dist = ca.distance(cb);
    if dist > ra + rb {
        return IntersectionResult::miss();
    }
    // Concentric: one disk holds the other, boundaries meet nowhere or everywhere.
    if dist <= p.snap.max(f64::EPSILON) {
        return IntersectionResult::hit(Vec::new());
    }

    let dir = (cb - ca) / dist;
    // Offset of the chord midpoint from b's center, back towards a.
    let d = (dist * dist - ra * ra + rb * rb) / (2.0 * dist);
    if d.abs() >= rb {
        return IntersectionResult::hit(Vec::new());
    }
    let mid = cb - dir * d;
    let half_chord = (ra * ra - (mid - ca).hypot2()).max(0.0).sqrt();
    let across = Vec2::new(-dir.y, dir.x) * half_chord;
    IntersectionResult::hit(vec![
        snap(mid + across, p.snap),
        snap(mid - across, p.snap),
    ])
}
