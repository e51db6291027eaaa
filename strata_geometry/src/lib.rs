// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strata Geometry: shape normalization and exact pairwise intersection tests.
//!
//! Callers describe shapes with [`ShapeSpec`] (points, segments with optional
//! stroke width, rectangles, polygons, circles) plus an optional [`Rotation`].
//! [`normalize`] turns that into a [`CanonicalShape`] of one of four kinds:
//!
//! - [`ShapeKind::Point`]: one point.
//! - [`ShapeKind::LineSegment`]: two points and a single edge.
//! - [`ShapeKind::Polygon`]: three or more points, closed by a wrap-around edge.
//!   Rectangles and wide segments end up here.
//! - [`ShapeKind::Circle`]: a center and a radius.
//!
//! Every canonical shape carries an axis-aligned bounding rectangle computed
//! after rotation, suitable for a broad-phase index such as `strata_index`.
//! [`test`] then decides whether two canonical shapes really intersect and
//! reports the crossing points it found.
//!
//! # Example
//!
//! ```rust
//! use strata_geometry::{normalize, test, ShapeSpec};
//!
//! let square = normalize(&ShapeSpec::Rect { x: 0.0, y: 0.0, w: 10.0, h: 10.0 }, None).unwrap();
//! let probe = normalize(&ShapeSpec::segment((-5.0, 5.0), (5.0, 5.0)), None).unwrap();
//!
//! let result = test(&square, &probe).unwrap();
//! assert!(result.success);
//! assert_eq!(result.points, vec![kurbo::Point::new(0.0, 5.0)]);
//! ```
//!
//! Tolerances for the tests live in [`TestParams`]; [`test_with`] and
//! [`IntersectionEngine`] take them explicitly.

mod error;
mod input;
mod intersect;
mod line;
mod shape;

pub use error::GeometryError;
pub use input::{InputKind, Rotation, ShapeSpec};
pub use intersect::{IntersectionEngine, IntersectionResult, TestParams, test, test_with};
pub use line::{InfiniteLine, snap, within_span};
pub use shape::{CanonicalShape, Edge, ShapeId, ShapeKind, normalize};
