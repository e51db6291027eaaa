// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw shape descriptions as supplied by callers, before normalization.

use core::fmt;
use core::str::FromStr;

use kurbo::Point;

use crate::GeometryError;

/// The input kinds a record can be tagged with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// `point`
    Point,
    /// `lineseg`
    LineSeg,
    /// `rect`
    Rect,
    /// `polygon`
    Polygon,
    /// `circle`
    Circle,
}

impl InputKind {
    /// The tag used in serialized records.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::LineSeg => "lineseg",
            Self::Rect => "rect",
            Self::Polygon => "polygon",
            Self::Circle => "circle",
        }
    }

    /// Field names the serialized form of this kind owns, besides the tag.
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Point => &["x", "y"],
            Self::LineSeg => &["p1", "p2", "w", "encloseEnds"],
            Self::Rect => &["x", "y", "w", "h"],
            Self::Polygon => &["points"],
            Self::Circle => &["x", "y", "r"],
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InputKind {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "point" => Ok(Self::Point),
            "lineseg" => Ok(Self::LineSeg),
            "rect" => Ok(Self::Rect),
            "polygon" => Ok(Self::Polygon),
            "circle" => Ok(Self::Circle),
            other => Err(GeometryError::UnsupportedShapeKind(other.into())),
        }
    }
}

/// A raw shape as a caller describes it.
///
/// Serialized form is tagged by `"type"`, e.g.
/// `{"type": "lineseg", "p1": {"x": 0, "y": 0}, "p2": {"x": 5, "y": 0}, "w": 3}`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum ShapeSpec {
    /// A single point.
    Point {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },
    /// A line segment, optionally with a stroke width.
    ///
    /// Widths above 1 turn the segment into a rectangle polygon.
    LineSeg {
        /// First endpoint.
        p1: Point,
        /// Second endpoint.
        p2: Point,
        /// Stroke width.
        #[cfg_attr(
            feature = "serde",
            serde(default, rename = "w", skip_serializing_if = "Option::is_none")
        )]
        width: Option<f64>,
        /// Extend the rectangle by half the width past each endpoint.
        #[cfg_attr(feature = "serde", serde(default, rename = "encloseEnds"))]
        enclose_ends: bool,
    },
    /// Axis-aligned rectangle from origin and size.
    Rect {
        /// Left.
        x: f64,
        /// Top.
        y: f64,
        /// Width.
        w: f64,
        /// Height.
        h: f64,
    },
    /// Closed polygon through the given vertices.
    Polygon {
        /// Vertices in order; the closing edge is implicit.
        points: Vec<Point>,
    },
    /// Circle from center and radius.
    Circle {
        /// Center x.
        x: f64,
        /// Center y.
        y: f64,
        /// Radius.
        r: f64,
    },
}

impl ShapeSpec {
    /// Convenience constructor for a thin segment.
    pub fn segment(p1: impl Into<Point>, p2: impl Into<Point>) -> Self {
        Self::LineSeg {
            p1: p1.into(),
            p2: p2.into(),
            width: None,
            enclose_ends: false,
        }
    }

    /// Convenience constructor for a polygon.
    pub fn polygon<P: Into<Point>>(points: impl IntoIterator<Item = P>) -> Self {
        Self::Polygon {
            points: points.into_iter().map(Into::into).collect(),
        }
    }

    /// The input kind this spec is tagged with.
    pub fn input_kind(&self) -> InputKind {
        match self {
            Self::Point { .. } => InputKind::Point,
            Self::LineSeg { .. } => InputKind::LineSeg,
            Self::Rect { .. } => InputKind::Rect,
            Self::Polygon { .. } => InputKind::Polygon,
            Self::Circle { .. } => InputKind::Circle,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), GeometryError> {
        fn finite(values: &[f64], what: &'static str) -> Result<(), GeometryError> {
            if values.iter().all(|v| v.is_finite()) {
                Ok(())
            } else {
                Err(GeometryError::NonFinite(what))
            }
        }

        match self {
            Self::Point { x, y } => finite(&[*x, *y], "point"),
            Self::LineSeg {
                p1, p2, width, ..
            } => {
                finite(&[p1.x, p1.y, p2.x, p2.y], "segment endpoints")?;
                if let Some(w) = width {
                    finite(&[*w], "segment width")?;
                    if *w < 0.0 {
                        return Err(GeometryError::NegativeExtent("segment width"));
                    }
                }
                Ok(())
            }
            Self::Rect { x, y, w, h } => finite(&[*x, *y, *w, *h], "rect"),
            Self::Polygon { points } => {
                if points.len() < 3 {
                    return Err(GeometryError::TooFewVertices {
                        found: points.len(),
                    });
                }
                if points.iter().all(|p| p.is_finite()) {
                    Ok(())
                } else {
                    Err(GeometryError::NonFinite("polygon vertices"))
                }
            }
            Self::Circle { x, y, r } => {
                finite(&[*x, *y, *r], "circle")?;
                if *r < 0.0 {
                    return Err(GeometryError::NegativeExtent("circle radius"));
                }
                Ok(())
            }
        }
    }
}

/// Rotation applied to a shape after it is built.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rotation {
    /// Angle in radians, counter-clockwise in a y-up frame.
    pub angle: f64,
    /// Pivot; `None` rotates about the shape's own center.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pivot: Option<Point>,
}

impl Rotation {
    /// Rotate about the shape's own center.
    pub const fn about_center(angle: f64) -> Self {
        Self { angle, pivot: None }
    }

    /// Rotate about an explicit pivot.
    pub fn about(angle: f64, pivot: impl Into<Point>) -> Self {
        Self {
            angle,
            pivot: Some(pivot.into()),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), GeometryError> {
        let pivot_ok = self.pivot.is_none_or(|p| p.is_finite());
        if self.angle.is_finite() && pivot_ok {
            Ok(())
        } else {
            Err(GeometryError::NonFinite("rotation"))
        }
    }
}
