// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

use crate::shape::ShapeKind;

/// Failures raised while normalizing or testing shapes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// The record names an input kind with no normalization.
    #[error("unsupported shape kind `{0}`")]
    UnsupportedShapeKind(String),
    /// No intersection test exists for this (ordered) pair of kinds.
    #[error("no intersection test for {a:?} x {b:?}")]
    UnsupportedIntersection {
        /// Lower-ranked operand kind.
        a: ShapeKind,
        /// Higher-ranked operand kind.
        b: ShapeKind,
    },
    /// Polygons need at least three vertices.
    #[error("polygon needs at least 3 vertices, found {found}")]
    TooFewVertices {
        /// Number of vertices supplied.
        found: usize,
    },
    /// A coordinate, extent or angle was NaN or infinite.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
    /// A radius or width was negative.
    #[error("negative {0}")]
    NegativeExtent(&'static str),
}
