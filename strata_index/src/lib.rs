// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strata Index: the broad-phase rectangle index behind the Strata store.
//!
//! - Insert and remove axis-aligned bounding boxes (AABBs) keyed by caller ids.
//! - Search by overlapping rectangle or by point.
//! - Swap the spatial strategy through the [`Backend`] trait without touching call sites.
//!
//! The index only knows rectangles. It is a prefilter: every entry whose box overlaps
//! the query is reported (edges inclusive, so degenerate boxes of points and axis-aligned
//! segments are found too), and exact geometry is the caller's business.
//!
//! # Example
//!
//! ```rust
//! use strata_index::{Aabb2D, SpatialIndex};
//!
//! let mut idx: SpatialIndex<f64, u64> = SpatialIndex::new();
//! let old = Aabb2D::from_xywh(0.0, 0.0, 10.0, 10.0);
//! idx.insert(old, 1);
//! idx.insert(Aabb2D::from_xywh(5.0, 5.0, 10.0, 10.0), 2);
//!
//! // Move record 1 elsewhere.
//! assert!(idx.remove(old, 1));
//! idx.insert(Aabb2D::from_xywh(40.0, 0.0, 10.0, 10.0), 1);
//!
//! assert_eq!(idx.search_point(6.0, 6.0), vec![2]);
//! ```
//!
//! With the `backend_grid` feature enabled (default), a uniform grid is available:
//!
//! ```rust
//! # #[cfg(feature = "backend_grid")]
//! # {
//! use strata_index::{Aabb2D, SpatialIndex};
//!
//! let mut idx = SpatialIndex::<f64, u64>::with_grid(64.0);
//! idx.insert(Aabb2D::from_xywh(0.0, 0.0, 10.0, 10.0), 9);
//! assert_eq!(idx.search(Aabb2D::from_xywh(9.0, 9.0, 5.0, 5.0)), vec![9]);
//! # }
//! ```
//!
//! ## Choosing a backend
//!
//! - `FlatVec` (default): linear scans. Fine for a few hundred records.
//! - `GridF32`/`GridF64`/`GridI64` *(feature `backend_grid`)*: uniform grid with a
//!   configurable cell size, for larger and roughly evenly spread data sets.
//!
//! This crate is `no_std` and uses `alloc`. Float coordinates are assumed finite.

#![no_std]

extern crate alloc;

mod backend;
pub mod backends;
mod index;
mod types;

pub use backend::Backend;
pub use index::SpatialIndex;
pub use types::{Aabb2D, Scalar};
