// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strata Store: an in-memory database of 2D geometric records.
//!
//! - [`Record`]: a shape ([`ShapeSpec`](strata_geometry::ShapeSpec)), an optional
//!   rotation and free-form JSON attributes.
//! - [`Store`]: owns records, their canonical shapes and a spatial index over
//!   their bounding rectangles, and keeps the three consistent across
//!   [`put`](Store::put) and [`delete`](Store::delete).
//! - [`Query`]: "intersects this shape" plus attribute equality filters, run by
//!   [`Store::query`] as index prefilter, exact test, then filter.
//! - [`StoreConfig`]: TOML configuration (first id, grid cell size, test
//!   tolerances, log level).
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use strata_store::{Query, Store};
//!
//! let mut store = Store::new();
//! store.put_json(json!({"type": "rect", "x": 0, "y": 0, "w": 10, "h": 10, "kind": "field"})).unwrap();
//! store.put_json(json!({"type": "point", "x": 40, "y": 40, "kind": "tree"})).unwrap();
//!
//! let criteria = json!({
//!     "intersecting": {"type": "lineseg", "p1": {"x": 5, "y": -5}, "p2": {"x": 5, "y": 5}},
//! });
//! let hits = store.query(&Query::from_json(criteria).unwrap()).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].record.attribute("kind"), Some(&json!("field")));
//! ```
//!
//! The store logs mutations at `debug` and query statistics at `trace`
//! through [`tracing`]; installing a subscriber is up to the application.

mod config;
mod error;
mod query;
mod record;
mod store;

pub use config::{CONFIG_ENV, IndexConfig, LoggingConfig, StoreConfig};
pub use error::{ConfigError, Error};
pub use query::{Query, QueryHit};
pub use record::Record;
pub use store::Store;

/// Record identifiers.
pub type RecordId = strata_geometry::ShapeId;
