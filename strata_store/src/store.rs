// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::BTreeMap;
use std::fmt::Debug;

use kurbo::{Point, Rect};
use serde_json::Value;
use strata_geometry::{CanonicalShape, IntersectionEngine, TestParams};
use strata_index::backends::GridF64;
use strata_index::{Aabb2D, Backend, SpatialIndex};
use tracing::{debug, warn};

use crate::{Error, Record, RecordId, StoreConfig};

/// A record together with its normalized geometry.
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub(crate) record: Record,
    pub(crate) shape: CanonicalShape,
}

/// In-memory record store with a spatial index kept in step.
///
/// Every stored record has a canonical shape, and the index holds exactly one
/// rectangle per record: the shape's bounding rectangle. Mutations either
/// succeed completely or leave the store as it was.
///
/// ```
/// use strata_store::{Record, Store};
/// use strata_geometry::ShapeSpec;
/// use kurbo::{Point, Rect};
///
/// let mut store = Store::new();
/// let id = store.put(Record::new(ShapeSpec::Circle { x: 10.0, y: 10.0, r: 3.0 })).unwrap();
/// assert_eq!(store.get_by_point(Point::new(9.0, 9.0)), vec![id]);
///
/// store.delete(id).unwrap();
/// assert!(store.get_by_rect(Rect::new(0.0, 0.0, 20.0, 20.0)).is_empty());
/// ```
pub struct Store<B: Backend<f64> = GridF64> {
    pub(crate) entries: BTreeMap<RecordId, Entry>,
    index: SpatialIndex<f64, RecordId, B>,
    /// `None` once an id of `u64::MAX` has been used.
    next_id: Option<RecordId>,
    pub(crate) engine: IntersectionEngine,
}

impl<B: Backend<f64> + Debug> Debug for Store<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("records", &self.entries.len())
            .field("next_id", &self.next_id)
            .field("engine", &self.engine)
            .field("index", &self.index)
            .finish()
    }
}

impl Store {
    /// A grid-backed store with default settings.
    pub fn new() -> Self {
        Self::from_config(&StoreConfig::default())
    }

    /// A grid-backed store built from `config`.
    ///
    /// A non-positive or non-finite cell size falls back to the default.
    pub fn from_config(config: &StoreConfig) -> Self {
        let default_cell = StoreConfig::default().index.cell_size;
        let mut cell_size = config.index.cell_size;
        if !(cell_size.is_finite() && cell_size > 0.0) {
            warn!(cell_size, fallback = default_cell, "invalid grid cell size");
            cell_size = default_cell;
        }
        debug!(cell_size, first_id = config.first_id, "creating store");
        Self::with_backend(GridF64::new(cell_size), config.first_id, config.tests)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend<f64>> Store<B> {
    /// A store over an explicitly configured index backend.
    pub fn with_backend(backend: B, first_id: RecordId, params: TestParams) -> Self {
        Self {
            entries: BTreeMap::new(),
            index: SpatialIndex::with_backend(backend),
            next_id: Some(first_id),
            engine: IntersectionEngine::new(params),
        }
    }

    /// Insert or replace a record, returning its id.
    ///
    /// A record without an id gets the next free one. A record whose id is
    /// already stored replaces that record. Explicit ids move the allocator
    /// past themselves so later allocations never collide; once `u64::MAX`
    /// is taken, puts without an id fail with [`Error::IdSpaceExhausted`].
    ///
    /// Normalization runs before anything is touched; if it fails, the
    /// store is unchanged.
    pub fn put(&mut self, mut record: Record) -> Result<RecordId, Error> {
        let id = match record.id {
            Some(id) => id,
            None => self.next_id.ok_or(Error::IdSpaceExhausted)?,
        };
        record.id = Some(id);
        let shape = record.normalize()?;
        let bounds = shape.bounding_rect();

        let update = match self.entries.get(&id) {
            Some(old) => {
                self.index.remove(rect_to_aabb(old.shape.bounding_rect()), id);
                true
            }
            None => false,
        };
        self.index.insert(rect_to_aabb(bounds), id);
        if self.next_id.is_some_and(|next| id >= next) {
            self.next_id = id.checked_add(1);
        }

        debug!(
            id,
            update,
            kind = ?shape.kind(),
            x = bounds.x0,
            y = bounds.y0,
            w = bounds.width(),
            h = bounds.height(),
            "put record"
        );
        self.entries.insert(id, Entry { record, shape });
        Ok(id)
    }

    /// Decode a flat JSON record (see [`Record::from_json`]) and put it.
    pub fn put_json(&mut self, value: Value) -> Result<RecordId, Error> {
        self.put(Record::from_json(value)?)
    }

    /// Remove a record and its index entry.
    pub fn delete(&mut self, id: RecordId) -> Result<(), Error> {
        let entry = self.entries.remove(&id).ok_or(Error::UnknownId(id))?;
        self.index.remove(rect_to_aabb(entry.shape.bounding_rect()), id);
        debug!(id, "deleted record");
        Ok(())
    }

    /// Ids of records whose bounding rectangle overlaps `rect`, ascending.
    ///
    /// This is the coarse prefilter only; see [`Store::query`] for exact tests.
    pub fn get_by_rect(&self, rect: Rect) -> Vec<RecordId> {
        self.search(rect_to_aabb(rect))
    }

    /// Ids of records whose bounding rectangle overlaps the unit box at `point`.
    pub fn get_by_point(&self, point: Point) -> Vec<RecordId> {
        self.search(Aabb2D::unit_at(point.x, point.y))
    }

    fn search(&self, aabb: Aabb2D<f64>) -> Vec<RecordId> {
        let mut ids = self.index.search(aabb);
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// The canonical shape of a record.
    pub fn object_data(&self, id: RecordId) -> Option<&CanonicalShape> {
        self.entries.get(&id).map(|e| &e.shape)
    }

    /// The record as it was put, with its id filled in.
    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.entries.get(&id).map(|e| &e.record)
    }

    /// Whether a record with this id exists.
    pub fn contains(&self, id: RecordId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Stored ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.entries.keys().copied()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every record. Ids handed out so far are not reused.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        debug!("cleared store");
    }

    /// Tolerances used by [`Store::query`].
    pub fn test_params(&self) -> &TestParams {
        self.engine.params()
    }
}

fn rect_to_aabb(rect: Rect) -> Aabb2D<f64> {
    let r = rect.abs();
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}
