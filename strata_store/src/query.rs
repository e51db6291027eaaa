// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Combined geometric and attribute queries.

use std::collections::BTreeMap;

use serde_json::Value;
use strata_geometry::{IntersectionResult, Rotation, ShapeSpec, normalize};
use strata_index::Backend;
use tracing::trace;

use crate::{Error, Record, Store};

const INTERSECTING_KEY: &str = "intersecting";

/// Query criteria: an optional shape to intersect with plus equality filters.
///
/// ```
/// use strata_store::{Query, Record, Store};
/// use strata_geometry::ShapeSpec;
///
/// let mut store = Store::new();
/// store.put(Record::new(ShapeSpec::Point { x: 5.0, y: 5.0 }).with_attribute("kind", "tree")).unwrap();
/// store.put(Record::new(ShapeSpec::Point { x: 6.0, y: 6.0 }).with_attribute("kind", "rock")).unwrap();
///
/// let query = Query::new()
///     .intersecting(ShapeSpec::Circle { x: 5.0, y: 5.0, r: 3.0 })
///     .filter("kind", "tree");
/// let hits = store.query(&query).unwrap();
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].record.attribute("kind"), Some(&serde_json::json!("tree")));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    /// Shape the results must intersect, with its rotation.
    pub intersecting: Option<(ShapeSpec, Option<Rotation>)>,
    /// Attributes the results must carry with exactly these values.
    pub filters: BTreeMap<String, Value>,
}

impl Query {
    /// A query matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only records whose shape intersects `shape`.
    #[must_use]
    pub fn intersecting(mut self, shape: ShapeSpec) -> Self {
        self.intersecting = Some((shape, None));
        self
    }

    /// Keep only records whose shape intersects the rotated `shape`.
    #[must_use]
    pub fn intersecting_rotated(mut self, shape: ShapeSpec, rotation: Rotation) -> Self {
        self.intersecting = Some((shape, Some(rotation)));
        self
    }

    /// Keep only records whose attribute `key` equals `value`.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Decode a criteria object: `intersecting` holds a raw shape (same flat
    /// layout as a record, `rot` allowed), every other key is a filter.
    pub fn from_json(value: Value) -> Result<Self, Error> {
        let Value::Object(mut map) = value else {
            return Err(Error::InvalidRecord(serde::de::Error::custom(
                "a query must be a JSON object",
            )));
        };
        let intersecting = match map.remove(INTERSECTING_KEY) {
            None | Some(Value::Null) => None,
            Some(raw) => {
                let rec = Record::from_json(raw)?;
                Some((rec.shape, rec.rotation))
            }
        };
        Ok(Self {
            intersecting,
            filters: map.into_iter().collect(),
        })
    }

    /// Keys that are not attributes are looked up in the record's flat JSON
    /// form, so `type` filters by shape tag.
    fn matches(&self, record: &Record) -> bool {
        let mut flat: Option<Value> = None;
        self.filters.iter().all(|(key, value)| match record.attribute(key) {
            Some(v) => loosely_equal(v, value),
            None => flat
                .get_or_insert_with(|| record.to_json())
                .get(key)
                .is_some_and(|v| loosely_equal(v, value)),
        })
    }
}

/// JSON equality where numbers compare by value, so `3` matches `3.0`.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| loosely_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| loosely_equal(x, y)))
        }
        _ => a == b,
    }
}

/// One query result.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryHit<'a> {
    /// The matching record.
    pub record: &'a Record,
    /// The intersection test outcome, when the query had a shape.
    pub details: Option<IntersectionResult>,
}

impl<B: Backend<f64>> Store<B> {
    /// Run a query.
    ///
    /// With a shape, candidates come from the index by the shape's bounding
    /// rectangle and each is confirmed by an exact intersection test. Without
    /// one, every record is a candidate. Attribute filters then apply.
    /// Results are in ascending id order; any failure aborts the whole query.
    pub fn query(&self, query: &Query) -> Result<Vec<QueryHit<'_>>, Error> {
        let mut hits = Vec::new();
        match &query.intersecting {
            Some((spec, rotation)) => {
                let probe = normalize(spec, rotation.as_ref())?;
                let candidates = self.get_by_rect(probe.bounding_rect());
                trace!(candidates = candidates.len(), "query prefilter");
                for id in candidates {
                    let Some(entry) = self.entries.get(&id) else {
                        continue;
                    };
                    let result = self.engine.test(&entry.shape, &probe)?;
                    if result.success && query.matches(&entry.record) {
                        hits.push(QueryHit {
                            record: &entry.record,
                            details: Some(result),
                        });
                    }
                }
            }
            None => {
                hits.extend(
                    self.entries
                        .values()
                        .filter(|entry| query.matches(&entry.record))
                        .map(|entry| QueryHit {
                            record: &entry.record,
                            details: None,
                        }),
                );
            }
        }
        trace!(hits = hits.len(), "query done");
        Ok(hits)
    }
}
