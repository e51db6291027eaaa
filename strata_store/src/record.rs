// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw records: a shape, an optional rotation and free-form attributes.

use std::collections::BTreeMap;

use kurbo::Point;
use serde::Deserialize;
use serde::de::Error as _;
use serde_json::{Map, Value, json};
use strata_geometry::{CanonicalShape, GeometryError, InputKind, Rotation, ShapeSpec, normalize};

use crate::{Error, RecordId};

const ID_KEY: &str = "id";
const TYPE_KEY: &str = "type";
const ROTATION_KEY: &str = "rot";

/// A record as callers put it into the store.
///
/// In JSON the shape fields, `id`, `type` and `rot` sit next to the attributes
/// in one flat object:
///
/// ```
/// use strata_store::Record;
///
/// let rec = Record::from_json(serde_json::json!({
///     "type": "circle", "x": 3, "y": 4, "r": 1,
///     "rot": 0.5,
///     "kind": "pond",
/// }))
/// .unwrap();
/// assert_eq!(rec.id, None);
/// assert_eq!(rec.attribute("kind"), Some(&serde_json::json!("pond")));
/// assert!(rec.rotation.is_some());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Id, assigned by the store on first put when absent.
    pub id: Option<RecordId>,
    /// Geometry before normalization.
    pub shape: ShapeSpec,
    /// Optional rotation applied during normalization.
    pub rotation: Option<Rotation>,
    /// Everything else; matched by query filters.
    pub attributes: BTreeMap<String, Value>,
}

impl Record {
    /// A record with no id, rotation or attributes.
    pub fn new(shape: ShapeSpec) -> Self {
        Self {
            id: None,
            shape,
            rotation: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the id; putting the record then replaces any record with that id.
    #[must_use]
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Add or replace one attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Normalize the geometry, tagging the result with this record's id.
    pub fn normalize(&self) -> Result<CanonicalShape, GeometryError> {
        let shape = normalize(&self.shape, self.rotation.as_ref())?;
        Ok(match self.id {
            Some(id) => shape.with_id(id),
            None => shape,
        })
    }

    /// Decode a flat JSON record.
    ///
    /// Fails with [`Error::Geometry`] for an unknown `type` and with
    /// [`Error::InvalidRecord`] for anything malformed.
    pub fn from_json(value: Value) -> Result<Self, Error> {
        let Value::Object(mut map) = value else {
            return Err(invalid("a record must be a JSON object"));
        };

        let id = match map.remove(ID_KEY) {
            None | Some(Value::Null) => None,
            Some(v) => Some(RecordId::deserialize(v)?),
        };
        let rotation = match map.remove(ROTATION_KEY) {
            None | Some(Value::Null) => None,
            Some(v) => Some(RotationRepr::deserialize(v)?.into()),
        };

        let kind: InputKind = match map.get(TYPE_KEY) {
            Some(Value::String(name)) => name.parse()?,
            Some(_) => return Err(invalid("`type` must be a string")),
            None => return Err(invalid("missing `type`")),
        };

        let mut shape_fields = Map::new();
        for key in [TYPE_KEY].iter().chain(kind.fields()) {
            if let Some(v) = map.remove(*key) {
                shape_fields.insert((*key).to_owned(), v);
            }
        }
        let shape = ShapeSpec::deserialize(Value::Object(shape_fields))?;

        Ok(Self {
            id,
            shape,
            rotation,
            attributes: map.into_iter().collect(),
        })
    }

    /// Encode as a flat JSON object, the inverse of [`Record::from_json`].
    pub fn to_json(&self) -> Value {
        let mut map: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Value::Object(shape) = serde_json::to_value(&self.shape).unwrap_or_default() {
            map.extend(shape);
        }
        if let Some(id) = self.id {
            map.insert(ID_KEY.to_owned(), id.into());
        }
        if let Some(rot) = &self.rotation {
            map.insert(ROTATION_KEY.to_owned(), RotationRepr::from(*rot).to_json());
        }
        Value::Object(map)
    }
}

impl From<ShapeSpec> for Record {
    fn from(shape: ShapeSpec) -> Self {
        Self::new(shape)
    }
}

fn invalid(msg: &str) -> Error {
    Error::InvalidRecord(serde_json::Error::custom(msg))
}

/// `rot` is either a bare angle or `{ "a": angle, "x": .., "y": .. }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RotationRepr {
    Angle(f64),
    Pivot { a: f64, x: f64, y: f64 },
}

impl RotationRepr {
    fn to_json(&self) -> Value {
        match *self {
            Self::Angle(a) => json!(a),
            Self::Pivot { a, x, y } => json!({ "a": a, "x": x, "y": y }),
        }
    }
}

impl From<RotationRepr> for Rotation {
    fn from(repr: RotationRepr) -> Self {
        match repr {
            RotationRepr::Angle(a) => Self::about_center(a),
            RotationRepr::Pivot { a, x, y } => Self::about(a, Point::new(x, y)),
        }
    }
}

impl From<Rotation> for RotationRepr {
    fn from(rot: Rotation) -> Self {
        match rot.pivot {
            None => Self::Angle(rot.angle),
            Some(p) => Self::Pivot {
                a: rot.angle,
                x: p.x,
                y: p.y,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_fields_are_split_from_attributes() {
        let rec = Record::from_json(json!({
            "id": 7,
            "type": "rect",
            "x": 0, "y": 0, "w": 10, "h": 5,
            "kind": "building",
            "floors": 3,
        }))
        .unwrap();
        assert_eq!(rec.id, Some(7));
        assert_eq!(
            rec.shape,
            ShapeSpec::Rect {
                x: 0.0,
                y: 0.0,
                w: 10.0,
                h: 5.0
            }
        );
        assert_eq!(rec.attributes.len(), 2);
        assert_eq!(rec.attribute("floors"), Some(&json!(3)));
        // The shape tag is not an attribute.
        assert_eq!(rec.attribute("type"), None);
    }

    #[test]
    fn field_names_are_per_kind() {
        // `w` belongs to a segment, `r` does not.
        let rec = Record::from_json(json!({
            "type": "lineseg",
            "p1": {"x": 0, "y": 0},
            "p2": {"x": 5, "y": 0},
            "w": 3,
            "r": "red",
        }))
        .unwrap();
        assert!(matches!(
            rec.shape,
            ShapeSpec::LineSeg {
                width: Some(w),
                ..
            } if w == 3.0
        ));
        assert_eq!(rec.attribute("r"), Some(&json!("red")));
    }

    #[test]
    fn both_rotation_forms_decode() {
        let bare = Record::from_json(json!({"type": "point", "x": 1, "y": 1, "rot": 1.5})).unwrap();
        assert_eq!(bare.rotation, Some(Rotation::about_center(1.5)));

        let pivot = Record::from_json(json!({
            "type": "point", "x": 1, "y": 1,
            "rot": {"a": 0.5, "x": 2, "y": 3},
        }))
        .unwrap();
        assert_eq!(pivot.rotation, Some(Rotation::about(0.5, (2.0, 3.0))));
    }

    #[test]
    fn unknown_kind_is_a_geometry_error() {
        let err = Record::from_json(json!({"type": "line", "x": 1})).unwrap_err();
        assert!(matches!(
            err,
            Error::Geometry(GeometryError::UnsupportedShapeKind(ref name)) if name == "line"
        ));
    }

    #[test]
    fn malformed_records_are_rejected() {
        for bad in [
            json!([1, 2]),
            json!({"x": 1, "y": 2}),
            json!({"type": 3}),
            json!({"type": "circle", "x": 1, "y": 2}),
            json!({"type": "point", "x": 1, "y": 2, "id": -4}),
            json!({"type": "point", "x": 1, "y": 2, "rot": "left"}),
        ] {
            assert!(
                matches!(Record::from_json(bad.clone()), Err(Error::InvalidRecord(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn json_round_trip_keeps_everything() {
        let rec = Record::new(ShapeSpec::segment((0.0, 0.0), (4.0, 2.0)))
            .with_id(3)
            .with_rotation(Rotation::about(0.25, (1.0, 1.0)))
            .with_attribute("kind", "fence");
        assert_eq!(Record::from_json(rec.to_json()).unwrap(), rec);
    }

    #[test]
    fn normalize_carries_the_id() {
        let rec = Record::new(ShapeSpec::Point { x: 1.0, y: 2.0 }).with_id(11);
        assert_eq!(rec.normalize().unwrap().id(), Some(11));
        assert_eq!(Record::new(ShapeSpec::Point { x: 1.0, y: 2.0 }).normalize().unwrap().id(), None);
    }
}
