//! # Gates
//!
//! A gate is a shape from the catalog placed at a position in the course.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde_yaml::Value;

use crate::{
    error::ValidationError,
    fields::{self, Fields},
    shape::{GateShape, OutlineOptions, ShapeKind},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Keys every gate record carries, whatever its shape.
const GATE_FIELDS: [&str; 3] = ["type", "position", "stationary"];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An obstacle of the course.
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    pub shape: GateShape,
    pub position: Vector3<f64>,
    pub stationary: bool,
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Gate {
    pub fn new(shape: GateShape, position: Vector3<f64>, stationary: bool) -> Self {
        Self {
            shape,
            position,
            stationary,
            name: None,
        }
    }

    /// Create a gate from a shape tag and the shape's parameter record.
    ///
    /// `tag` may be either the track file tag or the descriptive variant
    /// name. Fails listing every missing shape parameter.
    pub fn create(
        tag: &str,
        position: Vector3<f64>,
        stationary: bool,
        shape_fields: &Fields,
        name: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let kind = ShapeKind::from_tag(tag)?;

        Ok(Self {
            shape: GateShape::from_fields(kind, shape_fields)?,
            position,
            stationary,
            name: name.map(String::from),
        })
    }

    /// Build a gate from a complete track file record.
    ///
    /// When the shape type is known, missing gate keys and missing shape
    /// parameters are reported together in the variant's declared order.
    pub fn from_record(record: &Fields) -> Result<Self, ValidationError> {
        let tag = match record.get("type") {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => {
                return Err(ValidationError::InvalidField {
                    field: "type".into(),
                    expected: "a string",
                })
            }
            None => None,
        };

        let kind = tag.map(ShapeKind::from_tag).transpose()?;

        let required: Vec<&str> = match kind {
            Some(k) => k
                .field_order()
                .iter()
                .copied()
                .filter(|f| *f != "name")
                .collect(),
            None => GATE_FIELDS.to_vec(),
        };

        let missing = fields::missing(record, &required);

        match kind {
            Some(kind) if missing.is_empty() => Ok(Self {
                shape: GateShape::from_fields(kind, record)?,
                position: fields::get_vec3(record, "Gate", "position")?,
                stationary: fields::get_bool(record, "Gate", "stationary")?,
                name: fields::get_opt_string(record, "name")?,
            }),
            _ => Err(ValidationError::missing("Gate", missing)),
        }
    }

    /// The gate as a track file record, keys in the variant's order.
    ///
    /// `name` is omitted when the gate has none.
    pub fn to_record(&self) -> Fields {
        let mut record = Fields::new();

        fields::push(
            &mut record,
            "type",
            Value::String(self.shape.kind().tag().to_string()),
        );
        if let Some(ref name) = self.name {
            fields::push(&mut record, "name", Value::String(name.clone()));
        }
        fields::push(
            &mut record,
            "position",
            fields::floats_value(self.position.as_slice()),
        );
        for (k, v) in self.shape.to_fields() {
            record.insert(k, v);
        }
        fields::push(&mut record, "stationary", Value::Bool(self.stationary));

        record
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Closed outline of the gate in world coordinates.
    pub fn outline(&self, opts: &OutlineOptions) -> Vec<Vector3<f64>> {
        self.shape.outline(&self.position, opts)
    }
}
