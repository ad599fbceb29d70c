//! # Typed access to YAML records
//!
//! States and gates are read from, and written to, ordered YAML mappings.
//! These helpers convert between mapping entries and the typed fields of the
//! data model, reporting problems as [`ValidationError`]s.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Vector3, Vector4};
use serde_yaml::{Mapping, Number, Value};
use std::convert::TryFrom;

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// An ordered set of named field values, as found in a track file record.
pub type Fields = Mapping;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Names of all keys in the record, in record order.
///
/// Non-string keys are rendered with their debug representation so they can
/// still be reported.
pub fn key_names(fields: &Fields) -> Vec<String> {
    fields
        .keys()
        .map(|k| match k.as_str() {
            Some(s) => s.to_string(),
            None => format!("{:?}", k),
        })
        .collect()
}

/// Return every name in `required` absent from `fields`, in `required` order.
pub fn missing(fields: &Fields, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| !fields.contains_key(**name))
        .map(|name| name.to_string())
        .collect()
}

/// Return every key in `fields` which is neither in `allowed` nor in
/// `ignored`, in record order.
pub fn unexpected(fields: &Fields, allowed: &[&str], ignored: &[&str]) -> Vec<String> {
    key_names(fields)
        .into_iter()
        .filter(|k| !allowed.contains(&k.as_str()) && !ignored.contains(&k.as_str()))
        .collect()
}

/// Get the raw value of a field, or a `MissingFields` error naming it.
pub fn value<'a>(
    fields: &'a Fields,
    target: &str,
    field: &str,
) -> Result<&'a Value, ValidationError> {
    fields
        .get(field)
        .ok_or_else(|| ValidationError::missing(target, vec![field.to_string()]))
}

/// Read a float field. Integers are accepted and widened.
pub fn get_f64(fields: &Fields, target: &str, field: &str) -> Result<f64, ValidationError> {
    to_f64(value(fields, target, field)?, field)
}

/// Read a non-negative integer field.
pub fn get_u32(fields: &Fields, target: &str, field: &str) -> Result<u32, ValidationError> {
    let v = value(fields, target, field)?;

    v.as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| invalid(field, "a non-negative integer"))
}

/// Read a boolean field.
pub fn get_bool(fields: &Fields, target: &str, field: &str) -> Result<bool, ValidationError> {
    value(fields, target, field)?
        .as_bool()
        .ok_or_else(|| invalid(field, "a boolean"))
}

/// Read a 3 element vector field.
pub fn get_vec3(
    fields: &Fields,
    target: &str,
    field: &str,
) -> Result<Vector3<f64>, ValidationError> {
    to_vec3(value(fields, target, field)?, field)
}

/// Read a 4 element vector field.
pub fn get_vec4(
    fields: &Fields,
    target: &str,
    field: &str,
) -> Result<Vector4<f64>, ValidationError> {
    let v = to_floats(value(fields, target, field)?, field, 4)?;
    Ok(Vector4::new(v[0], v[1], v[2], v[3]))
}

/// Read an optional string field, `None` if absent or null.
pub fn get_opt_string(fields: &Fields, field: &str) -> Result<Option<String>, ValidationError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(field, "a string")),
    }
}

/// Convert a value into a 3 element vector.
pub fn to_vec3(value: &Value, field: &str) -> Result<Vector3<f64>, ValidationError> {
    let v = to_floats(value, field, 3)?;
    Ok(Vector3::new(v[0], v[1], v[2]))
}

/// Convert a float into a YAML value.
pub fn float_value(v: f64) -> Value {
    Value::Number(Number::from(v))
}

/// Convert a slice of floats into a YAML sequence.
pub fn floats_value(v: &[f64]) -> Value {
    Value::Sequence(v.iter().copied().map(float_value).collect())
}

/// Convert an integer into a YAML value.
pub fn u32_value(v: u32) -> Value {
    Value::Number(Number::from(v))
}

/// Insert a field into an ordered record.
pub fn push(fields: &mut Fields, field: &str, value: Value) {
    fields.insert(Value::String(field.to_string()), value);
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn invalid(field: &str, expected: &'static str) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        expected,
    }
}

fn to_f64(value: &Value, field: &str) -> Result<f64, ValidationError> {
    value.as_f64().ok_or_else(|| invalid(field, "a number"))
}

fn to_floats(value: &Value, field: &str, len: usize) -> Result<Vec<f64>, ValidationError> {
    let expected = match len {
        3 => "a sequence of 3 numbers",
        4 => "a sequence of 4 numbers",
        _ => "a sequence of numbers",
    };

    let seq = value.as_sequence().ok_or_else(|| invalid(field, expected))?;
    if seq.len() != len {
        return Err(invalid(field, expected));
    }

    seq.iter()
        .map(|v| v.as_f64().ok_or_else(|| invalid(field, expected)))
        .collect()
}
