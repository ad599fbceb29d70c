//! # Track errors

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised while constructing states, gates and tracks.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Required fields are absent. `fields` lists every missing field, in
    /// the declared order of the target.
    #[error("Missing parameters for {target}: {}", .fields.join(", "))]
    MissingFields { target: String, fields: Vec<String> },

    #[error("Unexpected parameters for {target}: {}", .fields.join(", "))]
    UnexpectedFields { target: String, fields: Vec<String> },

    #[error("Unrecognised gate shape: {0}")]
    UnknownShape(String),

    #[error("Invalid value for field `{field}`: expected {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },

    #[error("A gate named `{0}` already exists in the track")]
    DuplicateGateName(String),

    #[error("`{0}` is a track file key and cannot be used as a gate name")]
    ReservedGateName(String),
}

/// Errors raised while reading or writing track files.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Cannot access the track file {0:?}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Cannot parse the track YAML: {0}")]
    Parse(serde_yaml::Error),

    #[error("The track document is missing the key `{0}`")]
    MissingKey(String),

    #[error("The track document contains the unexpected key `{0}`")]
    UnexpectedKey(String),

    #[error("Invalid track document structure: {0}")]
    InvalidStructure(String),

    #[error("No gate has been added, the race track will not be saved")]
    NoGates,

    #[error("Invalid track contents: {0}")]
    Validation(#[from] ValidationError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ValidationError {
    /// Build a `MissingFields` error for the given target.
    pub fn missing<S: Into<String>>(target: S, fields: Vec<String>) -> Self {
        ValidationError::MissingFields {
            target: target.into(),
            fields,
        }
    }

    /// Return the list of missing fields if this is a `MissingFields` error.
    pub fn missing_fields(&self) -> Option<&[String]> {
        match self {
            ValidationError::MissingFields { fields, .. } => Some(fields),
            _ => None,
        }
    }
}
