//! # Race track interface library
//!
//! Defines the race course data model shared by everything that reads or
//! writes track files: the gate shape catalog, flight boundary states,
//! gates, and the ordered race track with its YAML track file format.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// YAML writer with explicit formatting configuration
pub mod emit;

/// Validation and serialization errors
pub mod error;

/// Typed access to YAML records
pub mod fields;

/// Gates - a shape placed at a position in the course
pub mod gate;

/// Gate shape catalog - variants, field tables and outlines
pub mod shape;

/// Flight boundary states
pub mod state;

/// The race track - ordered gates plus boundary states
pub mod track;

// ---------------------------------------------------------------------------
// REEXPORTS
// ---------------------------------------------------------------------------

pub use emit::EmitterConfig;
pub use error::{SerializationError, ValidationError};
pub use fields::Fields;
pub use gate::Gate;
pub use shape::{GateShape, OutlineOptions, ShapeKind};
pub use state::FlightState;
pub use track::RaceTrack;
