//! # Flight boundary states
//!
//! The initial and final states of a race, used as boundary conditions by
//! the trajectory planner.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Vector3, Vector4};

use crate::{
    error::ValidationError,
    fields::{self, Fields},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default collective thrust to mass ratio, standard gravity in m/s^2.
pub const DEFAULT_CTHRUSTMASS: f64 = 9.8066;

/// Order of the fields in a state record.
pub const FIELD_ORDER: [&str; 7] = ["pos", "vel", "acc", "jer", "rot", "cthrustmass", "euler"];

const TARGET: &str = "FlightState";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A boundary condition of the race.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightState {
    pub pos: Vector3<f64>,
    pub vel: Vector3<f64>,
    pub acc: Vector3<f64>,
    pub jer: Vector3<f64>,

    /// Orientation quaternion, zero when unspecified
    pub rot: Vector4<f64>,

    /// Collective thrust to mass ratio
    pub cthrustmass: f64,
    pub euler: Vector3<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FlightState {
    /// A state at `pos` with every other field at its default.
    pub fn at(pos: Vector3<f64>) -> Self {
        Self {
            pos,
            vel: Vector3::zeros(),
            acc: Vector3::zeros(),
            jer: Vector3::zeros(),
            rot: Vector4::zeros(),
            cthrustmass: DEFAULT_CTHRUSTMASS,
            euler: Vector3::zeros(),
        }
    }

    /// Build a state from a record. Only `pos` is required.
    pub fn from_fields(f: &Fields) -> Result<Self, ValidationError> {
        let missing = fields::missing(f, &["pos"]);
        if !missing.is_empty() {
            return Err(ValidationError::missing(TARGET, missing));
        }

        let unexpected = fields::unexpected(f, &FIELD_ORDER, &[]);
        if !unexpected.is_empty() {
            return Err(ValidationError::UnexpectedFields {
                target: TARGET.to_string(),
                fields: unexpected,
            });
        }

        let mut state = Self::at(fields::get_vec3(f, TARGET, "pos")?);

        if f.contains_key("vel") {
            state.vel = fields::get_vec3(f, TARGET, "vel")?;
        }
        if f.contains_key("acc") {
            state.acc = fields::get_vec3(f, TARGET, "acc")?;
        }
        if f.contains_key("jer") {
            state.jer = fields::get_vec3(f, TARGET, "jer")?;
        }
        if f.contains_key("rot") {
            state.rot = fields::get_vec4(f, TARGET, "rot")?;
        }
        if f.contains_key("cthrustmass") {
            state.cthrustmass = fields::get_f64(f, TARGET, "cthrustmass")?;
        }
        if f.contains_key("euler") {
            state.euler = fields::get_vec3(f, TARGET, "euler")?;
        }

        Ok(state)
    }

    /// The state as a record with all seven fields in order.
    pub fn to_fields(&self) -> Fields {
        let mut f = Fields::new();

        fields::push(&mut f, "pos", fields::floats_value(self.pos.as_slice()));
        fields::push(&mut f, "vel", fields::floats_value(self.vel.as_slice()));
        fields::push(&mut f, "acc", fields::floats_value(self.acc.as_slice()));
        fields::push(&mut f, "jer", fields::floats_value(self.jer.as_slice()));
        fields::push(&mut f, "rot", fields::floats_value(self.rot.as_slice()));
        fields::push(&mut f, "cthrustmass", fields::float_value(self.cthrustmass));
        fields::push(&mut f, "euler", fields::floats_value(self.euler.as_slice()));

        f
    }
}
