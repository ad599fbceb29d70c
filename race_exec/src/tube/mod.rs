//! # Safety tube
//!
//! Sweeps a circular cross-section along a dense trajectory centreline to
//! build a tube mesh. The tube radius is either constant or given per
//! sample, for example by the waypoint proximity profile.
//!
//! The computation has two phases. Tangents are estimated from the whole
//! centreline first, then each sample's frame and ring are built from its
//! own tangent and position alone.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Tangent estimation and per-sample frames
pub mod frame;

/// Waypoint proximity radius profile
pub mod profile;

/// Ring construction and the tube mesh
pub mod sweep;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use thiserror::Error;

pub use frame::{estimate_tangents, FrenetFrame};
pub use profile::{proximity_radii, ProfileParams};
pub use sweep::{sweep, TubeMesh, TubeRadius, TubeSample, TubeVertexRecord};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Invalid inputs to the tube computations.
///
/// Geometric degeneracies (coincident samples, tangents parallel to the
/// reference axis) are resolved internally and never reported here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TubeError {
    #[error("The centreline contains no samples")]
    EmptyCentreline,

    #[error("Expected {expected} {what}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("A ring needs at least 2 points, found {0}")]
    TooFewRingPoints(usize),

    #[error("Invalid tube radius {0}, radii must be finite and non-negative")]
    InvalidRadius(f64),

    #[error("The centreline contains a non-finite position at sample {0}")]
    NonFinitePosition(usize),

    #[error("At least 2 waypoints are needed, found {0}")]
    TooFewWaypoints(usize),

    #[error("Invalid profile parameters: {0}")]
    InvalidProfile(String),
}
