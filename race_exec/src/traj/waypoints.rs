//! # Waypoints
//!
//! The sparse, time stamped waypoint list written by the planner. The file
//! holds a flat `waypoints` list of `3N` coordinates and a `timestamps` list
//! of `N` increasing times.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use nalgebra::Vector3;
use serde::Deserialize;
use std::{fs, path::Path};

use super::{validate_times, TrajError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Ordered waypoints with strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoints {
    positions_m: Vec<Vector3<f64>>,
    t_s: Vec<f64>,
}

/// On-disk layout of the waypoint file.
#[derive(Debug, Deserialize)]
struct WaypointFile {
    waypoints: Vec<f64>,
    timestamps: Vec<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoints {
    /// Create the waypoint list. At least two waypoints are needed to form a
    /// segment.
    pub fn new(positions_m: Vec<Vector3<f64>>, t_s: Vec<f64>) -> Result<Self, TrajError> {
        if positions_m.len() != t_s.len() {
            return Err(TrajError::LengthMismatch {
                expected: positions_m.len(),
                found: t_s.len(),
            });
        }
        if positions_m.len() < 2 {
            return Err(TrajError::InvalidWaypoints(format!(
                "at least 2 waypoints are required, found {}",
                positions_m.len()
            )));
        }
        if positions_m.iter().any(|p| p.iter().any(|v| !v.is_finite())) {
            return Err(TrajError::InvalidWaypoints(
                "waypoint positions must be finite".into(),
            ));
        }
        validate_times(t_s.iter().copied())?;

        Ok(Self { positions_m, t_s })
    }

    /// Create the waypoint list from a flat `[x0, y0, z0, x1, ...]` list.
    pub fn from_flat(flat: &[f64], t_s: Vec<f64>) -> Result<Self, TrajError> {
        if flat.len() % 3 != 0 {
            return Err(TrajError::InvalidWaypoints(format!(
                "the waypoint list length ({}) is not a multiple of 3",
                flat.len()
            )));
        }

        Self::new(
            flat.chunks(3)
                .map(|c| Vector3::new(c[0], c[1], c[2]))
                .collect(),
            t_s,
        )
    }

    /// Parse the waypoint file format.
    pub fn from_yaml_str(text: &str) -> Result<Self, TrajError> {
        let file: WaypointFile = serde_yaml::from_str(text).map_err(TrajError::WaypointParseError)?;

        Self::from_flat(&file.waypoints, file.timestamps)
    }

    /// Load a waypoint file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TrajError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| TrajError::WaypointFileError(path.to_path_buf(), e))?;

        let wps = Self::from_yaml_str(&text)?;
        debug!("Read {} waypoints from {:?}", wps.len(), path);

        Ok(wps)
    }

    pub fn positions_m(&self) -> &[Vector3<f64>] {
        &self.positions_m
    }

    pub fn t_s(&self) -> &[f64] {
        &self.t_s
    }

    pub fn len(&self) -> usize {
        self.t_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t_s.is_empty()
    }
}
