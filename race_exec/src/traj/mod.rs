//! # Trajectories
//!
//! Trajectories produced by the external planner, as a sparse sequence of
//! time stamped samples. This module loads the planner's CSV output and
//! provides resampling onto a dense uniform time grid ([`sampler`]) plus the
//! sparse waypoint list the planner produces alongside it ([`waypoints`]).

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod sampler;
pub mod waypoints;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use csv::{ReaderBuilder, Trim};
use log::debug;
use nalgebra::{Vector3, Vector4};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use sampler::{sample_uniform, DenseTrajectory, DEFAULT_NUM_SAMPLES};
pub use waypoints::Waypoints;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One row of the planner's trajectory CSV file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajRecord {
    pub t: f64,
    pub p_x: f64,
    pub p_y: f64,
    pub p_z: f64,
    pub q_w: f64,
    pub q_x: f64,
    pub q_y: f64,
    pub q_z: f64,
    pub v_x: f64,
    pub v_y: f64,
    pub v_z: f64,
    pub w_x: f64,
    pub w_y: f64,
    pub w_z: f64,
    pub u_1: f64,
    pub u_2: f64,
    pub u_3: f64,
    pub u_4: f64,
}

/// A single trajectory sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajPoint {
    pub t_s: f64,
    pub position_m: Vector3<f64>,
    pub velocity_ms: Vector3<f64>,
}

/// A sparse trajectory with strictly increasing sample times.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    points: Vec<TrajPoint>,

    /// Attitude quaternions `(w, x, y, z)`, present when loaded from a file
    attitudes: Vec<Vector4<f64>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TrajError {
    #[error("The trajectory contains no samples")]
    EmptyTrajectory,

    #[error("Sample times must be strictly increasing, sample {0} is not")]
    NonIncreasingTime(usize),

    #[error("Sample {0} contains a non-finite value")]
    NonFiniteSample(usize),

    #[error("Expected {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("At least one output sample must be requested")]
    ZeroSamples,

    #[error("Cannot read the trajectory file {0:?}: {1}")]
    CsvError(PathBuf, csv::Error),

    #[error("Cannot read the waypoint file {0:?}: {1}")]
    WaypointFileError(PathBuf, std::io::Error),

    #[error("Cannot parse the waypoint file: {0}")]
    WaypointParseError(serde_yaml::Error),

    #[error("Invalid waypoints: {0}")]
    InvalidWaypoints(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    /// Create a trajectory from a list of samples.
    pub fn new(points: Vec<TrajPoint>) -> Result<Self, TrajError> {
        validate_times(points.iter().map(|p| p.t_s))?;

        for (i, p) in points.iter().enumerate() {
            if !(p.position_m.iter().all(|v| v.is_finite())
                && p.velocity_ms.iter().all(|v| v.is_finite()))
            {
                return Err(TrajError::NonFiniteSample(i));
            }
        }

        Ok(Self {
            points,
            attitudes: Vec::new(),
        })
    }

    /// Create a trajectory from parallel arrays of times, positions and
    /// velocities.
    pub fn from_samples(
        t_s: &[f64],
        position_m: &[Vector3<f64>],
        velocity_ms: &[Vector3<f64>],
    ) -> Result<Self, TrajError> {
        for other in &[position_m.len(), velocity_ms.len()] {
            if *other != t_s.len() {
                return Err(TrajError::LengthMismatch {
                    expected: t_s.len(),
                    found: *other,
                });
            }
        }

        Self::new(
            t_s.iter()
                .zip(position_m.iter().zip(velocity_ms.iter()))
                .map(|(&t_s, (&position_m, &velocity_ms))| TrajPoint {
                    t_s,
                    position_m,
                    velocity_ms,
                })
                .collect(),
        )
    }

    /// Create a trajectory from the rows of a planner output file.
    pub fn from_records(records: &[TrajRecord]) -> Result<Self, TrajError> {
        let mut traj = Self::new(
            records
                .iter()
                .map(|r| TrajPoint {
                    t_s: r.t,
                    position_m: Vector3::new(r.p_x, r.p_y, r.p_z),
                    velocity_ms: Vector3::new(r.v_x, r.v_y, r.v_z),
                })
                .collect(),
        )?;

        traj.attitudes = records
            .iter()
            .map(|r| Vector4::new(r.q_w, r.q_x, r.q_y, r.q_z))
            .collect();

        Ok(traj)
    }

    /// Load a planner trajectory CSV file.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self, TrajError> {
        let path = path.as_ref();

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_path(path)
            .map_err(|e| TrajError::CsvError(path.to_path_buf(), e))?;

        let records = reader
            .deserialize()
            .collect::<Result<Vec<TrajRecord>, csv::Error>>()
            .map_err(|e| TrajError::CsvError(path.to_path_buf(), e))?;

        debug!("Read {} trajectory samples from {:?}", records.len(), path);

        Self::from_records(&records)
    }

    pub fn points(&self) -> &[TrajPoint] {
        &self.points
    }

    /// Attitude quaternions, empty unless the trajectory was loaded from
    /// planner output.
    pub fn attitudes(&self) -> &[Vector4<f64>] {
        &self.attitudes
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Time of the first and last samples.
    pub fn time_span(&self) -> (f64, f64) {
        // Never empty once constructed
        match (self.points.first(), self.points.last()) {
            (Some(f), Some(l)) => (f.t_s, l.t_s),
            _ => (0.0, 0.0),
        }
    }

    pub fn duration_s(&self) -> f64 {
        let (start, end) = self.time_span();
        end - start
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that a sequence of times is non-empty, finite and strictly
/// increasing.
fn validate_times<I: Iterator<Item = f64>>(times: I) -> Result<(), TrajError> {
    let mut prev: Option<f64> = None;
    let mut count = 0;

    for (i, t) in times.enumerate() {
        if !t.is_finite() {
            return Err(TrajError::NonFiniteSample(i));
        }
        if let Some(p) = prev {
            if t <= p {
                return Err(TrajError::NonIncreasingTime(i));
            }
        }
        prev = Some(t);
        count += 1;
    }

    if count == 0 {
        return Err(TrajError::EmptyTrajectory);
    }

    Ok(())
}
