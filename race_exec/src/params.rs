//! Parameters structure for the race executable

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{
    traj::DEFAULT_NUM_SAMPLES,
    tube::{sweep::DEFAULT_RING_POINTS, ProfileParams},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the race executable.
///
/// Relative paths are relative to the software root, see
/// [`ExecParams::resolve`].
#[derive(Debug, Clone, Deserialize)]
pub struct ExecParams {
    /// The race track file to plan and sweep.
    pub track_file: PathBuf,

    pub planner: PlannerParams,

    #[serde(default)]
    pub sampler: SamplerParams,

    pub tube: TubeParams,
}

/// Parameters of the external trajectory planner.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerParams {
    /// The planner program
    pub program_path: PathBuf,

    /// The planner's own configuration file
    pub config_path: PathBuf,

    /// Name of the quadrotor model the planner uses
    pub quad_name: String,

    /// Directory the planner writes trajectory CSV files into
    pub traj_dir: PathBuf,

    /// Directory the planner writes waypoint files into
    pub wpt_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplerParams {
    /// Number of uniformly spaced samples of the dense trajectory
    pub num_samples: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TubeParams {
    /// Number of points in each ring of the tube
    #[serde(default = "default_ring_points")]
    pub ring_points: usize,

    /// Constant tube radius, used when no profile is given.
    ///
    /// Units: meters
    pub radius_m: f64,

    /// Waypoint proximity profile, replaces the constant radius if present
    #[serde(default)]
    pub profile: Option<ProfileParams>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ExecParams {
    /// Make every relative path relative to `root`.
    pub fn resolve(mut self, root: &Path) -> Self {
        self.track_file = root.join(&self.track_file);
        self.planner.program_path = root.join(&self.planner.program_path);
        self.planner.config_path = root.join(&self.planner.config_path);
        self.planner.traj_dir = root.join(&self.planner.traj_dir);
        self.planner.wpt_dir = root.join(&self.planner.wpt_dir);
        self
    }
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            num_samples: DEFAULT_NUM_SAMPLES,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_ring_points() -> usize {
    DEFAULT_RING_POINTS
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_params() {
        let params: ExecParams = util::params::from_str(
            r#"
            track_file = "tracks/racetrack.yaml"

            [planner]
            program_path = "/opt/planner/bin/planner"
            config_path = "planner/config.yaml"
            quad_name = "cpc"
            traj_dir = "planner/traj"
            wpt_dir = "planner/wpt"

            [tube]
            radius_m = 0.4

            [tube.profile]
            inner_radius_m = 0.2
            outer_radius_m = 1.0
            rate = 4.0
            bias_m = 1.5
            "#,
        )
        .unwrap();

        assert_eq!(params.sampler.num_samples, 5000);
        assert_eq!(params.tube.ring_points, 20);
        assert_eq!(params.tube.profile.unwrap().scale, 1.0);

        let params = params.resolve(Path::new("/sw"));
        assert_eq!(params.track_file, Path::new("/sw/tracks/racetrack.yaml"));
        assert_eq!(
            params.planner.program_path,
            Path::new("/opt/planner/bin/planner")
        );
        assert_eq!(params.planner.wpt_dir, Path::new("/sw/planner/wpt"));
    }
}
