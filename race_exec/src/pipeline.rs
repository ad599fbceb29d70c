//! # Tube pipeline
//!
//! Runs one batch: load the track, plan a trajectory through it, resample
//! the trajectory, compute the tube radius and sweep the tube.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use nalgebra::Vector3;
use serde::Serialize;
use thiserror::Error;

use crate::{
    params::ExecParams,
    planner_client::{PlannerError, TrajPlanner},
    traj::{sample_uniform, DenseTrajectory, TrajError, Trajectory, Waypoints},
    tube::{proximity_radii, sweep, TubeError, TubeMesh, TubeRadius},
};
use track_if::{OutlineOptions, RaceTrack, SerializationError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Outline of a gate, for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateOutline {
    pub name: String,
    pub shape: String,
    pub points_m: Vec<Vector3<f64>>,
}

/// Everything produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub track: RaceTrack,
    pub outlines: Vec<GateOutline>,
    pub dense: DenseTrajectory,

    /// Per-sample radii, if a proximity profile was used
    pub radii: Option<Vec<f64>>,
    pub mesh: TubeMesh,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Cannot load the race track: {0}")]
    Track(#[from] SerializationError),

    #[error("Trajectory planning failed: {0}")]
    Planner(#[from] PlannerError),

    #[error("Invalid planner output: {0}")]
    Traj(#[from] TrajError),

    #[error("Cannot build the tube: {0}")]
    Tube(#[from] TubeError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the pipeline. `params` paths must already be resolved.
pub fn run(
    params: &ExecParams,
    planner: &dyn TrajPlanner,
) -> Result<PipelineOutput, PipelineError> {
    // ---- TRACK ----

    let track = RaceTrack::load(&params.track_file)?;

    let opts = OutlineOptions::default();
    let outlines = track
        .iter()
        .map(|(name, gate)| GateOutline {
            name: name.to_string(),
            shape: gate.kind().name().to_string(),
            points_m: gate.outline(&opts),
        })
        .collect();

    // ---- PLANNING ----

    let planned = planner.submit(
        &params.planner.config_path,
        &params.planner.quad_name,
        &params.track_file,
    )?;

    let traj = Trajectory::load_csv(&planned.traj_file)?;
    info!(
        "Planned trajectory has {} samples over {:.3} s",
        traj.len(),
        traj.duration_s()
    );

    let dense = sample_uniform(&traj, params.sampler.num_samples)?;

    // ---- TUBE ----

    let radii = match params.tube.profile {
        Some(ref profile) => {
            let wps = Waypoints::load(&planned.wpt_file)?;
            Some(proximity_radii(
                &dense.t_s,
                &dense.position_m,
                &wps,
                profile,
            )?)
        }
        None => None,
    };

    let radius = match radii {
        Some(ref r) => TubeRadius::PerSample(r.clone()),
        None => TubeRadius::Constant(params.tube.radius_m),
    };

    let mesh = sweep(&dense.position_m, &radius, params.tube.ring_points)?;

    info!(
        "Tube built with {} rings of {} points",
        mesh.num_samples(),
        mesh.ring_points()
    );

    Ok(PipelineOutput {
        track,
        outlines,
        dense,
        radii,
        mesh,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        params::{PlannerParams, SamplerParams, TubeParams},
        planner_client::PlannerOutput,
        tube::ProfileParams,
    };
    use approx::assert_relative_eq;
    use std::{
        fs,
        path::{Path, PathBuf},
    };
    use track_if::{EmitterConfig, Fields, FlightState, Gate};

    /// Writes a straight line trajectory along x through the track.
    struct FakePlanner {
        out_dir: PathBuf,
    }

    impl TrajPlanner for FakePlanner {
        fn submit(
            &self,
            _config_path: &Path,
            _quad_name: &str,
            track_file: &Path,
        ) -> Result<PlannerOutput, PlannerError> {
            assert!(track_file.exists());

            let traj_file = self.out_dir.join("traj.csv");
            let wpt_file = self.out_dir.join("wpt.yaml");

            let mut csv = String::from(
                "t,p_x,p_y,p_z,q_w,q_x,q_y,q_z,v_x,v_y,v_z,w_x,w_y,w_z,u_1,u_2,u_3,u_4\n",
            );
            for i in 0..=6 {
                let t = i as f64 * 0.5;
                csv.push_str(&format!(
                    "{},{},0,1,1,0,0,0,2,0,0,0,0,0,5,5,5,5\n",
                    t,
                    2.0 * t
                ));
            }
            fs::write(&traj_file, csv).unwrap();
            fs::write(
                &wpt_file,
                "waypoints: [0, 0, 1, 3, 0, 1, 6, 0, 1]\ntimestamps: [0.0, 1.5, 3.0]\n",
            )
            .unwrap();

            Ok(PlannerOutput {
                traj_file,
                wpt_file,
            })
        }
    }

    struct FailingPlanner;

    impl TrajPlanner for FailingPlanner {
        fn submit(&self, _: &Path, _: &str, _: &Path) -> Result<PlannerOutput, PlannerError> {
            Err(PlannerError::NonZeroExit {
                code: Some(1),
                stderr: "no solution".into(),
            })
        }
    }

    fn setup(tag: &str, profile: Option<ProfileParams>) -> (PathBuf, ExecParams) {
        let dir = std::env::temp_dir().join(format!(
            "race_pipeline_{}_{}",
            tag,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let mut track = RaceTrack::new(
            FlightState::at(Vector3::new(0.0, 0.0, 1.0)),
            FlightState::at(Vector3::new(6.0, 0.0, 1.0)),
        )
        .with_name("line");
        let fields: Fields = serde_yaml::from_str("radius: 0.5\nmargin: 0.1\n").unwrap();
        track
            .add_gate(
                Gate::create("Ball", Vector3::new(3.0, 0.0, 1.0), true, &fields, None).unwrap(),
                None,
            )
            .unwrap();
        let track_file = track
            .save_to_dir(&dir, true, &EmitterConfig::default())
            .unwrap();

        let params = ExecParams {
            track_file,
            planner: PlannerParams {
                program_path: PathBuf::from("unused"),
                config_path: PathBuf::from("unused"),
                quad_name: "quad".into(),
                traj_dir: dir.clone(),
                wpt_dir: dir.clone(),
            },
            sampler: SamplerParams { num_samples: 61 },
            tube: TubeParams {
                ring_points: 12,
                radius_m: 0.75,
                profile,
            },
        };

        (dir, params)
    }

    #[test]
    fn test_constant_radius_run() {
        let (dir, params) = setup("const", None);
        let out = run(&params, &FakePlanner { out_dir: dir.clone() }).unwrap();

        assert_eq!(out.track.len(), 1);
        assert_eq!(out.outlines[0].name, "Gate1");
        assert_eq!(out.outlines[0].shape, "Ball");
        assert_eq!(out.dense.len(), 61);
        assert!(out.radii.is_none());
        assert_eq!(out.mesh.num_samples(), 61);
        assert_eq!(out.mesh.ring_points(), 12);

        for (i, s) in out.mesh.samples().iter().enumerate() {
            assert_relative_eq!(s.tangent, Vector3::x(), epsilon = 1e-9);
            for v in out.mesh.ring(i).unwrap() {
                assert_relative_eq!((v - s.position_m).norm(), 0.75, epsilon = 1e-12);
            }
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_profile_run() {
        let profile = ProfileParams {
            inner_radius_m: 0.2,
            outer_radius_m: 1.0,
            rate: 4.0,
            bias_m: 0.75,
            scale: 1.0,
        };
        let (dir, params) = setup("profile", Some(profile));
        let out = run(&params, &FakePlanner { out_dir: dir.clone() }).unwrap();

        let radii = out.radii.unwrap();
        assert_eq!(radii.len(), 61);

        // On a waypoint the radius is at its narrowest, between two it is
        // at its widest
        assert_relative_eq!(radii[0], profile.radius_at(0.0), epsilon = 1e-9);
        assert_relative_eq!(radii[30], profile.radius_at(0.0), epsilon = 1e-9);
        assert_relative_eq!(radii[15], profile.radius_at(1.5), epsilon = 1e-9);
        assert_eq!(out.mesh.samples()[15].radius_m, radii[15]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_planner_failure() {
        let (dir, params) = setup("fail", None);

        assert!(matches!(
            run(&params, &FailingPlanner),
            Err(PipelineError::Planner(PlannerError::NonZeroExit { .. }))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_track() {
        let (dir, mut params) = setup("missing", None);
        params.track_file = dir.join("nope.yaml");

        assert!(matches!(
            run(&params, &FakePlanner { out_dir: dir.clone() }),
            Err(PipelineError::Track(SerializationError::Io(..)))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }
}
