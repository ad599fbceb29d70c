//! # Planner client
//!
//! The trajectory planner is an external program. Given a track file it
//! writes a dense trajectory CSV file and a sparse waypoint file. The rest
//! of the executable only sees the [`TrajPlanner`] trait, so the program can
//! be replaced in tests.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};
use thiserror::Error;

use crate::params::PlannerParams;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something which can plan a trajectory through a track.
pub trait TrajPlanner {
    /// Plan a trajectory through the track in `track_file`, blocking until
    /// the planner has finished.
    fn submit(
        &self,
        config_path: &Path,
        quad_name: &str,
        track_file: &Path,
    ) -> Result<PlannerOutput, PlannerError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Files produced by a planner run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerOutput {
    pub traj_file: PathBuf,
    pub wpt_file: PathBuf,
}

/// Runs the planner program as a child process.
///
/// The program is invoked as
/// `<program> <config> <quad> <track> <traj file> <waypoint file>`.
#[derive(Debug, Clone)]
pub struct ProcessPlanner {
    program: PathBuf,
    traj_dir: PathBuf,
    wpt_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("The planner program {0:?} does not exist")]
    ProgramNotFound(PathBuf),

    #[error("The track file path {0:?} has no file name")]
    InvalidTrackFile(PathBuf),

    #[error("Cannot create the planner output directory {0:?}: {1}")]
    CannotCreateOutputDir(PathBuf, std::io::Error),

    #[error("Cannot start the planner: {0}")]
    SpawnError(std::io::Error),

    #[error("The planner failed (exit code {code:?}): {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ProcessPlanner {
    pub fn new<P, Q, R>(program: P, traj_dir: Q, wpt_dir: R) -> Self
    where
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
        R: Into<PathBuf>,
    {
        Self {
            program: program.into(),
            traj_dir: traj_dir.into(),
            wpt_dir: wpt_dir.into(),
        }
    }

    pub fn from_params(params: &PlannerParams) -> Self {
        Self::new(
            params.program_path.clone(),
            params.traj_dir.clone(),
            params.wpt_dir.clone(),
        )
    }

    /// The files the planner will write for a track, named after the track
    /// file's stem.
    pub fn output_paths(&self, track_file: &Path) -> Result<PlannerOutput, PlannerError> {
        let stem = track_file
            .file_stem()
            .ok_or_else(|| PlannerError::InvalidTrackFile(track_file.to_path_buf()))?;

        let mut traj_file = self.traj_dir.join(stem);
        traj_file.set_extension("csv");
        let mut wpt_file = self.wpt_dir.join(stem);
        wpt_file.set_extension("yaml");

        Ok(PlannerOutput {
            traj_file,
            wpt_file,
        })
    }
}

impl TrajPlanner for ProcessPlanner {
    fn submit(
        &self,
        config_path: &Path,
        quad_name: &str,
        track_file: &Path,
    ) -> Result<PlannerOutput, PlannerError> {
        if !self.program.exists() {
            return Err(PlannerError::ProgramNotFound(self.program.clone()));
        }

        let output = self.output_paths(track_file)?;

        for dir in &[&self.traj_dir, &self.wpt_dir] {
            fs::create_dir_all(dir)
                .map_err(|e| PlannerError::CannotCreateOutputDir(dir.to_path_buf(), e))?;
        }

        info!("Running the planner on {:?}", track_file);
        debug!(
            "Planner command: {:?} {:?} {} {:?} {:?} {:?}",
            self.program, config_path, quad_name, track_file, output.traj_file, output.wpt_file
        );

        let result = Command::new(&self.program)
            .arg(config_path)
            .arg(quad_name)
            .arg(track_file)
            .arg(&output.traj_file)
            .arg(&output.wpt_file)
            .output()
            .map_err(PlannerError::SpawnError)?;

        for line in String::from_utf8_lossy(&result.stdout).lines() {
            info!("[planner] {}", line);
        }

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            warn!("The planner exited with {:?}", result.status.code());
            return Err(PlannerError::NonZeroExit {
                code: result.status.code(),
                stderr,
            });
        }

        info!("Planner finished, trajectory in {:?}", output.traj_file);

        Ok(output)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("race_planner_{}_{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_output_paths() {
        let planner = ProcessPlanner::new("/bin/planner", "/out/traj", "/out/wpt");
        let out = planner
            .output_paths(Path::new("/tracks/course_1.yaml"))
            .unwrap();

        assert_eq!(out.traj_file, Path::new("/out/traj/course_1.csv"));
        assert_eq!(out.wpt_file, Path::new("/out/wpt/course_1.yaml"));
    }

    #[test]
    fn test_missing_program() {
        let planner = ProcessPlanner::new("/definitely/not/a/planner", "/tmp", "/tmp");

        assert!(matches!(
            planner.submit(Path::new("cfg"), "quad", Path::new("track.yaml")),
            Err(PlannerError::ProgramNotFound(_))
        ));
    }

    // The shell runs the "config" file as a script, with the remaining
    // planner arguments as its positional parameters.
    #[cfg(unix)]
    #[test]
    fn test_successful_run() {
        let dir = temp_dir("ok");
        let script = dir.join("planner.sh");
        fs::write(&script, "echo planning \"$1\"\ntouch \"$3\" \"$4\"\n").unwrap();

        let planner = ProcessPlanner::new("/bin/sh", dir.join("traj"), dir.join("wpt"));
        let out = planner
            .submit(&script, "quad", &dir.join("track.yaml"))
            .unwrap();

        assert!(out.traj_file.exists());
        assert!(out.wpt_file.exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit() {
        let dir = temp_dir("fail");
        let script = dir.join("planner.sh");
        fs::write(&script, "echo 'infeasible track' >&2\nexit 3\n").unwrap();

        let planner = ProcessPlanner::new("/bin/sh", dir.join("traj"), dir.join("wpt"));
        let res = planner.submit(&script, "quad", &dir.join("track.yaml"));

        match res {
            Err(PlannerError::NonZeroExit { code, stderr }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "infeasible track");
            }
            r => panic!("Unexpected result {:?}", r),
        }

        fs::remove_dir_all(&dir).unwrap();
    }
}
