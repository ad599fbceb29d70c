//! # Race library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to
//! access items defined inside the race executable crate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Executable parameters
pub mod params;

/// Planner client - runs the external trajectory planner on a track file
pub mod planner_client;

/// Pipeline - track to planned trajectory to swept tube
pub mod pipeline;

/// Trajectories - planner output loading and uniform resampling
pub mod traj;

/// Tube - frames, proximity radius profile and the tube sweep
pub mod tube;
