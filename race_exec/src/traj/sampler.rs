//! # Trajectory sampler
//!
//! Resamples a sparse trajectory onto a dense, uniformly spaced time grid
//! spanning the whole trajectory. Every scalar channel is interpolated
//! linearly and independently, and values are clamped to the end samples so
//! the sampler never extrapolates.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::Serialize;

use super::{TrajError, Trajectory};
use util::maths::{interp, linspace};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default number of dense samples.
pub const DEFAULT_NUM_SAMPLES: usize = 5000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A trajectory sampled on a uniform time grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DenseTrajectory {
    pub t_s: Vec<f64>,
    pub position_m: Vec<Vector3<f64>>,
    pub velocity_ms: Vec<Vector3<f64>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DenseTrajectory {
    pub fn len(&self) -> usize {
        self.t_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t_s.is_empty()
    }

    /// Norm of the velocity at each sample.
    pub fn speeds(&self) -> Vec<f64> {
        self.velocity_ms.iter().map(|v| v.norm()).collect()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Sample `traj` at `num_samples` evenly spaced times over
/// `[t_first, t_last]`.
pub fn sample_uniform(traj: &Trajectory, num_samples: usize) -> Result<DenseTrajectory, TrajError> {
    if num_samples == 0 {
        return Err(TrajError::ZeroSamples);
    }
    if traj.is_empty() {
        return Err(TrajError::EmptyTrajectory);
    }

    let (start, end) = traj.time_span();
    let t_s = linspace(start, end, num_samples);

    let xp: Vec<f64> = traj.points().iter().map(|p| p.t_s).collect();

    let position_m = interp_vec3(&t_s, &xp, traj.points().iter().map(|p| p.position_m))?;
    let velocity_ms = interp_vec3(&t_s, &xp, traj.points().iter().map(|p| p.velocity_ms))?;

    Ok(DenseTrajectory {
        t_s,
        position_m,
        velocity_ms,
    })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Interpolate each component of a vector channel at every time in `t_s`.
fn interp_vec3<I>(t_s: &[f64], xp: &[f64], values: I) -> Result<Vec<Vector3<f64>>, TrajError>
where
    I: Iterator<Item = Vector3<f64>>,
{
    let mut channels: [Vec<f64>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for v in values {
        for (c, channel) in channels.iter_mut().enumerate() {
            channel.push(v[c]);
        }
    }

    t_s.iter()
        .map(|&t| {
            let mut out = Vector3::zeros();
            for (c, channel) in channels.iter().enumerate() {
                out[c] = interp(t, xp, channel).ok_or(TrajError::EmptyTrajectory)?;
            }
            Ok(out)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn traj() -> Trajectory {
        Trajectory::from_samples(
            &[0.0, 1.0, 3.0],
            &[
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 2.0, 0.0),
                Vector3::new(1.0, 2.0, 4.0),
            ],
            &[
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 3.0, 0.0),
                Vector3::new(0.0, 0.0, 4.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_uniform_grid() {
        let dense = sample_uniform(&traj(), 7).unwrap();

        assert_eq!(dense.len(), 7);
        assert_eq!(dense.t_s[0], 0.0);
        assert_eq!(dense.t_s[6], 3.0);
        for w in dense.t_s.windows(2) {
            assert_relative_eq!(w[1] - w[0], 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_linear_channels() {
        let dense = sample_uniform(&traj(), 7).unwrap();

        // t = 0.5 lies half way through the first segment
        assert_relative_eq!(dense.position_m[1], Vector3::new(0.5, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(dense.velocity_ms[1], Vector3::new(0.5, 1.5, 0.0), epsilon = 1e-12);

        // t = 2.0 lies half way through the second segment
        assert_relative_eq!(dense.position_m[4], Vector3::new(1.0, 2.0, 2.0), epsilon = 1e-12);

        // End points are reproduced exactly
        assert_eq!(dense.position_m[0], Vector3::zeros());
        assert_eq!(dense.position_m[6], Vector3::new(1.0, 2.0, 4.0));
    }

    #[test]
    fn test_speeds() {
        let dense = sample_uniform(&traj(), 4).unwrap();
        let speeds = dense.speeds();

        assert_eq!(speeds.len(), 4);
        assert_relative_eq!(speeds[0], 1.0);
        assert_relative_eq!(speeds[3], 4.0);
    }

    #[test]
    fn test_edge_cases() {
        assert!(matches!(sample_uniform(&traj(), 0), Err(TrajError::ZeroSamples)));

        let single =
            Trajectory::from_samples(&[2.0], &[Vector3::new(1.0, 1.0, 1.0)], &[Vector3::zeros()])
                .unwrap();
        let dense = sample_uniform(&single, 3).unwrap();
        assert_eq!(dense.t_s, vec![2.0, 2.0, 2.0]);
        assert!(dense.position_m.iter().all(|p| *p == Vector3::new(1.0, 1.0, 1.0)));
    }
}
