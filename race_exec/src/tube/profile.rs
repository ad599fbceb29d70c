//! # Waypoint proximity profile
//!
//! Computes a per-sample tube radius which narrows close to the planner's
//! waypoints and widens between them. Each dense sample is matched to the
//! waypoint segment bracketing its time, and its radius is a logistic
//! function of the distance to the nearer end of that segment:
//!
//! ```text
//! r(d) = scale * (inner + (outer - inner) * logistic(rate * (d - bias)))
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use nalgebra::Vector3;
use serde::Deserialize;

use super::TubeError;
use crate::traj::Waypoints;
use util::maths::{clamp, logistic};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the proximity profile.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ProfileParams {
    /// Radius far below the bias distance, i.e. at the waypoints.
    ///
    /// Units: meters
    pub inner_radius_m: f64,

    /// Radius far above the bias distance.
    ///
    /// Units: meters
    pub outer_radius_m: f64,

    /// Steepness of the transition.
    ///
    /// Units: 1/meters
    pub rate: f64,

    /// Distance at which the radius is half way between inner and outer.
    ///
    /// Units: meters
    pub bias_m: f64,

    /// Uniform scale applied to the final radius
    #[serde(default = "default_scale")]
    pub scale: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ProfileParams {
    /// Check the parameters describe a bounded, non-decreasing profile.
    pub fn validate(&self) -> Result<(), TubeError> {
        let all_finite = [
            self.inner_radius_m,
            self.outer_radius_m,
            self.rate,
            self.bias_m,
            self.scale,
        ]
        .iter()
        .all(|v| v.is_finite());

        if !all_finite {
            return Err(TubeError::InvalidProfile(
                "all parameters must be finite".into(),
            ));
        }
        if self.inner_radius_m < 0.0 || self.outer_radius_m < self.inner_radius_m {
            return Err(TubeError::InvalidProfile(format!(
                "expected 0 <= inner ({}) <= outer ({})",
                self.inner_radius_m, self.outer_radius_m
            )));
        }
        if self.rate < 0.0 || self.scale < 0.0 {
            return Err(TubeError::InvalidProfile(
                "rate and scale must be non-negative".into(),
            ));
        }

        Ok(())
    }

    /// Radius at a distance `distance_m` from the nearest waypoint.
    pub fn radius_at(&self, distance_m: f64) -> f64 {
        let range = self.outer_radius_m - self.inner_radius_m;
        let s = logistic(self.rate * (distance_m - self.bias_m));
        self.scale * (self.inner_radius_m + range * s)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Index `idx` of the waypoint segment `[idx - 1, idx]` bracketing time `t`.
///
/// This is the first index where `wps_t[idx] > t`, searched over all but the
/// last waypoint and clamped into `1..=M-1`, so times before the first
/// waypoint use the first segment and times after the last use the final
/// segment. `wps_t` must be increasing, and `None` is returned if it holds
/// fewer than two times.
pub fn bracket_index(wps_t: &[f64], t: f64) -> Option<usize> {
    let m = wps_t.len();
    if m < 2 {
        return None;
    }

    let idx = wps_t[..m - 1].partition_point(|&w| w <= t);
    Some(clamp(idx, 1, m - 1))
}

/// Radius at every dense sample, from the distance to the nearer end of the
/// waypoint segment bracketing the sample's time.
pub fn proximity_radii(
    t_s: &[f64],
    positions_m: &[Vector3<f64>],
    waypoints: &Waypoints,
    params: &ProfileParams,
) -> Result<Vec<f64>, TubeError> {
    if t_s.len() != positions_m.len() {
        return Err(TubeError::LengthMismatch {
            what: "sample positions",
            expected: t_s.len(),
            found: positions_m.len(),
        });
    }
    if waypoints.len() < 2 {
        return Err(TubeError::TooFewWaypoints(waypoints.len()));
    }
    params.validate()?;

    let wps = waypoints.positions_m();
    let wps_t = waypoints.t_s();

    let radii = t_s
        .iter()
        .zip(positions_m.iter())
        .map(|(&t, p)| {
            let idx =
                bracket_index(wps_t, t).ok_or_else(|| TubeError::TooFewWaypoints(wps_t.len()))?;
            let d = (p - wps[idx - 1]).norm().min((p - wps[idx]).norm());
            Ok(params.radius_at(d))
        })
        .collect::<Result<Vec<f64>, TubeError>>()?;

    debug!(
        "Computed proximity radii for {} samples against {} waypoints",
        radii.len(),
        wps.len()
    );

    Ok(radii)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_scale() -> f64 {
    1.0
}
