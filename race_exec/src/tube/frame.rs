//! Tangent estimation and per-sample orthonormal frames

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};
use nalgebra::{Matrix3, Unit, Vector3};

use super::TubeError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Raw tangents with a norm below this are treated as degenerate.
pub const DEGENERATE_TANGENT_NORM: f64 = 1e-12;

/// Angle below which a tangent is considered parallel to the x axis.
pub const PARALLEL_TOLERANCE_RAD: f64 = 1e-3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A local orthonormal frame at a centreline sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrenetFrame {
    pub tangent: Unit<Vector3<f64>>,
    pub normal: Unit<Vector3<f64>>,
    pub binormal: Unit<Vector3<f64>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FrenetFrame {
    /// Build a frame around a tangent.
    ///
    /// The normal is perpendicular to both the tangent and the x axis, or the
    /// y axis when the tangent lies within [`PARALLEL_TOLERANCE_RAD`] of the
    /// x axis in either direction.
    pub fn from_tangent(tangent: Unit<Vector3<f64>>) -> Self {
        let reference = if tangent.dot(&Vector3::x()).abs() > PARALLEL_TOLERANCE_RAD.cos() {
            trace!("Tangent parallel to x, using y as the reference axis");
            Vector3::y()
        } else {
            Vector3::x()
        };

        let normal = Unit::new_normalize(tangent.cross(&reference));
        let binormal = Unit::new_normalize(tangent.cross(&normal));

        Self {
            tangent,
            normal,
            binormal,
        }
    }

    /// Rotation from the local frame to the world frame. The columns are the
    /// normal, binormal and tangent, so local z runs along the centreline.
    pub fn basis(&self) -> Matrix3<f64> {
        Matrix3::from_columns(&[
            self.normal.into_inner(),
            self.binormal.into_inner(),
            self.tangent.into_inner(),
        ])
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Estimate the unit tangent at every sample of a centreline.
///
/// Tangents are the component-wise gradient of the positions, using central
/// differences inside the sequence and one-sided differences at each end.
/// A degenerate tangent takes the previous sample's tangent, or if there is
/// none the first valid tangent after it. If every tangent is degenerate the
/// tangents are all `+z`.
pub fn estimate_tangents(positions: &[Vector3<f64>]) -> Result<Vec<Unit<Vector3<f64>>>, TubeError> {
    let n = positions.len();
    if n == 0 {
        return Err(TubeError::EmptyCentreline);
    }
    if let Some(i) = positions
        .iter()
        .position(|p| p.iter().any(|v| !v.is_finite()))
    {
        return Err(TubeError::NonFinitePosition(i));
    }

    let raw: Vec<Option<Unit<Vector3<f64>>>> = (0..n)
        .map(|i| {
            let d = gradient(positions, i);
            Unit::try_new(d, DEGENERATE_TANGENT_NORM)
        })
        .collect();

    let first_valid = match raw.iter().find_map(|t| *t) {
        Some(t) => t,
        None => {
            debug!("Every centreline tangent is degenerate, using +z");
            return Ok(vec![Vector3::z_axis(); n]);
        }
    };

    let mut tangents = Vec::with_capacity(n);
    let mut previous: Option<Unit<Vector3<f64>>> = None;

    for (i, t) in raw.into_iter().enumerate() {
        let accepted = match (t, previous) {
            (Some(t), _) => t,
            (None, Some(prev)) => {
                debug!("Degenerate tangent at sample {}, carrying forward", i);
                prev
            }
            (None, None) => {
                debug!("Degenerate tangent at sample {}, carrying backward", i);
                first_valid
            }
        };
        tangents.push(accepted);
        previous = Some(accepted);
    }

    Ok(tangents)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Gradient of the positions with respect to sample index.
fn gradient(p: &[Vector3<f64>], i: usize) -> Vector3<f64> {
    let n = p.len();

    if n < 2 {
        Vector3::zeros()
    } else if i == 0 {
        p[1] - p[0]
    } else if i == n - 1 {
        p[n - 1] - p[n - 2]
    } else {
        (p[i + 1] - p[i - 1]) * 0.5
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_orthonormal(f: &FrenetFrame) {
        assert_relative_eq!(f.tangent.dot(&f.normal), 0.0, epsilon = 1e-12);
        assert_relative_eq!(f.tangent.dot(&f.binormal), 0.0, epsilon = 1e-12);
        assert_relative_eq!(f.normal.dot(&f.binormal), 0.0, epsilon = 1e-12);
        assert_relative_eq!(f.basis().determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_tangents() {
        let pts = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
        ];
        let t = estimate_tangents(&pts).unwrap();

        assert_relative_eq!(t[0].into_inner(), Vector3::x(), epsilon = 1e-12);
        let diag = Vector3::new(1.0, 1.0, 0.0).normalize();
        assert_relative_eq!(t[1].into_inner(), diag, epsilon = 1e-12);
        assert_relative_eq!(t[2].into_inner(), Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_start_carries_backward() {
        let pts = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 2.0, 0.0),
        ];
        let t = estimate_tangents(&pts).unwrap();

        assert_eq!(t[0], t[1]);
        assert_eq!(
            FrenetFrame::from_tangent(t[0]),
            FrenetFrame::from_tangent(t[1])
        );
        for tan in &t {
            assert!(tan.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_degenerate_end_carries_forward() {
        let pts = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, 2.0),
            Vector3::new(0.0, 0.0, 2.0),
        ];
        let t = estimate_tangents(&pts).unwrap();

        assert_eq!(t[3], t[2]);
        assert!(t.iter().all(|v| v.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn test_all_degenerate() {
        let pts = vec![Vector3::new(1.0, 2.0, 3.0); 4];
        let t = estimate_tangents(&pts).unwrap();

        assert!(t.iter().all(|v| *v == Vector3::z_axis()));
        assert_eq!(estimate_tangents(&pts[..1]).unwrap(), vec![Vector3::z_axis()]);
    }

    #[test]
    fn test_invalid_centreline() {
        assert_eq!(estimate_tangents(&[]), Err(TubeError::EmptyCentreline));
        assert_eq!(
            estimate_tangents(&[Vector3::zeros(), Vector3::new(f64::NAN, 0.0, 0.0)]),
            Err(TubeError::NonFinitePosition(1))
        );
    }

    #[test]
    fn test_frames() {
        for t in [
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 2.0, -0.5),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-1.0, 1e-5, 0.0),
        ]
        .iter()
        {
            let f = FrenetFrame::from_tangent(Unit::new_normalize(*t));
            assert_orthonormal(&f);
            assert!(f.normal.iter().all(|v| v.is_finite()));
        }

        // Tangent along -x still switches the reference axis
        let f = FrenetFrame::from_tangent(-Vector3::x_axis());
        assert_relative_eq!(f.normal.into_inner(), -Vector3::z(), epsilon = 1e-12);
    }
}
