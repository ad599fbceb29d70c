//! # Tube sweep
//!
//! Builds the tube mesh: one ring of points per centreline sample, lying in
//! the plane perpendicular to the local tangent.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use nalgebra::Vector3;
use serde::Serialize;
use std::f64::consts::PI;

use super::{
    frame::{estimate_tangents, FrenetFrame},
    TubeError,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default number of points in each ring.
pub const DEFAULT_RING_POINTS: usize = 20;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Radius of the tube along the centreline.
#[derive(Debug, Clone, PartialEq)]
pub enum TubeRadius {
    /// The same radius at every sample
    Constant(f64),

    /// One radius per centreline sample
    PerSample(Vec<f64>),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The frame and radius of the tube at one centreline sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TubeSample {
    pub position_m: Vector3<f64>,
    pub tangent: Vector3<f64>,
    pub normal: Vector3<f64>,
    pub binormal: Vector3<f64>,
    pub radius_m: f64,
}

/// A swept tube, stored as a grid of `num_samples x ring_points` vertices.
///
/// Ring `i` belongs to sample `i`. Within a ring the points run round the
/// tangent in angle order, and the last point of every ring is the same as
/// the first.
#[derive(Debug, Clone, PartialEq)]
pub struct TubeMesh {
    ring_points: usize,
    samples: Vec<TubeSample>,
    vertices: Vec<Vector3<f64>>,
}

/// A mesh vertex in archive form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TubeVertexRecord {
    pub sample: usize,
    pub ring: usize,
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,
    pub radius_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TubeRadius {
    fn validate(&self, num_samples: usize) -> Result<(), TubeError> {
        let check = |r: f64| {
            if r.is_finite() && r >= 0.0 {
                Ok(())
            } else {
                Err(TubeError::InvalidRadius(r))
            }
        };

        match self {
            TubeRadius::Constant(r) => check(*r),
            TubeRadius::PerSample(radii) => {
                if radii.len() != num_samples {
                    return Err(TubeError::LengthMismatch {
                        what: "radii",
                        expected: num_samples,
                        found: radii.len(),
                    });
                }
                radii.iter().try_for_each(|r| check(*r))
            }
        }
    }

    fn at(&self, i: usize) -> f64 {
        match self {
            TubeRadius::Constant(r) => *r,
            TubeRadius::PerSample(radii) => radii[i],
        }
    }
}

impl TubeMesh {
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn ring_points(&self) -> usize {
        self.ring_points
    }

    pub fn samples(&self) -> &[TubeSample] {
        &self.samples
    }

    /// All vertices, ring by ring.
    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    /// The ring of vertices around sample `i`.
    pub fn ring(&self, i: usize) -> Option<&[Vector3<f64>]> {
        let start = i.checked_mul(self.ring_points)?;
        self.vertices.get(start..start + self.ring_points)
    }

    pub fn vertex(&self, sample: usize, ring: usize) -> Option<&Vector3<f64>> {
        if ring >= self.ring_points {
            return None;
        }
        self.vertices.get(sample * self.ring_points + ring)
    }

    /// Triangle connectivity as indices into [`TubeMesh::vertices`].
    ///
    /// Each quad between consecutive rings and consecutive ring points is
    /// split into two triangles.
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        let k = self.ring_points;
        let n = self.num_samples();
        let mut tris = Vec::with_capacity(2 * n.saturating_sub(1) * k.saturating_sub(1));

        for i in 0..n.saturating_sub(1) {
            for j in 0..k - 1 {
                let a = i * k + j;
                let b = a + 1;
                let c = a + k;
                let d = c + 1;
                tris.push([a, c, b]);
                tris.push([b, c, d]);
            }
        }

        tris
    }

    /// One record per vertex, for archiving.
    pub fn vertex_records(&self) -> Vec<TubeVertexRecord> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(idx, v)| {
                let sample = idx / self.ring_points;
                TubeVertexRecord {
                    sample,
                    ring: idx % self.ring_points,
                    x_m: v.x,
                    y_m: v.y,
                    z_m: v.z,
                    radius_m: self.samples[sample].radius_m,
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Sweep a circle of `ring_points` points along the centreline `positions`.
///
/// Ring point `j` sits at angle `2 pi j / (ring_points - 1)` about the
/// tangent, measured from the normal towards the binormal, so the first and
/// last points of each ring coincide.
pub fn sweep(
    positions: &[Vector3<f64>],
    radius: &TubeRadius,
    ring_points: usize,
) -> Result<TubeMesh, TubeError> {
    if positions.is_empty() {
        return Err(TubeError::EmptyCentreline);
    }
    if ring_points < 2 {
        return Err(TubeError::TooFewRingPoints(ring_points));
    }
    radius.validate(positions.len())?;

    let tangents = estimate_tangents(positions)?;

    // Unit circle in the local frame, the last point is exactly the first
    let segments = ring_points - 1;
    let circle: Vec<(f64, f64)> = (0..ring_points)
        .map(|j| (2.0 * PI * (j % segments) as f64 / segments as f64).sin_cos())
        .map(|(s, c)| (c, s))
        .collect();

    let mut samples = Vec::with_capacity(positions.len());
    let mut vertices = Vec::with_capacity(positions.len() * ring_points);

    for (i, (p, t)) in positions.iter().zip(tangents.into_iter()).enumerate() {
        let frame = FrenetFrame::from_tangent(t);
        let basis = frame.basis();
        let r = radius.at(i);

        for &(c, s) in &circle {
            vertices.push(p + basis * Vector3::new(r * c, r * s, 0.0));
        }

        samples.push(TubeSample {
            position_m: *p,
            tangent: frame.tangent.into_inner(),
            normal: frame.normal.into_inner(),
            binormal: frame.binormal.into_inner(),
            radius_m: r,
        });
    }

    debug!(
        "Swept tube with {} rings of {} points",
        samples.len(),
        ring_points
    );

    Ok(TubeMesh {
        ring_points,
        samples,
        vertices,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn line(n: usize, dir: Vector3<f64>) -> Vec<Vector3<f64>> {
        (0..n).map(|i| dir * i as f64).collect()
    }

    #[test]
    fn test_straight_line_constant_radius() {
        let pts = line(10, Vector3::new(0.3, -0.2, 1.0));
        let mesh = sweep(&pts, &TubeRadius::Constant(1.0), DEFAULT_RING_POINTS).unwrap();

        assert_eq!(mesh.num_samples(), 10);
        assert_eq!(mesh.vertices().len(), 10 * 20);

        for (i, p) in pts.iter().enumerate() {
            let ring = mesh.ring(i).unwrap();
            for v in ring {
                assert_relative_eq!((v - p).norm(), 1.0, epsilon = 1e-12);
                // Rings lie in the plane perpendicular to the line
                assert_relative_eq!((v - p).dot(&mesh.samples()[i].tangent), 0.0, epsilon = 1e-12);
            }
            assert_eq!(ring[0], ring[19]);
        }
    }

    #[test]
    fn test_per_sample_radius() {
        let pts = line(3, Vector3::x());
        let mesh = sweep(&pts, &TubeRadius::PerSample(vec![0.5, 1.0, 0.0]), 5).unwrap();

        for (i, r) in [0.5, 1.0, 0.0].iter().enumerate() {
            for v in mesh.ring(i).unwrap() {
                assert_relative_eq!((v - pts[i]).norm(), *r, epsilon = 1e-12);
            }
            assert_eq!(mesh.samples()[i].radius_m, *r);
        }
    }

    #[test]
    fn test_ring_angles() {
        let pts = line(2, Vector3::z());
        let mesh = sweep(&pts, &TubeRadius::Constant(2.0), 5).unwrap();
        let s = mesh.samples()[0];

        // Quarter turns from the normal towards the binormal
        assert_relative_eq!(*mesh.vertex(0, 0).unwrap(), s.normal * 2.0, epsilon = 1e-12);
        assert_relative_eq!(*mesh.vertex(0, 1).unwrap(), s.binormal * 2.0, epsilon = 1e-12);
        assert_relative_eq!(*mesh.vertex(0, 2).unwrap(), -s.normal * 2.0, epsilon = 1e-12);
        assert!(mesh.vertex(0, 5).is_none());
    }

    #[test]
    fn test_duplicate_samples_have_no_nan() {
        let mut pts = line(5, Vector3::new(1.0, 1.0, 0.0));
        pts.insert(0, Vector3::zeros());

        let mesh = sweep(&pts, &TubeRadius::Constant(0.5), 8).unwrap();

        assert!(mesh.vertices().iter().all(|v| v.iter().all(|c| c.is_finite())));
        assert_eq!(mesh.samples()[0].normal, mesh.samples()[1].normal);
        assert_eq!(mesh.samples()[0].binormal, mesh.samples()[1].binormal);
    }

    #[test]
    fn test_triangles() {
        let mesh = sweep(&line(3, Vector3::x()), &TubeRadius::Constant(1.0), 4).unwrap();
        let tris = mesh.triangles();

        assert_eq!(tris.len(), 2 * 2 * 3);
        assert_eq!(tris[0], [0, 4, 1]);
        assert_eq!(tris[1], [1, 4, 5]);
        assert!(tris.iter().flatten().all(|&i| i < mesh.vertices().len()));
    }

    #[test]
    fn test_vertex_records() {
        let mesh = sweep(&line(2, Vector3::y()), &TubeRadius::Constant(0.25), 3).unwrap();
        let recs = mesh.vertex_records();

        assert_eq!(recs.len(), 6);
        assert_eq!((recs[4].sample, recs[4].ring), (1, 1));
        assert_eq!(recs[4].radius_m, 0.25);
        assert_eq!(recs[4].x_m, mesh.vertex(1, 1).unwrap().x);
    }

    #[test]
    fn test_invalid_inputs() {
        let pts = line(3, Vector3::x());

        assert_eq!(
            sweep(&[], &TubeRadius::Constant(1.0), 20),
            Err(TubeError::EmptyCentreline)
        );
        assert_eq!(
            sweep(&pts, &TubeRadius::Constant(1.0), 1),
            Err(TubeError::TooFewRingPoints(1))
        );
        assert_eq!(
            sweep(&pts, &TubeRadius::PerSample(vec![1.0; 2]), 20),
            Err(TubeError::LengthMismatch {
                what: "radii",
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            sweep(&pts, &TubeRadius::Constant(-1.0), 20),
            Err(TubeError::InvalidRadius(-1.0))
        );
    }
}
