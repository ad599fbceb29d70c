//! # Gate shape catalog
//!
//! The fixed set of gate cross-section variants. Each variant has a fixed
//! set of parameters, a fixed order in which those parameters appear in a
//! track file, and a generator for its outline in world coordinates.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Rotation3, Vector3};
use std::f64::consts::PI;

use crate::{
    error::ValidationError,
    fields::{self, Fields},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Record keys owned by the gate rather than its shape.
pub const RESERVED_FIELDS: [&str; 4] = ["type", "name", "position", "stationary"];

const BALL_ORDER: &[&str] = &[
    "type",
    "name",
    "position",
    "radius",
    "margin",
    "stationary",
];

const TRIANGLE_ORDER: &[&str] = &[
    "type",
    "name",
    "position",
    "rpy",
    "width",
    "height",
    "margin",
    "length",
    "midpoints",
    "stationary",
];

const RECTANGLE_ORDER: &[&str] = &[
    "type",
    "name",
    "position",
    "rpy",
    "width",
    "height",
    "marginW",
    "marginH",
    "length",
    "midpoints",
    "stationary",
];

const PENTAGON_ORDER: &[&str] = &[
    "type",
    "name",
    "position",
    "rpy",
    "radius",
    "margin",
    "length",
    "midpoints",
    "stationary",
];

const HEXAGON_ORDER: &[&str] = &[
    "type",
    "name",
    "position",
    "rpy",
    "side",
    "margin",
    "length",
    "midpoints",
    "stationary",
];

/// Number of azimuth steps in the ball's sphere solid.
const SPHERE_AZIMUTH_STEPS: usize = 20;

/// Number of polar steps in the ball's sphere solid.
const SPHERE_POLAR_STEPS: usize = 10;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Discriminant of the gate shape variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Ball,
    TrianglePrism,
    RectanglePrism,
    PentagonPrism,
    HexagonPrism,
}

/// A gate cross-section together with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum GateShape {
    Ball(Ball),
    TrianglePrism(TrianglePrism),
    RectanglePrism(RectanglePrism),
    PentagonPrism(PentagonPrism),
    HexagonPrism(HexagonPrism),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A spherical gate.
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub radius: f64,
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrianglePrism {
    /// Roll, pitch and yaw in degrees
    pub rpy: Vector3<f64>,
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub length: f64,
    pub midpoints: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectanglePrism {
    /// Roll, pitch and yaw in degrees
    pub rpy: Vector3<f64>,
    pub width: f64,
    pub height: f64,
    pub margin_w: f64,
    pub margin_h: f64,
    pub length: f64,
    pub midpoints: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PentagonPrism {
    /// Roll, pitch and yaw in degrees
    pub rpy: Vector3<f64>,

    /// Circumradius of the pentagon
    pub radius: f64,
    pub margin: f64,
    pub length: f64,
    pub midpoints: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HexagonPrism {
    /// Roll, pitch and yaw in degrees
    pub rpy: Vector3<f64>,

    /// Side length of the hexagon
    pub side: f64,
    pub margin: f64,
    pub length: f64,
    pub midpoints: u32,
}

/// Options controlling outline generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineOptions {
    /// Number of points in a ball's outline circle
    pub ball_points: usize,

    /// If set, a `(radius, margin)` pair which replaces the drawn radius of
    /// balls with `max(radius - margin, 0)`.
    pub radius_override: Option<(f64, f64)>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Ball,
        ShapeKind::TrianglePrism,
        ShapeKind::RectanglePrism,
        ShapeKind::PentagonPrism,
        ShapeKind::HexagonPrism,
    ];

    /// The tag written to the `type` field of track files.
    pub fn tag(self) -> &'static str {
        match self {
            ShapeKind::Ball => "SingleBall",
            ShapeKind::TrianglePrism => "TrianglePrisma",
            ShapeKind::RectanglePrism => "RectanglePrisma",
            ShapeKind::PentagonPrism => "PentagonPrisma",
            ShapeKind::HexagonPrism => "HexagonPrisma",
        }
    }

    /// Descriptive name of the variant.
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Ball => "Ball",
            ShapeKind::TrianglePrism => "TrianglePrism",
            ShapeKind::RectanglePrism => "RectanglePrism",
            ShapeKind::PentagonPrism => "PentagonPrism",
            ShapeKind::HexagonPrism => "HexagonPrism",
        }
    }

    /// Find the variant for either a file tag or a descriptive name.
    pub fn from_tag(tag: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.tag() == tag || k.name() == tag)
            .ok_or_else(|| ValidationError::UnknownShape(tag.to_string()))
    }

    /// The full order of keys in a gate record of this variant.
    pub fn field_order(self) -> &'static [&'static str] {
        match self {
            ShapeKind::Ball => BALL_ORDER,
            ShapeKind::TrianglePrism => TRIANGLE_ORDER,
            ShapeKind::RectanglePrism => RECTANGLE_ORDER,
            ShapeKind::PentagonPrism => PENTAGON_ORDER,
            ShapeKind::HexagonPrism => HEXAGON_ORDER,
        }
    }

    /// The variant-specific parameters, in declared order.
    pub fn shape_fields(self) -> &'static [&'static str] {
        // Every order table is `type, name, position, <shape...>, stationary`
        let order = self.field_order();
        &order[3..order.len() - 1]
    }
}

impl GateShape {
    /// Build a shape of the given kind from its parameter record.
    ///
    /// Keys reserved for the gate (`type`, `name`, `position`,
    /// `stationary`) are ignored. Every missing parameter is reported at
    /// once, in declared order.
    pub fn from_fields(kind: ShapeKind, f: &Fields) -> Result<Self, ValidationError> {
        let missing = fields::missing(f, kind.shape_fields());
        if !missing.is_empty() {
            return Err(ValidationError::missing(kind.name(), missing));
        }

        let unexpected = fields::unexpected(f, kind.shape_fields(), &RESERVED_FIELDS);
        if !unexpected.is_empty() {
            return Err(ValidationError::UnexpectedFields {
                target: kind.name().to_string(),
                fields: unexpected,
            });
        }

        let t = kind.name();

        Ok(match kind {
            ShapeKind::Ball => GateShape::Ball(Ball {
                radius: fields::get_f64(f, t, "radius")?,
                margin: fields::get_f64(f, t, "margin")?,
            }),
            ShapeKind::TrianglePrism => GateShape::TrianglePrism(TrianglePrism {
                rpy: fields::get_vec3(f, t, "rpy")?,
                width: fields::get_f64(f, t, "width")?,
                height: fields::get_f64(f, t, "height")?,
                margin: fields::get_f64(f, t, "margin")?,
                length: fields::get_f64(f, t, "length")?,
                midpoints: fields::get_u32(f, t, "midpoints")?,
            }),
            ShapeKind::RectanglePrism => GateShape::RectanglePrism(RectanglePrism {
                rpy: fields::get_vec3(f, t, "rpy")?,
                width: fields::get_f64(f, t, "width")?,
                height: fields::get_f64(f, t, "height")?,
                margin_w: fields::get_f64(f, t, "marginW")?,
                margin_h: fields::get_f64(f, t, "marginH")?,
                length: fields::get_f64(f, t, "length")?,
                midpoints: fields::get_u32(f, t, "midpoints")?,
            }),
            ShapeKind::PentagonPrism => GateShape::PentagonPrism(PentagonPrism {
                rpy: fields::get_vec3(f, t, "rpy")?,
                radius: fields::get_f64(f, t, "radius")?,
                margin: fields::get_f64(f, t, "margin")?,
                length: fields::get_f64(f, t, "length")?,
                midpoints: fields::get_u32(f, t, "midpoints")?,
            }),
            ShapeKind::HexagonPrism => GateShape::HexagonPrism(HexagonPrism {
                rpy: fields::get_vec3(f, t, "rpy")?,
                side: fields::get_f64(f, t, "side")?,
                margin: fields::get_f64(f, t, "margin")?,
                length: fields::get_f64(f, t, "length")?,
                midpoints: fields::get_u32(f, t, "midpoints")?,
            }),
        })
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            GateShape::Ball(_) => ShapeKind::Ball,
            GateShape::TrianglePrism(_) => ShapeKind::TrianglePrism,
            GateShape::RectanglePrism(_) => ShapeKind::RectanglePrism,
            GateShape::PentagonPrism(_) => ShapeKind::PentagonPrism,
            GateShape::HexagonPrism(_) => ShapeKind::HexagonPrism,
        }
    }

    /// The shape parameters as a record, in declared order.
    pub fn to_fields(&self) -> Fields {
        let mut f = Fields::new();

        match self {
            GateShape::Ball(s) => {
                fields::push(&mut f, "radius", fields::float_value(s.radius));
                fields::push(&mut f, "margin", fields::float_value(s.margin));
            }
            GateShape::TrianglePrism(s) => {
                fields::push(&mut f, "rpy", fields::floats_value(s.rpy.as_slice()));
                fields::push(&mut f, "width", fields::float_value(s.width));
                fields::push(&mut f, "height", fields::float_value(s.height));
                fields::push(&mut f, "margin", fields::float_value(s.margin));
                fields::push(&mut f, "length", fields::float_value(s.length));
                fields::push(&mut f, "midpoints", fields::u32_value(s.midpoints));
            }
            GateShape::RectanglePrism(s) => {
                fields::push(&mut f, "rpy", fields::floats_value(s.rpy.as_slice()));
                fields::push(&mut f, "width", fields::float_value(s.width));
                fields::push(&mut f, "height", fields::float_value(s.height));
                fields::push(&mut f, "marginW", fields::float_value(s.margin_w));
                fields::push(&mut f, "marginH", fields::float_value(s.margin_h));
                fields::push(&mut f, "length", fields::float_value(s.length));
                fields::push(&mut f, "midpoints", fields::u32_value(s.midpoints));
            }
            GateShape::PentagonPrism(s) => {
                fields::push(&mut f, "rpy", fields::floats_value(s.rpy.as_slice()));
                fields::push(&mut f, "radius", fields::float_value(s.radius));
                fields::push(&mut f, "margin", fields::float_value(s.margin));
                fields::push(&mut f, "length", fields::float_value(s.length));
                fields::push(&mut f, "midpoints", fields::u32_value(s.midpoints));
            }
            GateShape::HexagonPrism(s) => {
                fields::push(&mut f, "rpy", fields::floats_value(s.rpy.as_slice()));
                fields::push(&mut f, "side", fields::float_value(s.side));
                fields::push(&mut f, "margin", fields::float_value(s.margin));
                fields::push(&mut f, "length", fields::float_value(s.length));
                fields::push(&mut f, "midpoints", fields::u32_value(s.midpoints));
            }
        }

        f
    }

    /// Closed outline of the shape placed at `position`, in world
    /// coordinates. The first point is repeated at the end.
    ///
    /// Prisms are drawn as their cross-section polygon rotated by `rpy`,
    /// balls as a horizontal circle.
    pub fn outline(&self, position: &Vector3<f64>, opts: &OutlineOptions) -> Vec<Vector3<f64>> {
        let (rpy, local) = match self {
            GateShape::Ball(b) => {
                let r = opts.ball_radius(b.radius);
                return circle(position, r, opts.ball_points);
            }
            GateShape::TrianglePrism(s) => {
                let hw = 0.5 * s.width;
                let hh = 0.5 * s.height;
                (s.rpy, vec![(-hh, hw), (hh, 0.0), (-hh, -hw)])
            }
            GateShape::RectanglePrism(s) => {
                let hw = 0.5 * s.width;
                let hh = 0.5 * s.height;
                (s.rpy, vec![(-hh, hw), (-hh, -hw), (hh, -hw), (hh, hw)])
            }
            GateShape::PentagonPrism(s) => {
                let ar = s.radius;
                let (sin54, cos54) = 54f64.to_radians().sin_cos();
                let nd = ar * cos54;
                let on = ar * sin54;
                let bc = 2.0 * nd;
                let fc = bc * sin54;
                let of = ar - bc * cos54;
                (
                    s.rpy,
                    vec![(-on, nd), (of, fc), (ar, 0.0), (of, -fc), (-on, -nd)],
                )
            }
            GateShape::HexagonPrism(s) => {
                let a = s.side;
                let h = 0.5 * a * 60f64.to_radians().tan();
                (
                    s.rpy,
                    vec![
                        (-h, 0.5 * a),
                        (0.0, a),
                        (h, 0.5 * a),
                        (h, -0.5 * a),
                        (0.0, -a),
                        (-h, -0.5 * a),
                    ],
                )
            }
        };

        let rot = rpy_to_rotation(&rpy);
        let mut points: Vec<Vector3<f64>> = local
            .iter()
            .map(|&(x, y)| position + rot * Vector3::new(x, y, 0.0))
            .collect();

        if let Some(&first) = points.first() {
            points.push(first);
        }

        points
    }

    /// Sphere solid for ball gates, as an azimuth-major grid of points.
    ///
    /// The solid's radius is `max(radius - margin, 0)`, or the override if
    /// one is given. Returns `None` for prisms.
    pub fn ball_sphere(
        &self,
        position: &Vector3<f64>,
        opts: &OutlineOptions,
    ) -> Option<Vec<Vec<Vector3<f64>>>> {
        let ball = match self {
            GateShape::Ball(b) => b,
            _ => return None,
        };

        let r = opts.ball_radius((ball.radius - ball.margin).max(0.0));

        let grid = (0..SPHERE_AZIMUTH_STEPS)
            .map(|i| {
                let u = 2.0 * PI * i as f64 / (SPHERE_AZIMUTH_STEPS - 1) as f64;
                (0..SPHERE_POLAR_STEPS)
                    .map(|j| {
                        let v = PI * j as f64 / (SPHERE_POLAR_STEPS - 1) as f64;
                        position
                            + r * Vector3::new(u.cos() * v.sin(), u.sin() * v.sin(), v.cos())
                    })
                    .collect()
            })
            .collect();

        Some(grid)
    }
}

impl OutlineOptions {
    /// Drawn ball radius, `radius` unless overridden.
    fn ball_radius(&self, radius: f64) -> f64 {
        match self.radius_override {
            Some((r, m)) => (r - m).max(0.0),
            None => radius,
        }
    }
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            ball_points: 50,
            radius_override: None,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Rotation matrix for roll, pitch and yaw given in degrees,
/// `R = Rz(yaw) * Ry(pitch) * Rx(roll)`.
pub fn rpy_to_rotation(rpy_deg: &Vector3<f64>) -> Rotation3<f64> {
    Rotation3::from_euler_angles(
        rpy_deg[0].to_radians(),
        rpy_deg[1].to_radians(),
        rpy_deg[2].to_radians(),
    )
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Horizontal circle of `num` points, the last equal to the first.
fn circle(centre: &Vector3<f64>, r: f64, num: usize) -> Vec<Vector3<f64>> {
    if num < 2 {
        return vec![*centre + Vector3::new(r, 0.0, 0.0); num];
    }

    (0..num)
        .map(|i| {
            let a = 2.0 * PI * (i % (num - 1)) as f64 / (num - 1) as f64;
            centre + Vector3::new(r * a.cos(), r * a.sin(), 0.0)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn record(text: &str) -> Fields {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_tags() {
        for kind in ShapeKind::ALL.iter() {
            assert_eq!(ShapeKind::from_tag(kind.tag()).unwrap(), *kind);
            assert_eq!(ShapeKind::from_tag(kind.name()).unwrap(), *kind);
        }

        assert_eq!(
            ShapeKind::from_tag("FreeCorridor"),
            Err(ValidationError::UnknownShape("FreeCorridor".into()))
        );
    }

    #[test]
    fn test_field_tables() {
        assert_eq!(ShapeKind::Ball.shape_fields(), &["radius", "margin"]);
        assert_eq!(
            ShapeKind::RectanglePrism.shape_fields(),
            &["rpy", "width", "height", "marginW", "marginH", "length", "midpoints"]
        );

        for kind in ShapeKind::ALL.iter() {
            let order = kind.field_order();
            assert_eq!(&order[..3], &["type", "name", "position"]);
            assert_eq!(order[order.len() - 1], "stationary");
        }
    }

    #[test]
    fn test_missing_fields_in_order() {
        let err = GateShape::from_fields(ShapeKind::TrianglePrism, &record("rpy: [0, 0, 0]\n"))
            .unwrap_err();

        assert_eq!(
            err.missing_fields().unwrap(),
            &["width", "height", "margin", "length", "midpoints"]
        );
    }

    #[test]
    fn test_unexpected_fields() {
        let err = GateShape::from_fields(
            ShapeKind::Ball,
            &record("type: 'SingleBall'\nradius: 1\nmargin: 0\nside: 2\n"),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::UnexpectedFields {
                target: "Ball".into(),
                fields: vec!["side".into()]
            }
        );
    }

    #[test]
    fn test_fields_round_trip() {
        let shape = GateShape::from_fields(
            ShapeKind::RectanglePrism,
            &record(
                "rpy: [0, 0, -90]\nwidth: 1.5\nheight: 1\nmarginW: 0.1\nmarginH: 0.2\n\
                 length: 0.3\nmidpoints: 2\n",
            ),
        )
        .unwrap();

        match &shape {
            GateShape::RectanglePrism(r) => {
                assert_eq!(r.rpy, Vector3::new(0.0, 0.0, -90.0));
                assert_eq!(r.height, 1.0);
                assert_eq!(r.midpoints, 2);
            }
            _ => panic!("Wrong shape variant"),
        }

        let f = shape.to_fields();
        assert_eq!(
            fields::key_names(&f),
            ShapeKind::RectanglePrism.shape_fields()
        );
        assert_eq!(
            GateShape::from_fields(ShapeKind::RectanglePrism, &f).unwrap(),
            shape
        );
    }

    #[test]
    fn test_rotation_matches_rpy_convention() {
        let rpy = Vector3::<f64>::new(10.0, 20.0, 30.0);
        let (r, p, y) = (
            rpy[0].to_radians(),
            rpy[1].to_radians(),
            rpy[2].to_radians(),
        );
        let rot = rpy_to_rotation(&rpy);
        let m = rot.matrix();

        assert_relative_eq!(m[(0, 0)], y.cos() * p.cos(), epsilon = 1e-12);
        assert_relative_eq!(m[(1, 0)], y.sin() * p.cos(), epsilon = 1e-12);
        assert_relative_eq!(m[(2, 0)], -p.sin(), epsilon = 1e-12);
        assert_relative_eq!(
            m[(0, 1)],
            y.cos() * p.sin() * r.sin() - y.sin() * r.cos(),
            epsilon = 1e-12
        );
        assert_relative_eq!(m[(2, 1)], p.cos() * r.sin(), epsilon = 1e-12);
        assert_relative_eq!(m[(2, 2)], p.cos() * r.cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_polygon_outlines() {
        let origin = Vector3::zeros();
        let opts = OutlineOptions::default();

        let pent = GateShape::PentagonPrism(PentagonPrism {
            rpy: Vector3::zeros(),
            radius: 2.0,
            margin: 0.0,
            length: 0.0,
            midpoints: 0,
        });
        let pts = pent.outline(&origin, &opts);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0], pts[5]);
        for p in &pts {
            assert_relative_eq!(p.norm(), 2.0, epsilon = 1e-12);
        }

        let hex = GateShape::HexagonPrism(HexagonPrism {
            rpy: Vector3::zeros(),
            side: 1.5,
            margin: 0.0,
            length: 0.0,
            midpoints: 0,
        });
        let pts = hex.outline(&origin, &opts);
        assert_eq!(pts.len(), 7);
        for w in pts.windows(2) {
            assert_relative_eq!((w[1] - w[0]).norm(), 1.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rotated_rectangle_outline() {
        let rect = GateShape::RectanglePrism(RectanglePrism {
            rpy: Vector3::new(0.0, 0.0, 90.0),
            width: 2.0,
            height: 4.0,
            margin_w: 0.0,
            margin_h: 0.0,
            length: 0.0,
            midpoints: 0,
        });

        let pts = rect.outline(&Vector3::new(1.0, 1.0, 1.0), &OutlineOptions::default());

        // (-hh, hw) = (-2, 1) rotated by 90 deg about z is (-1, -2)
        assert_relative_eq!(pts[0], Vector3::new(0.0, -1.0, 1.0), epsilon = 1e-12);
        assert_eq!(pts.len(), 5);
    }

    #[test]
    fn test_ball_outline_and_sphere() {
        let ball = GateShape::Ball(Ball {
            radius: 0.5,
            margin: 0.2,
        });
        let pos = Vector3::new(3.0, 0.0, 1.0);

        let pts = ball.outline(&pos, &OutlineOptions::default());
        assert_eq!(pts.len(), 50);
        for p in &pts {
            assert_relative_eq!((p - pos).norm(), 0.5, epsilon = 1e-12);
        }
        assert_relative_eq!(pts[0], pts[49], epsilon = 1e-12);

        let sphere = ball.ball_sphere(&pos, &OutlineOptions::default()).unwrap();
        assert_eq!(sphere.len(), 20);
        assert_eq!(sphere[0].len(), 10);
        assert_relative_eq!((sphere[4][3] - pos).norm(), 0.3, epsilon = 1e-12);

        let opts = OutlineOptions {
            radius_override: Some((0.1, 0.4)),
            ..Default::default()
        };
        for p in ball.outline(&pos, &opts) {
            assert_relative_eq!(p, pos, epsilon = 1e-12);
        }
    }
}
