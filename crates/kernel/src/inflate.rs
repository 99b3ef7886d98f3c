//! Rounding the flat cage toward a sphere or a capsule.
//!
//! Points move along a fixed direction by the signed distance to the target
//! surface, scaled by the inflation factor: 0 leaves the polyhedron flat, 1
//! puts the point on the surface.

use serde::{Deserialize, Serialize};

use crate::error::CapsidError;
use crate::geometry::{Point3d, Vec3};
use crate::params::Symmetry;

/// Centre of the circle through `p`, `q` and `r`.
pub fn triangle_circumcenter(p: &Point3d, q: &Point3d, r: &Point3d) -> Option<Point3d> {
    let a = *p - *r;
    let b = *q - *r;
    let axb = a.cross(&b);
    let denom = 2.0 * axb.length_squared();
    if denom == 0.0 {
        return None;
    }
    let offset = (b * a.length_squared() - a * b.length_squared()).cross(&axb) / denom;
    Some(*r + offset)
}

/// Centre of the sphere through four points.
pub fn tetrahedron_circumcenter(v0: &Point3d, v1: &Point3d, v2: &Point3d, v3: &Point3d) -> Option<Point3d> {
    let (e1, e2, e3) = (*v1 - *v0, *v2 - *v0, *v3 - *v0);
    let det = e1.dot(&e2.cross(&e3));
    if det == 0.0 {
        return None;
    }
    let offset = (e1.cross(&e2) * e3.length_squared()
        + e3.cross(&e1) * e2.length_squared()
        + e2.cross(&e3) * e1.length_squared())
        / (2.0 * det);
    Some(*v0 + offset)
}

/// Distance of the body ring from the axis.
pub fn body_radius(cage: &[Point3d]) -> f64 {
    cage.get(6).map_or(0.0, Point3d::radial_distance)
}

/// Height of the cylindrical body between the two reference rings.
pub fn body_height(cage: &[Point3d]) -> f64 {
    match (cage.get(4), cage.get(6)) {
        (Some(upper), Some(lower)) => upper.z - lower.z,
        _ => 0.0,
    }
}

/// Move `p` radially toward the sphere of `radius` about the origin.
pub fn spherize(p: &Point3d, radius: f64, factor: f64) -> Point3d {
    let d = p.to_vec3().length();
    if d == 0.0 {
        return *p;
    }
    *p + p.to_vec3() / d * ((radius - d) * factor)
}

/// Target surface for one build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Inflation {
    Sphere {
        radius: f64,
        factor: f64,
    },
    /// A cylinder of `radius` between `±half_height`, closed by two caps
    /// centred on the axis at `±cap_center`.
    Capsule {
        radius: f64,
        half_height: f64,
        cap_center: f64,
        cap_radius: f64,
        factor: f64,
    },
}

impl Inflation {
    /// Sphere through the cage vertices for equilateral builds, a capsule
    /// sized from the cage rings otherwise.
    pub fn for_cage(cage: &[Point3d], symmetry: Symmetry, equilateral: bool, factor: f64) -> Result<Self, CapsidError> {
        let top = *cage
            .first()
            .ok_or_else(|| CapsidError::impossible("cage has no vertices"))?;
        if equilateral {
            return Ok(Inflation::Sphere {
                radius: top.to_vec3().length(),
                factor,
            });
        }

        let radius = body_radius(cage);
        let half_height = body_height(cage) / 2.0;
        let vertex = |i: usize| {
            cage.get(i)
                .copied()
                .ok_or_else(|| CapsidError::impossible(format!("cage has no vertex {i}")))
        };
        let (cap_center, cap_radius) = match symmetry {
            Symmetry::Five => (half_height - radius / 2.0, top.z + radius / 2.0 - half_height),
            Symmetry::Three => {
                let p = vertex(3)?;
                let mirror = Point3d::new(p.x, -p.y, p.z);
                let center = triangle_circumcenter(&top, &p, &mirror)
                    .ok_or_else(|| CapsidError::impossible("3-fold cap points are collinear"))?;
                (center.z, top.distance_to(&center))
            }
            Symmetry::Two => {
                let center = tetrahedron_circumcenter(&top, &vertex(1)?, &vertex(4)?, &vertex(5)?)
                    .ok_or_else(|| CapsidError::impossible("2-fold cap points are coplanar"))?;
                (center.z, top.distance_to(&center))
            }
        };

        Ok(Inflation::Capsule {
            radius,
            half_height,
            cap_center,
            cap_radius,
            factor,
        })
    }

    pub fn apply(&self, p: &Point3d) -> Point3d {
        match *self {
            Inflation::Sphere { radius, factor } => spherize(p, radius, factor),
            Inflation::Capsule {
                radius,
                half_height,
                cap_center,
                cap_radius,
                factor,
            } => {
                // Top cap first. With a negative half height the caps
                // overlap and the top cap takes every point above it.
                let side = if p.z > half_height {
                    Some(1.0)
                } else if p.z < -half_height {
                    Some(-1.0)
                } else {
                    None
                };
                if let Some(side) = side {
                    let center = Point3d::new(0.0, 0.0, side * cap_center);
                    let rim = Point3d::new(0.0, 0.0, side * half_height);
                    let d = cap_radius - p.distance_to(&center);
                    *p + (*p - rim).unit() * (d * factor)
                } else {
                    let r = p.radial_distance();
                    if r == 0.0 {
                        return *p;
                    }
                    *p + Vec3::new(p.x / r, p.y / r, 0.0) * ((radius - r) * factor)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fold::tests::regular;
    use crate::fold::{ico_axis, FoldEdges};
    use capsid_solver::SolverConfig;
    use std::f64::consts::PI;

    #[test]
    fn test_triangle_circumcenter() {
        // Reference value for a 3-fold cap.
        let c = triangle_circumcenter(
            &Point3d::new(0.0, 1.73205081, 2.99162946),
            &Point3d::new(0.0, -2.90587844, 1.38259261),
            &Point3d::new(0.0, 2.90587844, 1.38259261),
        )
        .unwrap();
        assert!(c.x.abs() < 1e-9);
        assert!(c.y.abs() < 1e-7);
        assert!((c.z - 0.495_375_541_299_163_2).abs() < 1e-6);
    }

    #[test]
    fn test_tetrahedron_circumcenter() {
        let v = [
            Point3d::new(1.5, 0.0, 3.21404077),
            Point3d::new(-1.5, 0.0, 3.21404077),
            Point3d::new(-2.61069906, -1.69586289, 1.00261665),
            Point3d::new(2.61069906, 1.69586289, 1.00261665),
        ];
        let c = tetrahedron_circumcenter(&v[0], &v[1], &v[2], &v[3]).unwrap();
        for p in &v {
            assert!((p.distance_to(&c) - v[0].distance_to(&c)).abs() < 1e-9);
        }
        assert!((c.z - 0.425_770_295).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_circumcenters() {
        let a = Point3d::ORIGIN;
        let b = Point3d::new(1.0, 0.0, 0.0);
        let c = Point3d::new(2.0, 0.0, 0.0);
        assert!(triangle_circumcenter(&a, &b, &c).is_none());
        let d = Point3d::new(0.0, 1.0, 0.0);
        let e = Point3d::new(1.0, 1.0, 0.0);
        assert!(tetrahedron_circumcenter(&a, &b, &d, &e).is_none());
    }

    #[test]
    fn test_spherize_factor_bounds() {
        let p = Point3d::new(0.3, -0.4, 0.0);
        assert_eq!(spherize(&p, 2.0, 0.0), p);
        let full = spherize(&p, 2.0, 1.0);
        assert!((full.to_vec3().length() - 2.0).abs() < 1e-12);
        let half = spherize(&p, 2.0, 0.5);
        assert!((half.to_vec3().length() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_spherize_pulls_outside_points_in() {
        let p = Point3d::new(0.0, 0.0, 3.0);
        let q = spherize(&p, 2.0, 1.0);
        assert!((q.z - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_for_equilateral_cage() {
        let cage = ico_axis(Symmetry::Five, &regular(1.0), &SolverConfig::default()).unwrap();
        let inflation = Inflation::for_cage(&cage, Symmetry::Five, true, 1.0).unwrap();
        let Inflation::Sphere { radius, .. } = inflation else {
            panic!("expected a sphere");
        };
        let mid = cage[0].midpoint(&cage[1]);
        assert!((inflation.apply(&mid).to_vec3().length() - radius).abs() < 1e-12);
    }

    /// Fold edges of hex (1, 1) / (2, 0) at unit radius.
    fn elongated() -> FoldEdges {
        FoldEdges {
            a: 3.0,
            b: 2.0 * 3.0f64.sqrt(),
            c: 21.0f64.sqrt(),
            theta: PI / 6.0,
        }
    }

    fn assert_near(p: Point3d, expected: [f64; 3]) {
        let q = Point3d::new(expected[0], expected[1], expected[2]);
        assert!(p.distance_to(&q) < 1e-6, "{p:?} != {q:?}");
    }

    #[test]
    fn test_capsule_body_and_caps() {
        let edges = elongated();
        let cage = ico_axis(Symmetry::Five, &edges, &SolverConfig::default()).unwrap();
        let inflation = Inflation::for_cage(&cage, Symmetry::Five, false, 1.0).unwrap();
        let Inflation::Capsule { radius, half_height, .. } = inflation else {
            panic!("expected a capsule");
        };
        assert!(radius > 0.0 && half_height > 0.0);

        let body = Point3d::new(0.1, 0.2, 0.0);
        let moved = inflation.apply(&body);
        assert!((moved.radial_distance() - radius).abs() < 1e-12);
        assert!((moved.z - body.z).abs() < 1e-12);

        let flat = Inflation::for_cage(&cage, Symmetry::Five, false, 0.0).unwrap();
        for p in &cage {
            assert!(flat.apply(p).distance_to(p) < 1e-12);
        }
    }

    #[test]
    fn test_capsule_is_mirror_symmetric() {
        let cage = ico_axis(Symmetry::Five, &elongated(), &SolverConfig::default()).unwrap();
        let inflation = Inflation::for_cage(&cage, Symmetry::Five, false, 0.7).unwrap();
        let p = Point3d::new(0.4, 0.1, cage[0].z * 0.9);
        let q = Point3d::new(p.x, p.y, -p.z);
        let (a, b) = (inflation.apply(&p), inflation.apply(&q));
        assert!((a.z + b.z).abs() < 1e-12);
        assert!((a.x - b.x).abs() < 1e-12);
    }

    #[test]
    fn test_three_fold_capsule() {
        let cage = ico_axis(Symmetry::Three, &elongated(), &SolverConfig::default()).unwrap();
        let inflation = Inflation::for_cage(&cage, Symmetry::Three, false, 1.0).unwrap();
        let Inflation::Capsule {
            radius,
            half_height,
            cap_center,
            cap_radius,
            ..
        } = inflation
        else {
            panic!("expected a capsule");
        };
        assert!((radius - 2.914_343_122).abs() < 1e-6);
        assert!((half_height - 0.657_965_310).abs() < 1e-6);
        assert!((cap_center + 0.261_479_777).abs() < 1e-6);
        assert!((cap_radius - 3.055_940_952).abs() < 1e-6);

        // The cap triangles sit on the cap spheres.
        for i in [0, 1, 2, 9, 10, 11] {
            assert!(inflation.apply(&cage[i]).distance_to(&cage[i]) < 1e-6, "vertex {i}");
        }
        assert_near(inflation.apply(&Point3d::new(0.4, 0.2, 0.0)), [2.606_667_732, 1.303_333_866, 0.0]);
        assert_near(inflation.apply(&Point3d::new(0.5, 0.1, 1.5)), [1.120_762_533, 0.224_152_507, 2.545_407_174]);
        assert_near(inflation.apply(&Point3d::new(0.5, 0.1, -1.5)), [1.120_762_533, 0.224_152_507, -2.545_407_174]);
    }

    #[test]
    fn test_two_fold_capsule_with_overlapping_caps() {
        let cage = ico_axis(Symmetry::Two, &elongated(), &SolverConfig::default()).unwrap();
        let inflation = Inflation::for_cage(&cage, Symmetry::Two, false, 1.0).unwrap();
        let Inflation::Capsule {
            half_height,
            cap_center,
            cap_radius,
            ..
        } = inflation
        else {
            panic!("expected a capsule");
        };
        assert!((half_height + 0.103_973_590).abs() < 1e-6);
        assert!((cap_center + 0.471_633_909).abs() < 1e-6);
        assert!((cap_radius - 3.050_285_159).abs() < 1e-6);

        for i in [0, 1, 10, 11] {
            assert!(inflation.apply(&cage[i]).distance_to(&cage[i]) < 1e-6, "vertex {i}");
        }
        // Just below the equator is still above the negative half height,
        // so the top cap applies.
        assert_near(inflation.apply(&Point3d::new(1.0, 1.0, -0.09)), [2.121_051_281, 2.121_051_281, -0.074_334_889]);
        assert_near(inflation.apply(&Point3d::new(2.5, 0.3, -0.05)), [2.993_636_102, 0.359_236_332, -0.039_342_675]);
        assert_near(inflation.apply(&Point3d::new(0.4, 0.2, 0.0)), [2.491_150_347, 1.245_575_173, 0.543_561_020]);
    }
}
