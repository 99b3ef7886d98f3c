//! Folding the net into a closed cage around a 5-, 3- or 2-fold axis.
//!
//! Each construction returns twelve cage vertices, re-centred so the first
//! (top) and last (bottom) vertex sit symmetrically about `z = 0`.

pub mod axis2;
pub mod axis3;
pub mod axis5;
pub mod config;

pub use config::{FaceDef, IcoFaceConfig};

use std::f64::consts::TAU;

use capsid_solver::{find_root, SolverConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::CapsidError;
use crate::geometry::{Point3d, Vec2, Vec3};
use crate::params::Symmetry;

/// Edge data the fold constructions need from the net.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoldEdges {
    /// `|ck0|`
    pub a: f64,
    /// `|ck1|`
    pub b: f64,
    /// `|ck2 - ck1|`
    pub c: f64,
    /// Angle between `ck0` and `ck1` (radians).
    pub theta: f64,
}

impl FoldEdges {
    pub fn from_ck(ck: &[Vec2; 4]) -> Self {
        Self {
            a: ck[0].length(),
            b: ck[1].length(),
            c: (ck[2] - ck[1]).length(),
            theta: ck[0].angle_to(&ck[1]),
        }
    }
}

/// Cage vertices for `symmetry`.
#[instrument(skip(config))]
pub fn ico_axis(symmetry: Symmetry, edges: &FoldEdges, config: &SolverConfig) -> Result<Vec<Point3d>, CapsidError> {
    let points = match symmetry {
        Symmetry::Five => axis5::ico_axis_5(edges)?,
        Symmetry::Three => axis3::ico_axis_3(edges, config)?,
        Symmetry::Two => axis2::ico_axis_2(edges, config)?,
    };
    let points = recenter(points);
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(CapsidError::impossible(format!("cage vertex {i} is not finite")));
    }
    info!(vertices = points.len(), "cage folded");
    Ok(points)
}

fn recenter(points: Vec<Point3d>) -> Vec<Point3d> {
    let (Some(top), Some(bottom)) = (points.first(), points.last()) else {
        return points;
    };
    let shift = Vec3::new(0.0, 0.0, -(top.z + bottom.z) / 2.0);
    points.into_iter().map(|p| p + shift).collect()
}

/// Circle of apex positions that are `b` away from `pivot` and open an
/// angle `theta` against the edge `pivot -> toward`.
pub(crate) struct ApexCircle {
    center: Point3d,
    spoke: Vec3,
    axis: Vec3,
}

impl ApexCircle {
    pub(crate) fn new(pivot: Point3d, toward: Point3d, b: f64, theta: f64) -> Self {
        let v = (toward - pivot).unit() * b;
        let k = toward.to_vec3().cross(&pivot.to_vec3()).unit();
        let o = v.rotate_about(&k, theta);
        let center = pivot + o.project_onto(&v);
        let spoke = (pivot + o) - center;
        Self {
            center,
            spoke,
            axis: (pivot - toward).unit(),
        }
    }

    pub(crate) fn at(&self, s: f64) -> Point3d {
        self.center + self.spoke.rotate_about(&self.axis, s)
    }

    /// First point around the circle that is `c` away from `target`.
    pub(crate) fn closing_point(&self, target: &Point3d, c: f64, config: &SolverConfig) -> Result<Point3d, CapsidError> {
        let mut residual = |s: f64| Ok::<f64, CapsidError>(c - self.at(s).distance_to(target));
        let root = find_root(&mut residual, 0.0, TAU, c, config)?;
        Ok(self.at(root.x))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_3;

    pub(crate) fn regular(a: f64) -> FoldEdges {
        FoldEdges {
            a,
            b: a,
            c: a,
            theta: FRAC_PI_3,
        }
    }

    /// Spread of vertex distances from the centroid.
    pub(crate) fn radial_spread(points: &[Point3d]) -> f64 {
        let c = Point3d::centroid(points).unwrap();
        let d: Vec<f64> = points.iter().map(|p| p.distance_to(&c)).collect();
        d.iter().cloned().fold(f64::MIN, f64::max) - d.iter().cloned().fold(f64::MAX, f64::min)
    }

    #[test]
    fn test_fold_edges_from_ck() {
        let ck = [
            Vec2::new(3.0, 0.0),
            Vec2::new(0.0, 4.0),
            Vec2::new(-1.0, 4.0),
            Vec2::ZERO,
        ];
        let e = FoldEdges::from_ck(&ck);
        assert!((e.a - 3.0).abs() < 1e-12);
        assert!((e.b - 4.0).abs() < 1e-12);
        assert!((e.c - 1.0).abs() < 1e-12);
        assert!((e.theta - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_recentered_top_and_bottom() {
        let config = SolverConfig::default();
        for s in [Symmetry::Two, Symmetry::Three, Symmetry::Five] {
            let points = ico_axis(s, &regular(2.0), &config).unwrap();
            assert_eq!(points.len(), 12);
            let (top, bottom) = (points[0].z, points[11].z);
            assert!((top + bottom).abs() < 1e-9, "{s:?}: {top} vs {bottom}");
        }
    }

    #[test]
    fn test_regular_cages_are_icosahedra() {
        let config = SolverConfig::default();
        for s in [Symmetry::Two, Symmetry::Three, Symmetry::Five] {
            let points = ico_axis(s, &regular(1.0), &config).unwrap();
            assert!(radial_spread(&points) < 1e-6, "{s:?}");
            let circumradius = (10.0 + 2.0 * 5.0f64.sqrt()).sqrt() / 4.0;
            for p in &points {
                assert!((p.to_vec3().length() - circumradius).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_apex_circle_keeps_edge_and_angle() {
        let pivot = Point3d::new(1.0, 0.0, 0.0);
        let toward = Point3d::new(-1.0, 0.0, 0.5);
        let circle = ApexCircle::new(pivot, toward, 2.0, 0.9);
        for s in [0.0, 1.0, 2.5, 4.0] {
            let q = circle.at(s);
            assert!((q.distance_to(&pivot) - 2.0).abs() < 1e-12);
            assert!(((q - pivot).angle_to(&(toward - pivot)) - 0.9).abs() < 1e-12);
        }
    }
}
