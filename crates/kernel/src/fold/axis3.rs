use std::f64::consts::{FRAC_PI_3, FRAC_PI_4, TAU};

use capsid_solver::{find_root, warm_start, SolverConfig};
use tracing::debug;

use crate::error::CapsidError;
use crate::geometry::{Point3d, Vec3};

use super::{ApexCircle, FoldEdges};

const SQRT3: f64 = 1.732_050_807_568_877_2;

/// Fixed top triangle and the fold that hangs the second ring below it.
struct Fold3 {
    edges: FoldEdges,
    p_a: Point3d,
    p_b: Point3d,
    p_c: Point3d,
    /// Flap apex in the flat (unfolded) net.
    q_d: Point3d,
}

struct Trial {
    p_d: Point3d,
    p_f: Point3d,
    p_g: Point3d,
    /// Radial mismatch between the two lower vertices.
    residual: f64,
}

impl Fold3 {
    fn new(edges: FoldEdges) -> Self {
        let a = edges.a;
        Self {
            edges,
            p_a: Point3d::new(0.0, a / SQRT3, 0.0),
            p_b: Point3d::new(a / 2.0, -a * SQRT3 / 6.0, 0.0),
            p_c: Point3d::new(-a / 2.0, -a * SQRT3 / 6.0, 0.0),
            q_d: Point3d::new(0.0, -a * 2.0 * SQRT3 / 3.0, 0.0),
        }
    }

    /// Fold the flap below `BC` down by `t` and close the `c` edge.
    fn trial(&self, t: f64, config: &SolverConfig) -> Result<Trial, CapsidError> {
        let a = self.edges.a;
        let hinge = Point3d::new(0.0, -a * SQRT3 / 6.0, 0.0);
        let flap = self.q_d.to_vec3().unit() * (a * SQRT3 / 2.0);
        let p_d = hinge + flap.rotate_about(&(self.p_b - self.p_c).unit(), t);
        let p_f = p_d.rotate_about(&Vec3::Z, TAU / 3.0);

        let circle = ApexCircle::new(self.p_b, p_d, self.edges.b, self.edges.theta);
        let p_g = circle.closing_point(&p_f, self.edges.c, config)?;

        Ok(Trial {
            p_d,
            p_f,
            p_g,
            residual: p_d.y.abs() - p_g.radial_distance(),
        })
    }
}

/// Cage around a 3-fold axis.
pub fn ico_axis_3(edges: &FoldEdges, config: &SolverConfig) -> Result<Vec<Point3d>, CapsidError> {
    let fold = Fold3::new(*edges);

    let t0 = warm_start(|t| fold.trial(t, config), config)?;
    let mut objective = |t: f64| fold.trial(t, config).map(|trial| trial.residual);
    let root = find_root(&mut objective, t0, FRAC_PI_4, edges.a, config)?;
    debug!(t0, t = root.x, residual = root.residual, "3-fold angle solved");

    let Trial { p_d, p_f, p_g, .. } = fold.trial(root.x, config)?;
    let z = Vec3::Z;
    let third = TAU / 3.0;
    let p_h = p_g.rotate_about(&z, -third);
    let p_j = Point3d::from_vec3(p_h.to_vec3().horizontal().rotate_about(&z, FRAC_PI_3).unit() * fold.p_a.y)
        + Vec3::new(0.0, 0.0, p_h.z + p_d.z - fold.p_a.z);

    Ok(vec![
        fold.p_a,
        fold.p_b,
        fold.p_c,
        p_d,
        p_f.rotate_about(&z, third),
        p_f,
        p_g,
        p_h,
        p_h.rotate_about(&z, -third),
        p_j,
        p_j.rotate_about(&z, -third),
        p_j.rotate_about(&z, -2.0 * third),
    ])
}
