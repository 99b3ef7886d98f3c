use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use capsid_solver::{find_root, warm_start, SolverConfig};
use tracing::debug;

use crate::error::CapsidError;
use crate::geometry::{Point3d, Vec3};

use super::{ApexCircle, FoldEdges};

const PHI: f64 = 1.618_033_988_749_895;

/// Fixed top edge with its two flanking vertices, and the fold that hangs
/// the next ring from them.
struct Fold2 {
    edges: FoldEdges,
    p_a: Point3d,
    p_b: Point3d,
    p_c: Point3d,
    p_d: Point3d,
}

struct Trial {
    p_e: Point3d,
    p_f: Point3d,
    p_g: Point3d,
    residual: f64,
}

impl Fold2 {
    fn new(edges: FoldEdges) -> Self {
        let a = edges.a;
        let sag = -(a * PHI - a) / 2.0;
        Self {
            edges,
            p_a: Point3d::new(a / 2.0, 0.0, 0.0),
            p_b: Point3d::new(-a / 2.0, 0.0, 0.0),
            p_c: Point3d::new(0.0, -a * PHI / 2.0, sag),
            p_d: Point3d::new(0.0, a * PHI / 2.0, sag),
        }
    }

    /// Fold the triangle beyond `BC` by `t` and close the `c` edge.
    fn trial(&self, t: f64, config: &SolverConfig) -> Result<Trial, CapsidError> {
        let hinge = self.p_b.midpoint(&self.p_c);
        let flap = hinge - self.p_a;
        let p_e = hinge + flap.rotate_about(&(self.p_c - self.p_b).unit(), t);
        let p_f = p_e.rotate_about(&Vec3::Z, PI);

        let circle = ApexCircle::new(self.p_a, self.p_c, self.edges.b, self.edges.theta);
        let p_g = circle.closing_point(&p_f, self.edges.c, config)?;

        Ok(Trial {
            p_e,
            p_f,
            p_g,
            residual: p_e.radial_distance() - p_g.radial_distance(),
        })
    }
}

/// Cage around a 2-fold axis.
///
/// Two solves: the fold angle of the second ring, then the twist of the
/// bottom edge that puts it `b` away from the ring.
pub fn ico_axis_2(edges: &FoldEdges, config: &SolverConfig) -> Result<Vec<Point3d>, CapsidError> {
    let fold = Fold2::new(*edges);

    let t0 = warm_start(|t| fold.trial(t, config), config)?;
    let mut objective = |t: f64| fold.trial(t, config).map(|trial| trial.residual);
    let root = find_root(&mut objective, t0, FRAC_PI_4, edges.a, config)?;
    debug!(t0, t = root.x, residual = root.residual, "2-fold angle solved");
    let Trial { p_e, p_f, p_g, .. } = fold.trial(root.x, config)?;

    let z = Vec3::Z;
    let lift = Vec3::new(0.0, 0.0, p_g.z + p_e.z);
    let mut twist = |t: f64| Ok::<f64, CapsidError>((fold.p_a.rotate_about(&z, t) + lift).distance_to(&p_f) - edges.b);
    let root = find_root(&mut twist, 0.0, TAU, edges.a, config)?;
    debug!(t = root.x, residual = root.residual, "2-fold twist solved");

    let p_k = fold.p_a.rotate_about(&z, root.x) + lift;
    let p_i = Point3d::from_vec3(p_k.to_vec3().horizontal().unit().rotate_about(&z, FRAC_PI_2) * fold.p_d.y)
        + Vec3::new(0.0, 0.0, lift.z - fold.p_d.z);

    Ok(vec![
        fold.p_a,
        fold.p_b,
        fold.p_c,
        fold.p_d,
        p_e,
        p_f,
        p_g,
        p_g.rotate_about(&z, PI),
        p_i,
        p_i.rotate_about(&z, PI),
        p_k,
        p_k.rotate_about(&z, PI),
    ])
}
