use std::f64::consts::{PI, TAU};

use crate::error::CapsidError;
use crate::geometry::{Point3d, Vec3};

use super::FoldEdges;

const SQRT5: f64 = 2.236_067_977_499_79;

/// Closed-form cage around a 5-fold axis.
///
/// A pentagonal pyramid of edge `a` caps the top; the lower ring is found by
/// intersecting two distance constraints on the `b` edge.
pub fn ico_axis_5(edges: &FoldEdges) -> Result<Vec<Point3d>, CapsidError> {
    let FoldEdges { a, b, theta, .. } = *edges;

    let r5 = a * ((5.0 + SQRT5) / 10.0).sqrt();
    let h5 = (1.0 + SQRT5) * a / (2.0 * (5.0 + 2.0 * SQRT5).sqrt());

    let p_a = Point3d::new(0.0, 0.0, h5);
    let p_b = Point3d::new(-r5, 0.0, 0.0).rotate_about(&Vec3::Z, 0.3 * PI);
    let p_c = p_b + Vec3::new(a, 0.0, 0.0);

    let q = p_c + Vec3::new(b, 0.0, 0.0).rotate_about(&Vec3::Y, -PI - theta);
    let p = p_b + (q - p_b).project_onto(&(p_c - p_b));
    let dy = -p.y.abs() * (r5 * r5 * p.y * p.y - (p.x * p.y).powi(2)).sqrt() / (p.y * p.y);
    if !dy.is_finite() {
        return Err(CapsidError::impossible("5-fold lower ring does not close"));
    }
    let d = Point3d::new(p.x, dy, 0.0);
    let drop = (q.z * q.z - (p.y - dy).powi(2)).sqrt();
    if !drop.is_finite() {
        return Err(CapsidError::impossible("5-fold lower ring does not reach the upper ring"));
    }
    let p_g = d + Vec3::new(0.0, 0.0, -drop);

    let turn = |p: &Point3d, e: usize| p.rotate_about(&Vec3::Z, TAU * e as f64 / 5.0);
    let mut points = vec![p_a, p_b, p_c];
    points.extend((1..=3).map(|e| turn(&p_c, e)));
    points.push(p_g);
    points.extend((1..=4).map(|e| turn(&p_g, e)));
    points.push(Point3d::new(0.0, 0.0, p_g.z - p_a.z));
    Ok(points)
}
