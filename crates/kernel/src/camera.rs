use serde::{Deserialize, Serialize};

use crate::geometry::{Point2d, Point3d, Transform};

/// Rigid view transform: rotate by yaw/pitch/roll after moving `center` to
/// the origin. Calibration is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    transform: Transform,
}

impl Camera {
    /// Camera looking at the origin, angles in degrees.
    pub fn new(theta: f64, psi: f64, phi: f64) -> Self {
        Self::with_center(theta, psi, phi, Point3d::ORIGIN)
    }

    pub fn with_center(theta: f64, psi: f64, phi: f64, center: Point3d) -> Self {
        let rotation = Transform::from_euler(theta.to_radians(), psi.to_radians(), phi.to_radians());
        let shift = Transform::from_translation_vec(-center.to_vec3());
        Self {
            transform: rotation.then(&shift),
        }
    }

    /// Camera-space position; `z` is the depth key.
    pub fn project(&self, p: &Point3d) -> Point3d {
        self.transform.transform_point(p)
    }

    /// Projected position on the image plane.
    pub fn project_2d(&self, p: &Point3d) -> Point2d {
        let q = self.project(p);
        Point2d::new(q.x, q.y)
    }
}

/// Indices of `depths` in painter's order: ascending, ties kept in input order.
pub fn depth_order(depths: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..depths.len()).collect();
    order.sort_by(|&a, &b| depths[a].total_cmp(&depths[b]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_angles_are_identity() {
        let p = Point3d::new(1.0, -2.0, 3.0);
        assert_eq!(Camera::new(0.0, 0.0, 0.0).project(&p), p);
    }

    #[test]
    fn test_yaw_rotates_about_z() {
        let camera = Camera::new(90.0, 0.0, 0.0);
        let q = camera.project(&Point3d::new(1.0, 0.0, 0.0));
        assert!(q.distance_to(&Point3d::new(0.0, 1.0, 0.0)) < 1e-12);
        let up = camera.project(&Point3d::new(0.0, 0.0, 1.0));
        assert!(up.distance_to(&Point3d::new(0.0, 0.0, 1.0)) < 1e-12);
    }

    #[test]
    fn test_pitch_tilts_axis() {
        let camera = Camera::new(0.0, 90.0, 0.0);
        let up = camera.project(&Point3d::new(0.0, 0.0, 1.0));
        assert!(up.distance_to(&Point3d::new(1.0, 0.0, 0.0)) < 1e-12);
    }

    #[test]
    fn test_rotation_preserves_distance() {
        let camera = Camera::new(12.0, 34.0, 56.0);
        let a = Point3d::new(1.0, 2.0, 3.0);
        let b = Point3d::new(-4.0, 0.5, 2.0);
        let d = camera.project(&a).distance_to(&camera.project(&b));
        assert!((d - a.distance_to(&b)).abs() < 1e-12);
    }

    #[test]
    fn test_center_moves_to_origin() {
        let center = Point3d::new(1.0, 2.0, 3.0);
        let camera = Camera::with_center(30.0, 40.0, 50.0, center);
        assert!(camera.project(&center).distance_to(&Point3d::ORIGIN) < 1e-12);
    }

    #[test]
    fn test_depth_order_is_stable() {
        let order = depth_order(&[3.0, -1.0, 2.0, -1.0, 0.0]);
        assert_eq!(order, vec![1, 3, 4, 2, 0]);
    }

    #[test]
    fn test_project_2d_drops_depth() {
        let camera = Camera::new(0.0, 0.0, 0.0);
        assert_eq!(camera.project_2d(&Point3d::new(1.0, 2.0, 3.0)), Point2d::new(1.0, 2.0));
    }
}
