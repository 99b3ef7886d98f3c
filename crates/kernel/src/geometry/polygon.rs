use serde::{Deserialize, Serialize};

use super::point::Point2d;
use super::transform::BoundingBox;
use super::vector::Vec2;

/// Half-plane slack when classifying a vertex against a clip edge.
const CLIP_EPS: f64 = 1e-12;

/// Fragments with less area than this are dropped after clipping.
const MIN_AREA: f64 = 1e-12;

/// A closed polygon in the lattice plane. The closing edge is implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon2d {
    pub points: Vec<Point2d>,
}

impl Polygon2d {
    pub fn new(points: Vec<Point2d>) -> Self {
        Self { points }
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`.
    ///
    /// Polygons whose side count is a multiple of three put a vertex at the
    /// bottom of the circle (triangles then have a horizontal top edge);
    /// others start half a step past the top, so squares are axis aligned.
    pub fn regular(center: Point2d, sides: usize, radius: f64) -> Self {
        let step = 360.0 / sides as f64;
        let (start, offset) = if sides % 3 == 0 {
            (Vec2::new(0.0, -radius), -1.0)
        } else {
            (Vec2::new(0.0, radius), 0.5)
        };
        let points = (0..sides)
            .map(|i| center + start.rotated(((i as f64 + offset) * step).to_radians()))
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Shoelace area; positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            sum += a.x * b.y - b.x * a.y;
        }
        0.5 * sum
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Mean of the vertices.
    pub fn centroid(&self) -> Point2d {
        let n = self.points.len().max(1) as f64;
        let sum = self.points.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
        Point2d::from_vec2(sum / n)
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Rotate counter-clockwise by `degrees` about `pivot`.
    pub fn rotated_around(&self, degrees: f64, pivot: &Point2d) -> Self {
        Self {
            points: self.points.iter().map(|p| p.rotate_around(degrees, pivot)).collect(),
        }
    }

    /// Rotate about the centre of the bounding box.
    pub fn rotated(&self, degrees: f64) -> Self {
        let pivot = self.bounds().center();
        self.rotated_around(degrees, &pivot)
    }

    /// Intersection with a triangle of either winding.
    ///
    /// Sutherland–Hodgman against the three edges of `triangle`. Returns
    /// `None` when nothing of positive area remains.
    pub fn clip_to_triangle(&self, triangle: &[Point2d; 3]) -> Option<Polygon2d> {
        let tri = counter_clockwise(triangle);
        let mut output = self.points.clone();
        for i in 0..3 {
            if output.len() < 3 {
                return None;
            }
            output = clip_half_plane(&output, tri[i], tri[(i + 1) % 3]);
        }
        let clipped = Polygon2d::new(dedup(output));
        if clipped.len() < 3 || clipped.area() < MIN_AREA {
            return None;
        }
        Some(clipped)
    }
}

fn counter_clockwise(triangle: &[Point2d; 3]) -> [Point2d; 3] {
    let [a, b, c] = *triangle;
    if (b - a).cross(&(c - a)) < 0.0 {
        [a, c, b]
    } else {
        [a, b, c]
    }
}

/// Signed distance-like measure: positive left of `a -> b`.
fn side(a: Point2d, b: Point2d, p: Point2d) -> f64 {
    (b - a).cross(&(p - a))
}

fn clip_half_plane(points: &[Point2d], a: Point2d, b: Point2d) -> Vec<Point2d> {
    let n = points.len();
    let mut out = Vec::with_capacity(n + 2);
    for i in 0..n {
        let cur = points[i];
        let next = points[(i + 1) % n];
        let d_cur = side(a, b, cur);
        let d_next = side(a, b, next);
        let cur_in = d_cur >= -CLIP_EPS;
        let next_in = d_next >= -CLIP_EPS;
        if cur_in {
            out.push(cur);
        }
        if cur_in != next_in {
            let t = d_cur / (d_cur - d_next);
            out.push(cur + (next - cur) * t);
        }
    }
    out
}

fn dedup(points: Vec<Point2d>) -> Vec<Point2d> {
    let mut out: Vec<Point2d> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_none_or(|q| q.distance_to(&p) > CLIP_EPS) {
            out.push(p);
        }
    }
    while out.len() > 1 && out[0].distance_to(&out[out.len() - 1]) <= CLIP_EPS {
        out.pop();
    }
    out
}

/// Whether `p` lies strictly inside `triangle` by at least `eps`.
pub fn triangle_contains_strict(triangle: &[Point2d; 3], p: &Point2d, eps: f64) -> bool {
    let [a, b, c] = counter_clockwise(triangle);
    side(a, b, *p) > eps && side(b, c, *p) > eps && side(c, a, *p) > eps
}

/// Distance from `p` to the infinite line through `a` and `b`.
pub fn distance_to_line(a: &Point2d, b: &Point2d, p: &Point2d) -> f64 {
    let len = (*b - *a).length();
    if len < 1e-15 {
        return p.distance_to(a);
    }
    side(*a, *b, *p).abs() / len
}
