use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::geometry::polygon::{distance_to_line, triangle_contains_strict};
use crate::geometry::{Point2d, Polygon2d};
use crate::lattice::Lattice;

/// Distance under which a point counts as lying on a net edge or vertex.
pub const BOUNDARY_TOL: f64 = 1e-5;

/// A lattice mer clipped to one net triangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub polygon: Polygon2d,
    pub mer: u8,
    pub offset: u8,
    /// Centroid of the unclipped mer.
    pub centroid: Point2d,
    /// The mer centroid lies strictly inside the triangle.
    pub has_centroid: bool,
    /// A clipped vertex sits on the mer centroid.
    pub centroid_on_vertex: bool,
    /// `on_boundary[i]` is set when edge `points[i] -> points[i + 1]` runs along
    /// a triangle side.
    pub on_boundary: Vec<bool>,
}

/// Runs of vertex indices tracing the edges that are not on the triangle
/// boundary. A fragment with no boundary edge yields one run over all of
/// its vertices, to be drawn closed.
pub fn strokes(on_boundary: &[bool]) -> Vec<Vec<usize>> {
    let n = on_boundary.len();
    let Some(start) = on_boundary.iter().position(|&b| b) else {
        return vec![(0..n).collect()];
    };
    let mut runs = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for step in 1..=n {
        let edge = (start + step) % n;
        if on_boundary[edge] {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        } else {
            if current.is_empty() {
                current.push(edge);
            }
            current.push((edge + 1) % n);
        }
    }
    runs
}

/// All fragments of one net triangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    /// 1-based net triangle id (T1, T2, T3).
    pub id: usize,
    /// Reference triangle, starting at the origin.
    pub triangle: [Point2d; 3],
    /// Sorted by offset.
    pub fragments: Vec<Fragment>,
}

impl Facet {
    pub fn area(&self) -> f64 {
        self.fragments.iter().map(|f| f.polygon.area()).sum()
    }
}

fn edge_on_boundary(triangle: &[Point2d; 3], a: &Point2d, b: &Point2d) -> bool {
    (0..3).any(|i| {
        let (p, q) = (&triangle[i], &triangle[(i + 1) % 3]);
        distance_to_line(p, q, a) < BOUNDARY_TOL && distance_to_line(p, q, b) < BOUNDARY_TOL
    })
}

/// Clip every lattice mer against the first `count` net triangles.
#[instrument(skip(lattice), fields(mers = lattice.mers.len()))]
pub fn extract_facets(lattice: &Lattice, count: usize) -> Vec<Facet> {
    let facets: Vec<Facet> = lattice
        .net_triangles()
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(i, triangle)| {
            let longest = (0..3)
                .map(|e| triangle[e].distance_to(&triangle[(e + 1) % 3]))
                .fold(0.0, f64::max);
            let inside_eps = 1e-9 * longest.max(1.0);

            let mut fragments: Vec<Fragment> = lattice
                .mers
                .iter()
                .filter_map(|m| {
                    let polygon = m.polygon.clip_to_triangle(&triangle)?;
                    let n = polygon.len();
                    let on_boundary = (0..n)
                        .map(|e| edge_on_boundary(&triangle, &polygon.points[e], &polygon.points[(e + 1) % n]))
                        .collect();
                    Some(Fragment {
                        has_centroid: triangle_contains_strict(&triangle, &m.centroid, inside_eps),
                        centroid_on_vertex: polygon.points.iter().any(|p| p.distance_to(&m.centroid) < BOUNDARY_TOL),
                        on_boundary,
                        centroid: m.centroid,
                        mer: m.mer,
                        offset: m.offset,
                        polygon,
                    })
                })
                .collect();
            fragments.sort_by_key(|f| f.offset);

            Facet {
                id: i + 1,
                triangle,
                fragments,
            }
        })
        .collect();

    info!(
        facets = facets.len(),
        fragments = facets.iter().map(|f| f.fragments.len()).sum::<usize>(),
        "facets extracted"
    );
    facets
}
