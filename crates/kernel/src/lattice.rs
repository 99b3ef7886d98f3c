use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::CapsidError;
use crate::geometry::{Point2d, Polygon2d, Vec2};
use crate::tiles::Tile;

/// Extra rings of cells enumerated around the box spanned by the CK endpoints.
pub const GRID_MARGIN: i64 = 2;

/// Caspar–Klug vectors `ck[0..4]` for the lattice walks `(h, k)` and `(H, K)`.
///
/// `ck[0]` and `ck[1]` are the two walks; `ck[2]` and `ck[3]` close the
/// neighbouring net triangles.
pub fn ck_vectors(basis: &[Vec2; 2], h: i32, k: i32, h2: i32, k2: i32) -> [Vec2; 4] {
    let [v1, v2] = *basis;
    let v3 = v2.rotated(std::f64::consts::FRAC_PI_3);
    let (h, k, h2, k2) = (h as f64, k as f64, h2 as f64, k2 as f64);
    [
        v1 * h + v2 * k,
        v2 * h2 + v3 * k2,
        v1 * (-h - k) + v2 * h,
        v1 * k + v3 * (-h),
    ]
}

/// One lattice site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeCell {
    pub index: (i64, i64),
    pub coor: Point2d,
    /// The site coincides with the endpoint of a CK vector.
    pub is_vertex: bool,
}

fn lattice_index(inverse_t: &Matrix2<f64>, p: &Vec2) -> (i64, i64) {
    let idx = inverse_t * Vector2::new(p.x, p.y);
    (idx[0].round() as i64, idx[1].round() as i64)
}

/// Enumerate every lattice site needed to cover the net triangles.
pub fn tile_grid(ck: &[Vec2; 4], tile: &Tile) -> Result<Vec<LatticeCell>, CapsidError> {
    let [v1, v2] = tile.basis;
    let inverse_t = Matrix2::new(v1.x, v1.y, v2.x, v2.y)
        .try_inverse()
        .ok_or_else(|| CapsidError::impossible("lattice basis is singular"))?
        .transpose();
    let ends: Vec<(i64, i64)> = ck.iter().map(|e| lattice_index(&inverse_t, e)).collect();

    let min_i = ends.iter().map(|e| e.0).min().unwrap_or(0) - GRID_MARGIN;
    let max_i = ends.iter().map(|e| e.0).max().unwrap_or(0) + GRID_MARGIN;
    let min_j = ends.iter().map(|e| e.1).min().unwrap_or(0) - GRID_MARGIN;
    let max_j = ends.iter().map(|e| e.1).max().unwrap_or(0) + GRID_MARGIN;
    debug!(min_i, max_i, min_j, max_j, "lattice index box");

    let mut cells = Vec::with_capacity(((max_i - min_i + 1) * (max_j - min_j + 1)) as usize);
    for i in min_i..=max_i {
        for j in min_j..=max_j {
            cells.push(LatticeCell {
                index: (i, j),
                coor: tile.position(i, j),
                is_vertex: ends.contains(&(i, j)),
            });
        }
    }
    Ok(cells)
}

/// A mer placed in the lattice, before clipping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeMer {
    pub polygon: Polygon2d,
    pub mer: u8,
    /// `mer` near a net corner (pentamer position), `mer + 3` elsewhere.
    pub offset: u8,
    /// Vertex mean of the unclipped polygon.
    pub centroid: Point2d,
}

/// The tiled plane around one pair of CK walks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    pub tile: Tile,
    pub ck: [Vec2; 4],
    pub cells: Vec<LatticeCell>,
    /// Positions of the vertex cells plus the origin.
    pub vertices: Vec<Point2d>,
    pub mers: Vec<LatticeMer>,
}

impl Lattice {
    #[instrument(skip(tile), fields(tile = %tile.kind))]
    pub fn build(tile: Tile, h: i32, k: i32, h2: i32, k2: i32) -> Result<Self, CapsidError> {
        let ck = ck_vectors(&tile.basis, h, k, h2, k2);
        let cells = tile_grid(&ck, &tile)?;
        let vertices: Vec<Point2d> = cells
            .iter()
            .filter(|c| c.is_vertex)
            .map(|c| c.coor)
            .chain(std::iter::once(Point2d::ORIGIN))
            .collect();

        let mers: Vec<LatticeMer> = cells
            .iter()
            .flat_map(|c| tile.cell(c.coor))
            .map(|m| {
                let center = m.polygon.bounds().center();
                let near_vertex = vertices.iter().any(|v| v.distance_to(&center) <= tile.vertex_radius);
                LatticeMer {
                    centroid: m.polygon.centroid(),
                    offset: m.mer + if near_vertex { 0 } else { 3 },
                    mer: m.mer,
                    polygon: m.polygon,
                }
            })
            .collect();

        info!(cells = cells.len(), mers = mers.len(), vertices = vertices.len(), "lattice built");
        Ok(Self {
            tile,
            ck,
            cells,
            vertices,
            mers,
        })
    }

    /// Net triangles `T1 = [0, ck3, ck0]`, `T2 = [0, ck0, ck1]`, `T3 = [0, ck1, ck2]`.
    pub fn net_triangles(&self) -> [[Point2d; 3]; 3] {
        let p = |i: usize| Point2d::from_vec2(self.ck[i]);
        [
            [Point2d::ORIGIN, p(3), p(0)],
            [Point2d::ORIGIN, p(0), p(1)],
            [Point2d::ORIGIN, p(1), p(2)],
        ]
    }
}
