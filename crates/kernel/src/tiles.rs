//! Periodic tilings of the plane.
//!
//! Each tiling is a lattice basis plus the polygons belonging to one cell,
//! every polygon tagged with the mer (subunit) it represents.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point2d, Polygon2d, Vec2};
use crate::params::TileType;

const SQRT3: f64 = 1.732_050_807_568_877_2;

/// One polygon of a lattice cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mer {
    pub polygon: Polygon2d,
    /// Subunit id, starting at 1.
    pub mer: u8,
}

/// A tiling scaled to a given mer circumradius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileType,
    /// Mer circumradius `R`.
    pub mer_radius: f64,
    pub basis: [Vec2; 2],
    /// Reach of a cell around a lattice vertex, used to tell pentamer mers
    /// from hexamer mers.
    pub vertex_radius: f64,
}

impl Tile {
    pub fn new(kind: TileType, mer_radius: f64) -> Self {
        let big = mer_radius;
        let r = big * SQRT3 / 2.0;
        let (basis, vertex_radius) = match kind {
            TileType::Hex | TileType::DualTriHex => ([Vec2::new(2.0 * r, 0.0), Vec2::new(r, SQRT3 * r)], big),
            TileType::TriHex => ([Vec2::new(2.0 * big, 0.0), Vec2::new(big, SQRT3 * big)], 2.0 * r),
            TileType::SnubHex => ([Vec2::new(2.5 * big, r), Vec2::new(0.5 * big, 3.0 * r)], 2.0 * r),
            TileType::RhombiTriHex => (
                [Vec2::new(1.5 * big + r, 0.5 * big + r), Vec2::new(0.0, 2.0 * r + big)],
                ((r + big).powi(2) + (big / 2.0).powi(2)).sqrt(),
            ),
            TileType::DualHex | TileType::DualRhombiTriHex => {
                ([Vec2::new(1.5 * big, r), Vec2::new(0.0, 2.0 * r)], big)
            }
            TileType::DualSnubHex => (
                [
                    Vec2::new(2.5 * big, r),
                    Vec2::new(0.5 * big, 2.0 * r + 2.0 * big * SQRT3 / 3.0 - big * SQRT3 / 6.0),
                ],
                r + big * SQRT3 / 3.0,
            ),
        };
        Self {
            kind,
            mer_radius,
            basis,
            vertex_radius,
        }
    }

    /// World position of lattice index `(i, j)`.
    pub fn position(&self, i: i64, j: i64) -> Point2d {
        Point2d::from_vec2(self.basis[0] * i as f64 + self.basis[1] * j as f64)
    }

    /// The polygons of the cell anchored at `coor`.
    pub fn cell(&self, coor: Point2d) -> Vec<Mer> {
        let big = self.mer_radius;
        let r = big * SQRT3 / 2.0;
        let at = |dx: f64, dy: f64| coor + Vec2::new(dx, dy);
        let mer = |polygon: Polygon2d, mer: u8| Mer { polygon, mer };
        let fan = |polygon: Polygon2d, id: u8, count: usize| -> Vec<Mer> {
            (0..count)
                .map(|i| mer(polygon.rotated_around(i as f64 * 60.0, &coor), id))
                .collect()
        };
        let path = |pts: &[(f64, f64)]| Polygon2d::new(pts.iter().map(|&(x, y)| at(x, y)).collect());
        let flat_hexagon = || mer(Polygon2d::regular(coor, 6, big).rotated(30.0), 1);

        match self.kind {
            TileType::Hex => vec![mer(Polygon2d::regular(coor, 6, big), 1)],
            TileType::TriHex => {
                let mut mers = vec![flat_hexagon()];
                let triangle = Polygon2d::regular(at(big, -r / 3.0), 3, 2.0 * r / 3.0).rotated(180.0);
                mers.extend(fan(triangle, 2, 2));
                mers
            }
            TileType::SnubHex => {
                let mut mers = vec![flat_hexagon()];
                let small = 2.0 * r / 3.0;
                mers.extend(fan(Polygon2d::regular(at(0.0, -4.0 * r / 3.0), 3, small), 2, 6));
                mers.push(mer(Polygon2d::regular(at(1.5 * big, -r / 3.0), 3, small), 2));
                mers.push(mer(Polygon2d::regular(at(-1.5 * big, 2.0 * r / 3.0), 3, small).rotated(180.0), 2));
                mers
            }
            TileType::RhombiTriHex => {
                let mut mers = vec![flat_hexagon()];
                let triangle = Polygon2d::regular(at(0.0, big + big * SQRT3 / 3.0), 3, big / SQRT3);
                mers.extend((0..2).map(|i| mer(triangle.rotated_around(-30.0 - 60.0 * i as f64, &coor), 2)));
                let square = Polygon2d::regular(at(0.0, -r - 0.5 * big), 4, (2.0 * big * big).sqrt() / 2.0);
                mers.extend(fan(square, 3, 3));
                mers
            }
            TileType::DualHex => fan(
                Polygon2d::regular(at(0.0, r - big * SQRT3 / 6.0), 3, big / SQRT3),
                1,
                6,
            ),
            TileType::DualTriHex => {
                let q = 0.25 * big * (std::f64::consts::PI / 6.0).sin() / (std::f64::consts::PI / 3.0).cos();
                let mut mers = fan(path(&[(0.0, 0.0), (0.5 * r, -q), (r, 0.0), (0.5 * r, q)]), 1, 6);
                mers.extend(fan(
                    path(&[
                        (-0.5 * r, 0.5 * big + q),
                        (0.0, 0.5 * big),
                        (0.5 * r, 0.5 * big + q),
                        (0.0, 0.5 * big + 2.0 * q),
                    ]),
                    2,
                    6,
                ));
                mers
            }
            TileType::DualSnubHex => fan(
                path(&[
                    (0.0, 0.0),
                    (0.0, r + big * SQRT3 / 6.0),
                    (0.5 * big, r + big * SQRT3 / 3.0),
                    (big, r + big * SQRT3 / 6.0),
                    (big, big * SQRT3 / 3.0),
                ]),
                1,
                6,
            ),
            TileType::DualRhombiTriHex => fan(
                path(&[(0.0, 0.0), (0.0, r), (0.5 * big, r), (SQRT3 / 2.0 * r, 0.5 * r)]),
                1,
                6,
            ),
        }
    }
}

/// Lattice basis `(v1, v2)` of a tiling.
pub fn basis(kind: TileType, mer_radius: f64) -> [Vec2; 2] {
    Tile::new(kind, mer_radius).basis
}

/// Polygons of the cell anchored at `coor`.
pub fn cell(kind: TileType, mer_radius: f64, coor: Point2d) -> Vec<Mer> {
    Tile::new(kind, mer_radius).cell(coor)
}
