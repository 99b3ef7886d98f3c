//! Affine placement of net facets onto the folded cage.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::CapsidError;
use crate::facet::Facet;
use crate::fold::IcoFaceConfig;
use crate::geometry::{Point2d, Point3d, Vec3};

/// Affine map from the lattice plane onto one cage face, `M = X·A⁻¹`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceMap {
    m: Matrix3<f64>,
}

impl FaceMap {
    /// Map sending `reference[i]` to `target[i]`.
    pub fn new(reference: &[Point2d; 3], target: &[Point3d; 3]) -> Result<Self, CapsidError> {
        let a = Matrix3::from_columns(&reference.map(|p| Vector3::new(p.x, p.y, 1.0)));
        let x = Matrix3::from_columns(&target.map(|p| Vector3::new(p.x, p.y, p.z)));
        let inverse = a
            .try_inverse()
            .ok_or_else(|| CapsidError::impossible("net triangle is degenerate"))?;
        Ok(Self { m: x * inverse })
    }

    pub fn apply(&self, p: &Point2d) -> Point3d {
        let v = self.m * Vector3::new(p.x, p.y, 1.0);
        Point3d::new(v.x, v.y, v.z)
    }
}

/// A fragment carried onto the cage, before inflation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedFragment {
    pub points: Vec<Point3d>,
    pub mer: u8,
    pub offset: u8,
    /// Image of the unclipped mer centroid.
    pub centroid: Point3d,
    pub has_centroid: bool,
    pub centroid_on_vertex: bool,
    pub on_boundary: Vec<bool>,
}

/// One of the twenty faces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedFace {
    /// Running index over all faces.
    pub id: usize,
    /// 1-based net triangle the face is cut from.
    pub triangle: usize,
    pub label: String,
    /// Rotation step `i` of `i·2π/s`.
    pub repetition: usize,
    pub vertices: [Point3d; 3],
    /// Unit normal of the flat face, pointing away from the cage centre.
    pub normal: Vec3,
    pub fragments: Vec<PlacedFragment>,
}

impl PlacedFace {
    pub fn centroid(&self) -> Point3d {
        let [a, b, c] = self.vertices;
        Point3d::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0, (a.z + b.z + c.z) / 3.0)
    }

    pub fn area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        (b - a).cross(&(c - a)).length() / 2.0
    }
}

fn outward_normal(vertices: &[Point3d; 3]) -> Vec3 {
    let [a, b, c] = *vertices;
    let n = (b - a).cross(&(c - a)).unit();
    let center = Point3d::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0, (a.z + b.z + c.z) / 3.0);
    if center.to_vec3().dot(&n) < 0.0 { -n } else { n }
}

/// Place every configured face and its rotated copies.
#[instrument(skip_all, fields(symmetry = ?config.symmetry))]
pub fn assemble(facets: &[Facet], cage: &[Point3d], config: &IcoFaceConfig) -> Result<Vec<PlacedFace>, CapsidError> {
    let step = config.symmetry.step_angle();
    let mut faces = Vec::with_capacity(config.face_count());

    for def in config.faces {
        let facet = facets
            .iter()
            .find(|f| f.id == def.triangle)
            .ok_or_else(|| CapsidError::impossible(format!("no facet for net triangle T{}", def.triangle)))?;
        let mut base = [Point3d::ORIGIN; 3];
        for (slot, &v) in base.iter_mut().zip(def.vertices.iter()) {
            *slot = *cage
                .get(v)
                .ok_or_else(|| CapsidError::impossible(format!("cage has no vertex {v}")))?;
        }

        for i in 0..def.repetitions {
            let vertices = base.map(|p| p.rotate_about(&Vec3::Z, i as f64 * step));
            let map = FaceMap::new(&facet.triangle, &vertices)?;
            let fragments = facet
                .fragments
                .iter()
                .map(|f| PlacedFragment {
                    points: f.polygon.points.iter().map(|p| map.apply(p)).collect(),
                    mer: f.mer,
                    offset: f.offset,
                    centroid: map.apply(&f.centroid),
                    has_centroid: f.has_centroid,
                    centroid_on_vertex: f.centroid_on_vertex,
                    on_boundary: f.on_boundary.clone(),
                })
                .collect();
            faces.push(PlacedFace {
                id: faces.len(),
                triangle: def.triangle,
                label: def.label.to_string(),
                repetition: i,
                normal: outward_normal(&vertices),
                vertices,
                fragments,
            });
        }
    }

    info!(faces = faces.len(), "faces assembled");
    Ok(faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::extract_facets;
    use crate::fold::{ico_axis, FoldEdges};
    use crate::lattice::Lattice;
    use crate::params::{Symmetry, TileType};
    use crate::tiles::Tile;
    use capsid_solver::SolverConfig;

    fn hex_t3(symmetry: Symmetry) -> (Vec<Facet>, Vec<Point3d>, IcoFaceConfig) {
        let lattice = Lattice::build(Tile::new(TileType::Hex, 1.0), 1, 1, 1, 1).unwrap();
        let config = IcoFaceConfig::for_symmetry(symmetry);
        let facets = extract_facets(&lattice, config.triangle_count());
        let edges = FoldEdges::from_ck(&lattice.ck);
        let cage = ico_axis(symmetry, &edges, &SolverConfig::default()).unwrap();
        (facets, cage, config)
    }

    #[test]
    fn test_face_map_hits_targets() {
        let reference = [Point2d::ORIGIN, Point2d::new(2.0, 0.0), Point2d::new(0.0, 1.0)];
        let target = [
            Point3d::new(1.0, 1.0, 1.0),
            Point3d::new(3.0, 1.0, 2.0),
            Point3d::new(1.0, -1.0, 0.0),
        ];
        let map = FaceMap::new(&reference, &target).unwrap();
        for (r, t) in reference.iter().zip(target.iter()) {
            assert!(map.apply(r).distance_to(t) < 1e-12);
        }
        let mid = map.apply(&Point2d::new(1.0, 0.0));
        assert!(mid.distance_to(&Point3d::new(2.0, 1.0, 1.5)) < 1e-12);
    }

    #[test]
    fn test_face_map_rejects_degenerate_reference() {
        let reference = [Point2d::ORIGIN, Point2d::new(1.0, 1.0), Point2d::new(2.0, 2.0)];
        let target = [Point3d::ORIGIN; 3];
        assert!(matches!(
            FaceMap::new(&reference, &target),
            Err(CapsidError::ImpossibleConstruction { .. })
        ));
    }

    #[test]
    fn test_twenty_faces_with_fragments() {
        for s in [Symmetry::Two, Symmetry::Three, Symmetry::Five] {
            let (facets, cage, config) = hex_t3(s);
            let faces = assemble(&facets, &cage, &config).unwrap();
            assert_eq!(faces.len(), 20, "{s:?}");
            assert!(faces.iter().all(|f| !f.fragments.is_empty()));
            let ids: Vec<usize> = faces.iter().map(|f| f.id).collect();
            assert_eq!(ids, (0..20).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_fragments_lie_in_face_plane() {
        let (facets, cage, config) = hex_t3(Symmetry::Five);
        for face in assemble(&facets, &cage, &config).unwrap() {
            let origin = face.vertices[0];
            for fragment in &face.fragments {
                for p in &fragment.points {
                    assert!((*p - origin).dot(&face.normal).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_normals_point_outward() {
        let (facets, cage, config) = hex_t3(Symmetry::Three);
        for face in assemble(&facets, &cage, &config).unwrap() {
            assert!(face.centroid().to_vec3().dot(&face.normal) > 0.0);
            assert!((face.normal.length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_offsets_survive_placement() {
        let (facets, cage, config) = hex_t3(Symmetry::Five);
        let faces = assemble(&facets, &cage, &config).unwrap();
        for face in &faces {
            let facet = facets.iter().find(|f| f.id == face.triangle).unwrap();
            let placed: Vec<u8> = face.fragments.iter().map(|f| f.offset).collect();
            let source: Vec<u8> = facet.fragments.iter().map(|f| f.offset).collect();
            assert_eq!(placed, source);
        }
    }

    #[test]
    fn test_full_turn_returns_to_start() {
        let (facets, cage, config) = hex_t3(Symmetry::Five);
        let faces = assemble(&facets, &cage, &config).unwrap();
        let step = Symmetry::Five.step_angle();
        let first = &faces[0];
        let last = &faces[4];
        assert_eq!((first.repetition, last.repetition), (0, 4));
        for (a, b) in first.vertices.iter().zip(last.vertices.iter()) {
            assert!(b.rotate_about(&Vec3::Z, step).distance_to(a) < 1e-9);
        }
    }
}
