//! Fibers standing off the capsid surface, and the knobs at their tips.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::assemble::PlacedFace;
use crate::geometry::Point3d;
use crate::inflate::Inflation;

/// Which fibers to grow and how.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiberConfig {
    pub length: f64,
    /// One fiber per cage vertex.
    pub vertex_fibers: bool,
    /// Mer fibers for offsets 1 through 6.
    pub mer_offsets: [bool; 6],
    pub knobs: bool,
    pub knob_radius: f64,
    /// Fibers whose roots are closer than this are merged.
    pub collapse_tolerance: f64,
}

impl Default for FiberConfig {
    fn default() -> Self {
        Self {
            length: 1.0,
            vertex_fibers: true,
            mer_offsets: [false; 6],
            knobs: false,
            knob_radius: 0.25,
            collapse_tolerance: 1e-5,
        }
    }
}

impl FiberConfig {
    pub fn mer_enabled(&self, offset: u8) -> bool {
        offset
            .checked_sub(1)
            .and_then(|i| self.mer_offsets.get(i as usize))
            .copied()
            .unwrap_or(false)
    }
}

/// A straight fiber in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fiber {
    pub from: Point3d,
    pub to: Point3d,
}

/// Fibers pointing away from the centroid of each vertex's neighbours.
pub fn vertex_fibers(cage: &[Point3d], adjacency: &[[usize; 5]; 12], inflation: &Inflation, length: f64) -> Vec<Fiber> {
    cage.iter()
        .zip(adjacency.iter())
        .filter_map(|(vertex, neighbours)| {
            let mut direction = vertex.to_vec3() * neighbours.len() as f64;
            for &n in neighbours {
                direction = direction - cage.get(n)?.to_vec3();
            }
            let from = inflation.apply(vertex);
            Some(Fiber {
                from,
                to: from + direction.normalized()? * length,
            })
        })
        .collect()
}

/// Fibers along the outward face normal, rooted at the inflated mer centroid.
pub fn mer_fibers(faces: &[PlacedFace], inflation: &Inflation, config: &FiberConfig) -> Vec<Fiber> {
    faces
        .iter()
        .flat_map(|face| {
            face.fragments
                .iter()
                .filter(|f| f.has_centroid && config.mer_enabled(f.offset))
                .map(move |f| {
                    let from = inflation.apply(&f.centroid);
                    Fiber {
                        from,
                        to: from + face.normal * config.length,
                    }
                })
        })
        .collect()
}

/// Merge fibers whose roots lie within `tolerance` of a group's first root.
/// A merged fiber keeps that root and ends at the mean of the group's tips.
pub fn collapse(fibers: &[Fiber], tolerance: f64) -> Vec<Fiber> {
    let mut groups: Vec<(Point3d, Vec<Point3d>)> = Vec::new();
    for fiber in fibers {
        match groups.iter_mut().find(|(root, _)| root.distance_to(&fiber.from) < tolerance) {
            Some((_, tips)) => tips.push(fiber.to),
            None => groups.push((fiber.from, vec![fiber.to])),
        }
    }
    groups
        .into_iter()
        .filter_map(|(from, tips)| {
            Some(Fiber {
                from,
                to: Point3d::centroid(&tips)?,
            })
        })
        .collect()
}

#[instrument(skip_all, fields(faces = faces.len()))]
pub fn generate_fibers(
    cage: &[Point3d],
    adjacency: &[[usize; 5]; 12],
    faces: &[PlacedFace],
    inflation: &Inflation,
    config: &FiberConfig,
) -> Vec<Fiber> {
    let mut fibers = Vec::new();
    if config.vertex_fibers {
        fibers.extend(vertex_fibers(cage, adjacency, inflation, config.length));
    }
    fibers.extend(mer_fibers(faces, inflation, config));
    let merged = collapse(&fibers, config.collapse_tolerance);
    info!(raw = fibers.len(), merged = merged.len(), "fibers generated");
    merged
}
