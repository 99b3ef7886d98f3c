//! End-to-end construction of a renderable capsid.

use capsid_solver::SolverConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::assemble::{assemble, PlacedFace};
use crate::camera::{depth_order, Camera};
use crate::error::CapsidError;
use crate::facet::{extract_facets, strokes};
use crate::fiber::{generate_fibers, FiberConfig};
use crate::fold::{ico_axis, FoldEdges, IcoFaceConfig};
use crate::geometry::{Point2d, Point3d};
use crate::inflate::Inflation;
use crate::lattice::Lattice;
use crate::metric::surface_area_error;
use crate::params::LatticeParams;
use crate::tiles::Tile;

/// Knobs for one build that are not part of the lattice itself.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub solver: SolverConfig,
    pub fibers: FiberConfig,
}

impl BuildConfig {
    pub fn from_json(text: &str) -> Result<Self, CapsidError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A fragment after inflation and projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapsidFragment {
    pub mer: u8,
    pub offset: u8,
    /// Inflated world-space vertices.
    pub points: Vec<Point3d>,
    /// Image-plane vertices.
    pub projected: Vec<Point2d>,
    pub on_boundary: Vec<bool>,
    /// Vertex runs to draw, seams left out.
    pub strokes: Vec<Vec<usize>>,
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapsidFace {
    pub id: usize,
    pub triangle: usize,
    pub label: String,
    pub repetition: usize,
    pub fragments: Vec<CapsidFragment>,
    /// Projected depth of the inflated face centroid.
    pub depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapsidFiber {
    pub from: Point3d,
    pub to: Point3d,
    pub projected: [Point2d; 2],
    pub depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knob {
    pub center: Point3d,
    pub projected: Point2d,
    pub radius: f64,
    pub depth: f64,
}

/// What a draw-order entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "lowercase")]
pub enum Primitive {
    Face(usize),
    Fiber(usize),
    Knob(usize),
}

/// The finished mesh, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledCapsid {
    pub t_number: i32,
    pub q_number: i32,
    /// Folded cage vertices before inflation.
    pub cage: Vec<Point3d>,
    pub inflation: Inflation,
    pub faces: Vec<CapsidFace>,
    pub fibers: Vec<CapsidFiber>,
    pub knobs: Vec<Knob>,
    /// Back-to-front drawing order.
    pub draw_order: Vec<Primitive>,
    pub sa_error: f64,
}

impl AssembledCapsid {
    pub fn fragment_count(&self) -> usize {
        self.faces.iter().map(|f| f.fragments.len()).sum()
    }

    fn is_finite(&self) -> bool {
        let fragments = self
            .faces
            .iter()
            .flat_map(|f| &f.fragments)
            .flat_map(|f| &f.points)
            .all(Point3d::is_finite);
        let fibers = self.fibers.iter().all(|f| f.from.is_finite() && f.to.is_finite());
        fragments && fibers && self.sa_error.is_finite()
    }
}

fn project_face(face: &PlacedFace, inflation: &Inflation, camera: &Camera) -> CapsidFace {
    let fragments = face
        .fragments
        .iter()
        .map(|f| {
            let points: Vec<Point3d> = f.points.iter().map(|p| inflation.apply(p)).collect();
            CapsidFragment {
                mer: f.mer,
                offset: f.offset,
                projected: points.iter().map(|p| camera.project_2d(p)).collect(),
                depth: camera.project(&inflation.apply(&f.centroid)).z,
                points,
                on_boundary: f.on_boundary.clone(),
                strokes: strokes(&f.on_boundary),
            }
        })
        .collect();
    CapsidFace {
        id: face.id,
        triangle: face.triangle,
        label: face.label.clone(),
        repetition: face.repetition,
        fragments,
        depth: camera.project(&inflation.apply(&face.centroid())).z,
    }
}

/// Build the full capsid for `params`.
#[instrument(skip_all, fields(tile = %params.tile, h = params.h, k = params.k, s = params.symmetry))]
pub fn build_capsid(params: &LatticeParams, config: &BuildConfig) -> Result<AssembledCapsid, CapsidError> {
    params.validate()?;
    let symmetry = params.symmetry()?;
    let (h2, k2) = params.second_axis();

    let lattice = Lattice::build(Tile::new(params.tile_type()?, params.radius), params.h, params.k, h2, k2)?;
    let face_config = IcoFaceConfig::for_symmetry(symmetry);
    let facets = extract_facets(&lattice, face_config.triangle_count());

    let cage = ico_axis(symmetry, &FoldEdges::from_ck(&lattice.ck), &config.solver)?;
    let placed = assemble(&facets, &cage, &face_config)?;
    let inflation = Inflation::for_cage(&cage, symmetry, params.is_equilateral(), params.inflation)?;
    let camera = Camera::new(params.theta, params.psi, params.phi);

    let faces: Vec<CapsidFace> = placed.iter().map(|f| project_face(f, &inflation, &camera)).collect();

    let fibers: Vec<CapsidFiber> = generate_fibers(&cage, face_config.adjacency, &placed, &inflation, &config.fibers)
        .into_iter()
        .map(|f| CapsidFiber {
            projected: [camera.project_2d(&f.from), camera.project_2d(&f.to)],
            depth: camera.project(&f.from.midpoint(&f.to)).z,
            from: f.from,
            to: f.to,
        })
        .collect();

    let knobs: Vec<Knob> = if config.fibers.knobs {
        fibers
            .iter()
            .map(|f| Knob {
                center: f.to,
                projected: camera.project_2d(&f.to),
                radius: config.fibers.knob_radius,
                depth: camera.project(&f.to).z,
            })
            .collect()
    } else {
        Vec::new()
    };

    let primitives: Vec<(Primitive, f64)> = faces
        .iter()
        .enumerate()
        .map(|(i, f)| (Primitive::Face(i), f.depth))
        .chain(fibers.iter().enumerate().map(|(i, f)| (Primitive::Fiber(i), f.depth)))
        .chain(knobs.iter().enumerate().map(|(i, k)| (Primitive::Knob(i), k.depth)))
        .collect();
    let depths: Vec<f64> = primitives.iter().map(|(_, d)| *d).collect();
    let draw_order = depth_order(&depths).into_iter().map(|i| primitives[i].0).collect();

    let capsid = AssembledCapsid {
        t_number: params.t_number(),
        q_number: params.q_number(),
        sa_error: surface_area_error(&lattice.ck, &cage, &face_config)?,
        cage,
        inflation,
        faces,
        fibers,
        knobs,
        draw_order,
    };
    if !capsid.is_finite() {
        return Err(CapsidError::impossible("assembled geometry is not finite"));
    }

    info!(
        faces = capsid.faces.len(),
        fragments = capsid.fragment_count(),
        fibers = capsid.fibers.len(),
        knobs = capsid.knobs.len(),
        sa_error = capsid.sa_error,
        "capsid built"
    );
    Ok(capsid)
}
