use capsid_solver::SolverConfig;
use tracing::instrument;

use crate::error::CapsidError;
use crate::fold::{ico_axis, FoldEdges, IcoFaceConfig};
use crate::geometry::{Point3d, Vec2};
use crate::lattice::ck_vectors;
use crate::params::LatticeParams;
use crate::tiles::basis;

/// Relative surface-area lost between the flat net and the folded cage,
/// `(sa_net - sa_capsid) / sa_net`.
pub fn surface_area_error(ck: &[Vec2; 4], cage: &[Point3d], config: &IcoFaceConfig) -> Result<f64, CapsidError> {
    let edges = [(ck[3], ck[0]), (ck[0], ck[1]), (ck[1], ck[2])];
    let sa_net: f64 = config
        .repetitions_per_triangle()
        .iter()
        .zip(edges.iter())
        .map(|(&n, (u, v))| u.cross(v).abs() / 2.0 * n as f64)
        .sum();

    let mut sa_capsid = 0.0;
    for face in config.faces {
        let [a, b, c] = face.vertices;
        let (Some(a), Some(b), Some(c)) = (cage.get(a), cage.get(b), cage.get(c)) else {
            return Err(CapsidError::impossible("face refers to a missing cage vertex"));
        };
        sa_capsid += (*b - *a).cross(&(*c - *a)).length() / 2.0 * face.repetitions as f64;
    }

    if sa_net == 0.0 {
        return Err(CapsidError::impossible("net has zero area"));
    }
    Ok((sa_net - sa_capsid) / sa_net)
}

/// Fold the cage for `params` and report its surface-area error, without
/// building any mesh.
#[instrument(skip_all, fields(tile = %params.tile, h = params.h, k = params.k))]
pub fn model_sa_error(params: &LatticeParams, solver: &SolverConfig) -> Result<f64, CapsidError> {
    params.validate()?;
    let symmetry = params.symmetry()?;
    let (h2, k2) = params.second_axis();
    let ck = ck_vectors(&basis(params.tile_type()?, params.radius), params.h, params.k, h2, k2);
    let cage = ico_axis(symmetry, &FoldEdges::from_ck(&ck), solver)?;
    surface_area_error(&ck, &cage, &IcoFaceConfig::for_symmetry(symmetry))
}
