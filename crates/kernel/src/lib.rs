//! Geometry kernel for Caspar–Klug capsid models.
//!
//! A lattice of mers is clipped to the net triangles spanned by `(h, k)`
//! and `(H, K)`, the net is folded into an icosahedral cage around a 2-, 3-
//! or 5-fold axis, and every facet is mapped onto its cage faces, inflated
//! and projected for drawing.

pub mod assemble;
pub mod camera;
pub mod capsid;
pub mod error;
pub mod facet;
pub mod fiber;
pub mod fold;
pub mod geometry;
pub mod inflate;
pub mod lattice;
pub mod metric;
pub mod params;
pub mod tiles;

pub use capsid::{build_capsid, AssembledCapsid, BuildConfig};
pub use error::CapsidError;
pub use fiber::FiberConfig;
pub use metric::model_sa_error;
pub use params::{LatticeParams, Symmetry, TileType};

pub use capsid_solver::SolverConfig;
