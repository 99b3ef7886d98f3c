//! Scalar root finding for the capsid fold constructions.
//!
//! The folds are driven by one-dimensional closure residuals: scan an
//! interval for the first sign change, then bisect it down to the tolerance.

pub mod solver;

pub use solver::*;
