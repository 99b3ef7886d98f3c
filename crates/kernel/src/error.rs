use capsid_solver::SolverError;
use thiserror::Error;

/// Failures that abort a capsid build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapsidError {
    #[error("Unknown tile type: {0:?}")]
    UnknownTile(String),

    #[error("Invalid symmetry order {0} (expected 2, 3 or 5)")]
    InvalidSymmetry(u8),

    #[error("Impossible construction: {reason}")]
    ImpossibleConstruction { reason: String },

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Malformed configuration: {0}")]
    Config(String),
}

impl CapsidError {
    pub(crate) fn impossible(reason: impl Into<String>) -> Self {
        Self::ImpossibleConstruction {
            reason: reason.into(),
        }
    }
}

impl From<SolverError> for CapsidError {
    fn from(err: SolverError) -> Self {
        Self::impossible(err.to_string())
    }
}

impl From<serde_json::Error> for CapsidError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
