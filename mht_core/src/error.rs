//! Error types for the MHT core.

use thiserror::Error;

/// Errors surfaced by the tracking engine.
///
/// Per-hypothesis numerical failures (a covariance whose determinant goes
/// non-positive) are not represented here: they degrade to culling the
/// affected hypothesis and the run continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MhtError {
    /// A configuration value failed validation before the run started.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The host supplied no frames at all.
    #[error("no detection frames provided")]
    EmptyRun,

    /// A detection's dimensionality differs from the first detection of the run.
    #[error("dimension mismatch at frame {frame}: expected {expected}, found {found}")]
    DimensionMismatch {
        frame: usize,
        expected: usize,
        found: usize,
    },
}
