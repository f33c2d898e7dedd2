//! Error taxonomy for the analysis core.

use thiserror::Error;

/// Typed failures surfaced at the engine seam.
///
/// Resolver-level tier failures are recovered internally (they become
/// warnings on the result); only these three kinds ever reach a caller.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Bad or inconsistent input. Never retried.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Every fallback tier was exhausted for a required series.
    #[error("no data available: {0}. External sources may recover; try again later")]
    DataUnavailable(String),

    /// A calculator precondition was violated past validation. Treated
    /// as an internal-consistency fault and always surfaced.
    #[error("calculation domain error: {0}")]
    Domain(String),
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
