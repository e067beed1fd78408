//! Error types for the plan pipeline.

use thiserror::Error;

/// Failures surfaced by the pipeline and its provider calls.
///
/// The pipeline performs no local recovery: every failure propagates to the
/// caller intact, with no retry and no fallback plan or budget.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The provider call itself failed (transport, auth, quota, timeout).
    #[error("model call failed: {0}")]
    ModelCallFailed(String),

    /// The provider answered, but the body does not match the contractually
    /// required JSON shape, or the required field cannot be normalized.
    #[error("malformed model output: {0}")]
    MalformedModelOutput(String),

    /// One ensemble member failed, discarding the whole estimate.
    ///
    /// Fail-fast join: surviving members' estimates are never combined into
    /// a partial range.
    #[error("ensemble member '{model}' failed: {source}")]
    EnsemblePartialFailure {
        /// Model identifier of the failed member.
        model: String,
        /// The member's underlying failure.
        #[source]
        source: Box<PipelineError>,
    },
}

impl From<reqwest::Error> for PipelineError {
    fn from(value: reqwest::Error) -> Self {
        Self::ModelCallFailed(value.to_string())
    }
}

/// Convenience result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
