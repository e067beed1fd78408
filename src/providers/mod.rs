//! Generative text provider boundary.
//!
//! Provider clients are injected behind the [`TextModel`] trait so the
//! pipeline can be exercised against scripted doubles in tests. Each call is
//! a single request/response round trip; no retry or backoff is performed.

pub mod gemini;
pub mod openai;

pub use gemini::GeminiModel;
pub use openai::OpenAiModel;

use std::future::Future;
use std::pin::Pin;

use crate::pipeline::PipelineResult;

/// Boxed future type for provider calls.
pub type ModelFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single generative text call to an external provider.
#[derive(Clone, Debug)]
pub struct GenerateRequest {
    /// Provider-side model identifier.
    pub model: String,
    /// Fixed system instruction for this call.
    pub system_instruction: String,
    /// User content (the sole user message).
    pub user_content: String,
    /// Constraint on the shape of the reply.
    pub response_format: ResponseFormat,
}

/// Reply-shape constraint passed to the provider.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResponseFormat {
    /// Free-form text, no structured-output constraint.
    PlainText,
    /// A JSON object with exactly one required string field.
    ///
    /// Gemini enforces this through a response schema; OpenAI-compatible
    /// providers through `response_format: json_object` plus the instruction.
    JsonObject {
        /// Name of the required string field.
        required_field: &'static str,
    },
}

/// Generative text provider.
///
/// Implementations issue one outbound call per [`GenerateRequest`] and return
/// the raw reply text. Decoding the reply into the contractual JSON shape is
/// the caller's job, so a syntactically broken body still reaches the
/// pipeline's fallible parse step instead of being swallowed here.
pub trait TextModel: Send + Sync {
    /// Issue one generation call and return the raw reply text.
    ///
    /// # Errors
    /// Returns [`PipelineError::ModelCallFailed`](crate::pipeline::PipelineError::ModelCallFailed)
    /// on transport, auth, quota, or timeout failures, and
    /// [`PipelineError::MalformedModelOutput`](crate::pipeline::PipelineError::MalformedModelOutput)
    /// when a successful response carries no usable text.
    fn generate(&self, request: GenerateRequest) -> ModelFuture<'_, PipelineResult<String>>;
}
