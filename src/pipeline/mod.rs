//! Plan generation pipeline.
//!
//! Control flow per submission: trip parameters -> [`PromptChainer`] (two
//! sequential calls) -> plan text -> [`BudgetEnsembler`] (parallel fan-out)
//! -> budget range. Both components are stateless per invocation; nothing is
//! shared between concurrent submissions.

pub mod chain;
pub mod ensemble;
pub mod error;

pub use chain::PromptChainer;
pub use ensemble::BudgetEnsembler;
pub use error::{PipelineError, PipelineResult};

use serde::de::DeserializeOwned;

use crate::plan::{PlanDraft, TripRequest};

/// Composed pipeline invoked by the HTTP layer once per submitted trip.
pub struct PlanPipeline {
    chainer: PromptChainer,
    ensembler: BudgetEnsembler,
}

impl PlanPipeline {
    /// Compose a pipeline from its two stages.
    #[must_use]
    pub fn new(chainer: PromptChainer, ensembler: BudgetEnsembler) -> Self {
        Self { chainer, ensembler }
    }

    /// Produce plan text and a budget range for the submitted trip.
    ///
    /// The draft is only returned when both stages succeed; a plan with no
    /// budget never leaves the pipeline.
    ///
    /// # Errors
    /// Propagates the first stage failure unchanged.
    pub async fn produce_plan_and_budget(&self, trip: &TripRequest) -> PipelineResult<PlanDraft> {
        let plan = self.chainer.produce_plan(trip).await?;
        let budget = self.ensembler.estimate(&plan).await?;
        Ok(PlanDraft { plan, budget })
    }
}

/// Parse a provider reply as the contractual JSON shape.
///
/// Model output is untrusted text; a broken body becomes a typed error here
/// instead of an uncaught fault.
pub(crate) fn parse_reply<T: DeserializeOwned>(text: &str) -> PipelineResult<T> {
    serde_json::from_str(text)
        .map_err(|e| PipelineError::MalformedModelOutput(format!("reply '{text}': {e}")))
}
