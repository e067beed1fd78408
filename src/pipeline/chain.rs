//! Two-stage prompt chain: trip parameters -> refined prompt -> plan text.
//!
//! Stage 1 asks a stronger model to write a well-specified prompt from the
//! raw trip fields; stage 2 hands that prompt to a cheaper model for the bulk
//! free-text generation. The split is a cost/latency trade-off, not a
//! correctness requirement. The two calls are strictly sequential: stage 2
//! cannot be issued before stage 1's reply has been parsed.

use std::sync::Arc;

use serde::Deserialize;

use crate::config::ChainConfig;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::parse_reply;
use crate::plan::TripRequest;
use crate::providers::{GenerateRequest, ResponseFormat, TextModel};

/// Stage-1 instruction: produce a prompt, not a plan.
const REFINE_INSTRUCTION: &str = "Based on the provided trip details, write the best possible \
    prompt for producing an optimal travel plan. Respond as JSON in the form \
    {\"prompt\": \"prompt text\"}.";

/// Stage-2 instruction: produce the plan itself.
const DRAFT_INSTRUCTION: &str = "Follow the prompt. Write plain text, not markdown, within 500 \
    characters. Respond as JSON in the form {\"plan\": \"plan text\"}.";

/// Two-stage sequential prompt chain.
pub struct PromptChainer {
    model: Arc<dyn TextModel>,
    refine_model: String,
    draft_model: String,
}

impl PromptChainer {
    /// Create a chainer over the given provider.
    #[must_use]
    pub fn new(model: Arc<dyn TextModel>, chain: &ChainConfig) -> Self {
        Self {
            model,
            refine_model: chain.refine_model.clone(),
            draft_model: chain.draft_model.clone(),
        }
    }

    /// Turn trip parameters into plan text through both stages.
    ///
    /// # Errors
    /// Propagates the first stage failure; no retry is performed.
    pub async fn produce_plan(&self, trip: &TripRequest) -> PipelineResult<String> {
        let prompt = self.refine_prompt(trip).await?;
        tracing::debug!(%prompt, "prompt refined");
        self.draft_plan(&prompt).await
    }

    /// Stage 1: refine the raw trip fields into a context-aware prompt.
    async fn refine_prompt(&self, trip: &TripRequest) -> PipelineResult<String> {
        let request = GenerateRequest {
            model: self.refine_model.clone(),
            system_instruction: REFINE_INSTRUCTION.to_string(),
            user_content: describe_trip(trip),
            response_format: ResponseFormat::JsonObject {
                required_field: "prompt",
            },
        };
        let text = self.model.generate(request).await?;
        let reply: RefinedReply = parse_reply(&text)?;
        Ok(reply.prompt)
    }

    /// Stage 2: draft the plan from the refined prompt.
    async fn draft_plan(&self, prompt: &str) -> PipelineResult<String> {
        let request = GenerateRequest {
            model: self.draft_model.clone(),
            system_instruction: DRAFT_INSTRUCTION.to_string(),
            user_content: prompt.to_string(),
            response_format: ResponseFormat::JsonObject {
                required_field: "plan",
            },
        };
        let text = self.model.generate(request).await?;
        let reply: PlanReply = parse_reply(&text)?;
        Ok(reply.plan)
    }
}

/// Render the trip fields into the stage-1 descriptive block.
fn describe_trip(trip: &TripRequest) -> String {
    format!(
        "[destination] {}\n[purpose] {}\n[party size] {}\n[start date] {}\n[end date] {}",
        trip.destination, trip.purpose, trip.people_count, trip.start_date, trip.end_date
    )
}

#[derive(Debug, Deserialize)]
struct RefinedReply {
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct PlanReply {
    plan: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::pipeline::PipelineError;
    use crate::providers::ModelFuture;

    fn trip() -> TripRequest {
        serde_json::from_str(
            r#"{
                "destination": "Busan",
                "purpose": "vacation",
                "people_count": 2,
                "start_date": "2025-05-01",
                "end_date": "2025-05-04"
            }"#,
        )
        .unwrap()
    }

    /// Serves scripted stage replies and records every call in order.
    struct ScriptedChainModel {
        calls: Mutex<Vec<GenerateRequest>>,
        refined: &'static str,
        plan: &'static str,
    }

    impl ScriptedChainModel {
        fn new(refined: &'static str, plan: &'static str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                refined,
                plan,
            }
        }
    }

    impl TextModel for ScriptedChainModel {
        fn generate(&self, request: GenerateRequest) -> ModelFuture<'_, PipelineResult<String>> {
            Box::pin(async move {
                let stage = {
                    let mut calls = self.calls.lock().unwrap();
                    calls.push(request);
                    calls.len()
                };
                match stage {
                    1 => Ok(format!(r#"{{"prompt":"{}"}}"#, self.refined)),
                    2 => Ok(format!(r#"{{"plan":"{}"}}"#, self.plan)),
                    _ => Err(PipelineError::ModelCallFailed(
                        "unexpected third call".to_string(),
                    )),
                }
            })
        }
    }

    #[tokio::test]
    async fn test_stage_two_consumes_stage_one_prompt_in_order() {
        let model = Arc::new(ScriptedChainModel::new(
            "Plan a 3-day trip to Busan",
            "Visit Haeundae beach on day one.",
        ));
        let chainer = PromptChainer::new(model.clone(), &ChainConfig::default());

        let plan = chainer.produce_plan(&trip()).await.unwrap();
        assert_eq!(plan, "Visit Haeundae beach on day one.");

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);

        // Stage 1 asks the refine model for a prompt from the trip block.
        assert_eq!(calls[0].model, "gemini-2.5-flash");
        assert_eq!(
            calls[0].response_format,
            ResponseFormat::JsonObject { required_field: "prompt" }
        );
        assert!(calls[0].user_content.contains("[destination] Busan"));

        // Stage 2 carries exactly the extracted prompt, nothing more.
        assert_eq!(calls[1].model, "gemini-2.5-flash-lite");
        assert_eq!(calls[1].user_content, "Plan a 3-day trip to Busan");
        assert_eq!(
            calls[1].response_format,
            ResponseFormat::JsonObject { required_field: "plan" }
        );
    }

    /// Replies with text that is not the contractual JSON object.
    struct BrokenModel;

    impl TextModel for BrokenModel {
        fn generate(&self, _request: GenerateRequest) -> ModelFuture<'_, PipelineResult<String>> {
            Box::pin(async { Ok("Sure! Here is your prompt: go to Busan".to_string()) })
        }
    }

    #[tokio::test]
    async fn test_non_json_stage_one_reply_is_malformed_not_a_crash() {
        let chainer = PromptChainer::new(Arc::new(BrokenModel), &ChainConfig::default());
        let result = chainer.produce_plan(&trip()).await;
        assert!(matches!(
            result,
            Err(PipelineError::MalformedModelOutput(_))
        ));
    }

    /// Fails outright, as a quota or network error would.
    struct FailingModel;

    impl TextModel for FailingModel {
        fn generate(&self, _request: GenerateRequest) -> ModelFuture<'_, PipelineResult<String>> {
            Box::pin(async {
                Err(PipelineError::ModelCallFailed("quota exceeded".to_string()))
            })
        }
    }

    #[tokio::test]
    async fn test_stage_one_failure_aborts_before_stage_two() {
        let chainer = PromptChainer::new(Arc::new(FailingModel), &ChainConfig::default());
        let result = chainer.produce_plan(&trip()).await;
        assert!(matches!(result, Err(PipelineError::ModelCallFailed(_))));
    }

    #[test]
    fn test_trip_block_renders_every_field() {
        let block = describe_trip(&trip());
        assert_eq!(
            block,
            "[destination] Busan\n[purpose] vacation\n[party size] 2\n\
             [start date] 2025-05-01\n[end date] 2025-05-04"
        );
    }
}
