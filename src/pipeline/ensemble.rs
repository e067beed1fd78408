//! Multi-model budget ensemble: plan text -> [min, max] budget range.
//!
//! The plan text is fanned out to every configured member model at once.
//! Join semantics are fail-fast: the first member failure fails the whole
//! estimate, and the remaining in-flight calls are dropped. Survivors are
//! never combined into a partial range.

use std::sync::Arc;

use futures::future;
use serde::Deserialize;

use crate::config::EnsembleConfig;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::parse_reply;
use crate::plan::BudgetRange;
use crate::providers::{GenerateRequest, ResponseFormat, TextModel};

/// Instruction shared by every ensemble member.
const BUDGET_INSTRUCTION: &str = "You are a travel budget expert. Given a finished travel plan, \
    estimate the total budget for the whole trip. Respond as JSON in the form \
    {\"budget\": \"amount\"}.";

/// Parallel multi-model budget estimator.
pub struct BudgetEnsembler {
    model: Arc<dyn TextModel>,
    members: Vec<String>,
}

impl BudgetEnsembler {
    /// Create an ensembler over the given provider.
    #[must_use]
    pub fn new(model: Arc<dyn TextModel>, ensemble: &EnsembleConfig) -> Self {
        Self {
            model,
            members: ensemble.models.clone(),
        }
    }

    /// Estimate a budget range for the given plan text.
    ///
    /// # Errors
    /// Fails with [`PipelineError::EnsemblePartialFailure`] as soon as any
    /// member call fails or returns an unusable budget.
    pub async fn estimate(&self, plan: &str) -> PipelineResult<BudgetRange> {
        let calls = self
            .members
            .iter()
            .map(|member| self.member_estimate(member, plan));
        let estimates = future::try_join_all(calls).await?;

        BudgetRange::from_estimates(&estimates).ok_or_else(|| {
            PipelineError::MalformedModelOutput("ensemble produced no estimates".to_string())
        })
    }

    /// One member's call: generate, parse, normalize.
    async fn member_estimate(&self, member: &str, plan: &str) -> PipelineResult<u64> {
        let request = GenerateRequest {
            model: member.to_string(),
            system_instruction: BUDGET_INSTRUCTION.to_string(),
            user_content: plan.to_string(),
            response_format: ResponseFormat::JsonObject {
                required_field: "budget",
            },
        };

        let outcome = async {
            let text = self.model.generate(request).await?;
            let reply: BudgetReply = parse_reply(&text)?;
            normalize_budget(&reply.budget)
        }
        .await;

        outcome.map_err(|source| PipelineError::EnsemblePartialFailure {
            model: member.to_string(),
            source: Box::new(source),
        })
    }
}

/// Reduce a budget string to its digits and parse it as an integer.
///
/// Currency symbols, grouping punctuation, and surrounding prose are
/// stripped; "약 1,200,000원" normalizes to 1200000.
fn normalize_budget(raw: &str) -> PipelineResult<u64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(PipelineError::MalformedModelOutput(format!(
            "budget '{raw}' carries no digits"
        )));
    }
    digits.parse::<u64>().map_err(|e| {
        PipelineError::MalformedModelOutput(format!("budget '{raw}' does not fit an integer: {e}"))
    })
}

#[derive(Debug, Deserialize)]
struct BudgetReply {
    budget: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::providers::ModelFuture;

    /// Serves one scripted reply per member model; optionally one member
    /// fails as a quota error would.
    struct ScriptedEnsembleModel {
        replies: HashMap<String, String>,
        failing_member: Option<String>,
    }

    impl ScriptedEnsembleModel {
        fn new(replies: &[(&str, &str)]) -> Self {
            Self {
                replies: replies
                    .iter()
                    .map(|(model, budget)| {
                        ((*model).to_string(), format!(r#"{{"budget":"{budget}"}}"#))
                    })
                    .collect(),
                failing_member: None,
            }
        }

        fn failing(mut self, member: &str) -> Self {
            self.failing_member = Some(member.to_string());
            self
        }
    }

    impl TextModel for ScriptedEnsembleModel {
        fn generate(&self, request: GenerateRequest) -> ModelFuture<'_, PipelineResult<String>> {
            Box::pin(async move {
                if self.failing_member.as_deref() == Some(request.model.as_str()) {
                    return Err(PipelineError::ModelCallFailed("quota exceeded".to_string()));
                }
                self.replies.get(&request.model).cloned().ok_or_else(|| {
                    PipelineError::ModelCallFailed(format!("unknown model '{}'", request.model))
                })
            })
        }
    }

    fn ensemble(members: &[&str]) -> EnsembleConfig {
        EnsembleConfig {
            models: members.iter().map(|m| (*m).to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_estimates_reduce_to_min_max_span() {
        let model = Arc::new(ScriptedEnsembleModel::new(&[
            ("model-a", "120000"),
            ("model-b", "95000"),
            ("model-c", "150000"),
        ]));

        let forward = BudgetEnsembler::new(model.clone(), &ensemble(&["model-a", "model-b", "model-c"]));
        let backward = BudgetEnsembler::new(model, &ensemble(&["model-c", "model-b", "model-a"]));

        let expected = BudgetRange { min: 95_000, max: 150_000 };
        assert_eq!(forward.estimate("plan").await.unwrap(), expected);
        assert_eq!(backward.estimate("plan").await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_single_member_yields_degenerate_range() {
        let model = Arc::new(ScriptedEnsembleModel::new(&[("model-a", "80000원")]));
        let ensembler = BudgetEnsembler::new(model, &ensemble(&["model-a"]));

        assert_eq!(
            ensembler.estimate("plan").await.unwrap(),
            BudgetRange { min: 80_000, max: 80_000 }
        );
    }

    #[tokio::test]
    async fn test_one_member_failure_discards_survivors() {
        let model = Arc::new(
            ScriptedEnsembleModel::new(&[("model-a", "120000"), ("model-c", "150000")])
                .failing("model-b"),
        );
        let ensembler =
            BudgetEnsembler::new(model, &ensemble(&["model-a", "model-b", "model-c"]));

        match ensembler.estimate("plan").await {
            Err(PipelineError::EnsemblePartialFailure { model, source }) => {
                assert_eq!(model, "model-b");
                assert!(matches!(*source, PipelineError::ModelCallFailed(_)));
            }
            other => panic!("expected ensemble failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_digit_free_budget_fails_that_member() {
        let model = Arc::new(ScriptedEnsembleModel::new(&[
            ("model-a", "무료"),
            ("model-b", "95000"),
        ]));
        let ensembler = BudgetEnsembler::new(model, &ensemble(&["model-a", "model-b"]));

        match ensembler.estimate("plan").await {
            Err(PipelineError::EnsemblePartialFailure { model, source }) => {
                assert_eq!(model, "model-a");
                assert!(matches!(*source, PipelineError::MalformedModelOutput(_)));
            }
            other => panic!("expected ensemble failure, got {other:?}"),
        }
    }

    #[test]
    fn test_budget_normalization_strips_non_digits() {
        assert_eq!(normalize_budget("약 1,200,000원").unwrap(), 1_200_000);
        assert_eq!(normalize_budget("80000원").unwrap(), 80_000);
        assert_eq!(normalize_budget("₩95,000").unwrap(), 95_000);
        assert!(matches!(
            normalize_budget("free of charge"),
            Err(PipelineError::MalformedModelOutput(_))
        ));
    }
}
