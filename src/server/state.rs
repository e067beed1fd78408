//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::AgentConfig;
use crate::pipeline::{BudgetEnsembler, PlanPipeline, PromptChainer};
use crate::providers::{GeminiModel, OpenAiModel, TextModel};
use crate::storage::{PlanStore, SqlitePlanStore};

/// Shared application state.
pub struct AppState {
    /// Plan generation pipeline.
    pub pipeline: PlanPipeline,
    /// Plan record store.
    pub store: Arc<dyn PlanStore>,
}

impl AppState {
    /// Build the state from configuration: provider clients, pipeline, store.
    ///
    /// # Errors
    /// Returns an error if a provider client cannot be created or the
    /// database cannot be opened.
    pub async fn new(
        config: &AgentConfig,
    ) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let gemini: Arc<dyn TextModel> = Arc::new(GeminiModel::new(&config.gemini)?);
        let openai: Arc<dyn TextModel> = Arc::new(OpenAiModel::new(&config.openai)?);

        let pipeline = PlanPipeline::new(
            PromptChainer::new(gemini, &config.chain),
            BudgetEnsembler::new(openai, &config.ensemble),
        );

        let store = SqlitePlanStore::open(&config.db_path).await?;

        Ok(Arc::new(Self {
            pipeline,
            store: Arc::new(store),
        }))
    }
}
