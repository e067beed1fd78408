//! OpenAI-compatible chat completions client.
//!
//! Used for the budget ensemble fan-out. The same client serves every
//! configured member model; members differ only in the model identifier
//! carried by the request.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::pipeline::{PipelineError, PipelineResult};
use crate::providers::{GenerateRequest, ModelFuture, ResponseFormat, TextModel};

/// OpenAI REST API base URL.
const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Per-call timeout.
const CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI-compatible provider client.
pub struct OpenAiModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiModel {
    /// Build a client from provider configuration.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ProviderConfig) -> PipelineResult<Self> {
        let client = reqwest::Client::builder().timeout(CALL_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| OPENAI_API_URL.to_string()),
        })
    }
}

impl TextModel for OpenAiModel {
    fn generate(&self, request: GenerateRequest) -> ModelFuture<'_, PipelineResult<String>> {
        Box::pin(async move {
            let url = format!("{}/chat/completions", self.base_url);
            let body = ChatRequest {
                model: &request.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: &request.system_instruction,
                    },
                    ChatMessage {
                        role: "user",
                        content: &request.user_content,
                    },
                ],
                response_format: response_format(request.response_format),
            };

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(PipelineError::ModelCallFailed(format!(
                    "'{}' returned status {status}",
                    request.model
                )));
            }

            let reply: ChatCompletion = response.json().await.map_err(|e| {
                PipelineError::MalformedModelOutput(format!("chat completion body: {e}"))
            })?;
            choice_text(reply)
        })
    }
}

/// Map the reply-shape constraint onto the chat completions request.
fn response_format(format: ResponseFormat) -> Option<ChatResponseFormat> {
    match format {
        ResponseFormat::PlainText => None,
        // The required field itself is enforced by the system instruction;
        // json_object mode only guarantees a parseable object.
        ResponseFormat::JsonObject { .. } => Some(ChatResponseFormat {
            kind: "json_object",
        }),
    }
}

/// Pull the assistant text out of the first choice.
fn choice_text(reply: ChatCompletion) -> PipelineResult<String> {
    reply
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| {
            PipelineError::MalformedModelOutput(
                "chat completion carried no assistant text".to_string(),
            )
        })
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ChatResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
