//! Google Gemini `generateContent` client.
//!
//! Uses the REST API directly over reqwest. Structured output is requested
//! through `responseMimeType`/`responseSchema` so the model is constrained to
//! a single-field JSON object when the caller asks for one.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::pipeline::{PipelineError, PipelineResult};
use crate::providers::{GenerateRequest, ModelFuture, ResponseFormat, TextModel};

/// Gemini REST API base URL.
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Per-call timeout. A hung provider call must not hang the owning request
/// indefinitely.
const CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Gemini provider client.
pub struct GeminiModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiModel {
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
                .unwrap_or_else(|| GEMINI_API_URL.to_string()),
        })
    }
}

impl TextModel for GeminiModel {
    fn generate(&self, request: GenerateRequest) -> ModelFuture<'_, PipelineResult<String>> {
        Box::pin(async move {
            let url = format!(
                "{}/models/{}:generateContent",
                self.base_url, request.model
            );
            let body = GeminiRequest {
                contents: vec![Content {
                    parts: vec![Part {
                        text: &request.user_content,
                    }],
                }],
                system_instruction: Content {
                    parts: vec![Part {
                        text: &request.system_instruction,
                    }],
                },
                generation_config: generation_config(request.response_format),
            };

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(PipelineError::ModelCallFailed(format!(
                    "gemini '{}' returned status {status}",
                    request.model
                )));
            }

            let reply: GeminiResponse = response.json().await.map_err(|e| {
                PipelineError::MalformedModelOutput(format!("gemini reply body: {e}"))
            })?;
            candidate_text(reply)
        })
    }
}

/// Build the generation config for the requested reply shape.
fn generation_config(format: ResponseFormat) -> Option<GenerationConfig> {
    match format {
        ResponseFormat::PlainText => None,
        ResponseFormat::JsonObject { required_field } => Some(GenerationConfig {
            response_mime_type: "application/json",
            response_schema: serde_json::json!({
                "type": "OBJECT",
                "properties": { (required_field): { "type": "STRING" } },
                "required": [required_field],
            }),
        }),
    }
}

/// Concatenate the text parts of the first candidate.
fn candidate_text(reply: GeminiResponse) -> PipelineResult<String> {
    let candidate = reply.candidates.into_iter().next().ok_or_else(|| {
        PipelineError::MalformedModelOutput("gemini reply carried no candidates".to_string())
    })?;

    let mut out = String::new();
    if let Some(content) = candidate.content {
        for part in content.parts {
            if let Some(text) = part.text {
                out.push_str(&text);
            }
        }
    }

    if out.is_empty() {
        return Err(PipelineError::MalformedModelOutput(
            "gemini candidate carried no text".to_string(),
        ));
    }
    Ok(out)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}
