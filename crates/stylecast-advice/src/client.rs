//! Gemini `generateContent` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use stylecast_core::AdviceConfig;

use crate::error::AdviceError;
use crate::prompt::PromptContext;

/// Produces free-form outfit advice for a temperature.
#[async_trait]
pub trait AdviceClient: Send + Sync {
    async fn generate_advice(&self, context: &PromptContext) -> Result<String, AdviceError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("configured", &self.api_key.is_some())
            .finish()
    }
}

impl GeminiClient {
    /// Build a client. A missing key is not an error here; every generation
    /// call then fails with [`AdviceError::NotConfigured`] without touching
    /// the network.
    pub fn new(config: &AdviceConfig) -> Result<Self, AdviceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        let api_key = match config.require_api_key() {
            Ok(key) => Some(key.to_string()),
            Err(e) => {
                tracing::warn!("{}; advice will use the fallback message", e);
                None
            }
        };

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send a single-turn prompt and return the model's text.
    #[instrument(skip(self, prompt), fields(model = %self.model), level = "info")]
    pub async fn generate_text(&self, prompt: &str) -> Result<String, AdviceError> {
        let api_key = self.api_key.as_deref().ok_or(AdviceError::NotConfigured)?;

        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Advice generation failed with status {}", status);
            return Err(AdviceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AdviceError::Malformed(format!("JSON parse error: {}", e)))?;

        parsed.into_text().ok_or(AdviceError::EmptyResponse)
    }
}

#[async_trait]
impl AdviceClient for GeminiClient {
    async fn generate_advice(&self, context: &PromptContext) -> Result<String, AdviceError> {
        self.generate_text(&context.render()).await
    }
}
