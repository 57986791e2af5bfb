use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::SummaryModel;
use crate::config::SummarizerConfig;
use crate::error::PipelineError;

/// Request body for Ollama's `/api/generate` endpoint.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Non-streaming response; only the generated text is used.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for a locally hosted Ollama server.
pub struct Ollama {
    client: Client,
    config: SummarizerConfig,
}

impl Ollama {
    pub fn new(config: SummarizerConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Summarization(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Substitute the transcript into the configured prompt template.
    pub fn render_prompt(&self, transcript: &str) -> String {
        self.config.prompt_template.replace("{transcript}", transcript)
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'))
    }

    async fn request(&self, prompt: &str) -> Result<String, PipelineError> {
        let body = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PipelineError::Timeout {
                        secs: self.config.timeout_secs,
                    }
                } else if e.is_connect() {
                    PipelineError::ServiceUnavailable {
                        endpoint: self.config.endpoint.clone(),
                    }
                } else {
                    PipelineError::Summarization(e.to_string())
                }
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(PipelineError::ModelNotFound {
                    model: self.config.model.clone(),
                });
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(PipelineError::Summarization(format!(
                    "service returned {status}: {}",
                    body.trim()
                )));
            }
            _ => {}
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Summarization(format!("unexpected response body: {e}")))?;

        Ok(parsed.response)
    }
}

#[async_trait]
impl SummaryModel for Ollama {
    async fn summarize(&self, transcript: &str) -> Result<String, PipelineError> {
        let prompt = self.render_prompt(transcript);
        info!(
            "requesting summary from {} (model {})",
            self.generate_url(),
            self.config.model
        );

        match self.request(&prompt).await {
            Err(PipelineError::ServiceUnavailable { .. }) if self.config.retry_once => {
                warn!("inference service unreachable, retrying once");
                tokio::time::sleep(Duration::from_secs(1)).await;
                self.request(&prompt).await
            }
            other => other,
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
