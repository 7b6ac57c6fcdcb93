use std::time::Duration;

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::errors::{AgentError, AgentResult};
use crate::llm::provider::CompletionProvider;
use crate::llm::types::{GenerateRequest, TagsResponse};

pub struct OllamaProvider {
    client: reqwest::Client,
    probe_timeout: Duration,
}

impl OllamaProvider {
    pub fn new(timeout: Duration, probe_timeout: Duration) -> AgentResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            probe_timeout,
        })
    }

    pub fn from_config(cfg: &LlmConfig) -> AgentResult<Self> {
        Self::new(
            Duration::from_secs(cfg.timeout_secs),
            Duration::from_secs(cfg.probe_timeout_secs),
        )
    }
}

/// `/api/tags` lives next to `/api/generate`.
pub fn tags_url(generate_url: &str) -> String {
    match generate_url.strip_suffix("/api/generate") {
        Some(base) => format!("{base}/api/tags"),
        None => format!("{}/api/tags", generate_url.trim_end_matches('/')),
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, endpoint: &str, request: &GenerateRequest) -> AgentResult<String> {
        tracing::debug!(
            endpoint = %endpoint,
            model = %request.model,
            prompt_len = request.prompt.len(),
            "sending generate request"
        );

        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| AgentError::ModelConnection(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::ModelConnection(e.to_string()))?;

        if !status.is_success() {
            return Err(AgentError::ModelConnection(format!("{status}: {body}")));
        }

        let payload: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| AgentError::ModelDecode(e.to_string()))?;

        let text = payload
            .get("response")
            .and_then(|r| r.as_str())
            .ok_or(AgentError::ModelResponseFormat)?;

        tracing::info!(model = %request.model, content_len = text.len(), "generate response received");
        Ok(text.to_string())
    }

    async fn list_models(&self, endpoint: &str) -> AgentResult<Vec<String>> {
        let url = tags_url(endpoint);
        let response = self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| AgentError::ModelConnection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AgentError::ModelConnection(format!(
                "{url} returned {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ModelDecode(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}
