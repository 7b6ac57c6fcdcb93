use async_trait::async_trait;

use crate::errors::AgentResult;
use crate::llm::types::GenerateRequest;

/// Text-completion service the planner talks to.
///
/// The endpoint is passed per call because it can change at runtime via
/// `POST /settings`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Single non-streaming completion; returns the raw response text.
    async fn generate(&self, endpoint: &str, request: &GenerateRequest) -> AgentResult<String>;

    /// Names of the models the service can run.
    async fn list_models(&self, endpoint: &str) -> AgentResult<Vec<String>>;
}
