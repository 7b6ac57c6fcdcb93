use std::sync::Arc;

use crate::agent_engine::heuristic::heuristic;
use crate::agent_engine::normalize::normalize;
use crate::agent_engine::prompt::build_prompt;
use crate::agent_engine::state::{PlanResult, PlanSource};
use crate::config::{LlmConfig, PromptConfig, SharedSettings};
use crate::errors::{AgentError, AgentResult};
use crate::llm::provider::CompletionProvider;
use crate::llm::tool_parser;
use crate::llm::tools::ToolCall;
use crate::llm::types::GenerateRequest;
use crate::perception::SnapshotNode;

/// Turns an instruction plus snapshot into a single tool call.
///
/// Model first; on any model or parse failure the heuristic rules, then the
/// echo answer.
pub struct Planner {
    provider: Arc<dyn CompletionProvider>,
    settings: SharedSettings,
    llm: LlmConfig,
    prompt: PromptConfig,
}

impl Planner {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        settings: SharedSettings,
        llm: LlmConfig,
        prompt: PromptConfig,
    ) -> Self {
        Self {
            provider,
            settings,
            llm,
            prompt,
        }
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    /// Plan one action. `Err` only for faults outside the fallback chain
    /// (e.g. the prompt cannot be rendered).
    pub async fn plan(
        &self,
        instruction: &str,
        snapshot: &[SnapshotNode],
        model_override: Option<&str>,
    ) -> AgentResult<PlanResult> {
        let settings = self.settings.read().await.clone();
        let model = model_override
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(settings.model.as_str())
            .to_string();

        let prompt = build_prompt(instruction, snapshot, &self.prompt)?;
        let request = GenerateRequest::new(model, prompt, &self.llm);

        let (result, source) = match self.query_model(&settings.api_url, &request).await {
            Ok(tool) => {
                let tool = normalize(tool, snapshot, instruction);
                (PlanResult::from_tool(tool), PlanSource::Model)
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    model = %request.model,
                    error = %e,
                    "model planning failed; falling back"
                );
                fallback(instruction, snapshot, Some(&e.to_string()))
            }
        };

        tracing::info!(
            source = source.as_str(),
            action = %result.tool.action,
            target = result.tool.target.as_deref().unwrap_or(""),
            "plan ready"
        );
        Ok(result)
    }

    async fn query_model(&self, endpoint: &str, request: &GenerateRequest) -> AgentResult<ToolCall> {
        let raw = self.provider.generate(endpoint, request).await?;
        tool_parser::extract(&raw).ok_or_else(|| {
            tracing::debug!(raw = %raw, "no tool call in model output");
            AgentError::ToolParse
        })
    }

    /// Model names from the service; failures read as an empty list.
    pub async fn available_models(&self) -> Vec<String> {
        let endpoint = self.settings.read().await.api_url.clone();
        match self.provider.list_models(&endpoint).await {
            Ok(models) => models,
            Err(e) => {
                tracing::debug!(error = %e, "model listing failed");
                Vec::new()
            }
        }
    }
}

/// Heuristic rules, else the echo answer.
pub fn fallback(
    instruction: &str,
    snapshot: &[SnapshotNode],
    detail: Option<&str>,
) -> (PlanResult, PlanSource) {
    match heuristic(instruction, snapshot) {
        Some(tool) => (PlanResult::from_tool(tool), PlanSource::Heuristic),
        None => (PlanResult::from_tool(echo_tool(instruction, detail)), PlanSource::Echo),
    }
}

pub fn echo_tool(instruction: &str, detail: Option<&str>) -> ToolCall {
    match detail.filter(|d| !d.is_empty()) {
        Some(detail) => ToolCall::answer(format!("Echo: {instruction} (AI offline: {detail})")),
        None => ToolCall::answer(format!("Echo: {instruction}")),
    }
}
