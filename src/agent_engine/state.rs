use serde::{Deserialize, Serialize};

use crate::llm::tools::{ToolAction, ToolCall};

const EMPTY_ANSWER: &str = "Action planned";

/// Response envelope for one planning request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResult {
    pub response: String,
    pub tool: ToolCall,
}

impl PlanResult {
    /// Wrap a tool with its human-readable summary.
    pub fn from_tool(tool: ToolCall) -> Self {
        Self {
            response: summarize(&tool),
            tool,
        }
    }
}

/// Answers speak for themselves; UI actions read as `Planned: click Save`.
pub fn summarize(tool: &ToolCall) -> String {
    match tool.action {
        ToolAction::Answer if tool.text.is_empty() => EMPTY_ANSWER.to_string(),
        ToolAction::Answer => tool.text.clone(),
        action => match tool.target_str() {
            Some(target) => format!("Planned: {action} {target}"),
            None => format!("Planned: {action}"),
        },
    }
}

/// Where a plan came from. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    Model,
    Heuristic,
    Echo,
}

impl PlanSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Heuristic => "heuristic",
            Self::Echo => "echo",
        }
    }
}
