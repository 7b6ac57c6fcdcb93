use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{AgentError, AgentResult};

/// The four actions the automation layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolAction {
    Answer,
    Click,
    Type,
    Focus,
}

impl ToolAction {
    pub const ALL: [ToolAction; 4] = [Self::Answer, Self::Click, Self::Type, Self::Focus];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Answer => "answer",
            Self::Click => "click",
            Self::Type => "type",
            Self::Focus => "focus",
        }
    }

    /// Actions that operate on a UI element.
    pub fn targets_element(&self) -> bool {
        matches!(self, Self::Click | Self::Type | Self::Focus)
    }
}

impl fmt::Display for ToolAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolAction {
    type Err = AgentError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| AgentError::InvalidTool(format!("unknown action '{}'", s.trim())))
    }
}

/// A validated tool call. `target` serializes as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub action: ToolAction,
    pub target: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl ToolCall {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            action: ToolAction::Answer,
            target: None,
            text: text.into(),
        }
    }

    /// Target if present and not blank.
    pub fn target_str(&self) -> Option<&str> {
        self.target.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Check an untrusted JSON value against the tool schema and normalize it.
///
/// `action` must be a string naming one of the four actions (any case).
/// `target` and `text` are coerced to strings when present and non-null;
/// a missing `target` stays absent and a missing `text` becomes `""`.
pub fn validate(value: &Value) -> AgentResult<ToolCall> {
    let obj = value
        .as_object()
        .ok_or_else(|| AgentError::InvalidTool("tool call is not a JSON object".into()))?;

    let action = match obj.get("action") {
        Some(Value::String(s)) => s.parse::<ToolAction>()?,
        Some(_) => return Err(AgentError::InvalidTool("'action' is not a string".into())),
        None => return Err(AgentError::InvalidTool("missing 'action'".into())),
    };

    Ok(ToolCall {
        action,
        target: obj.get("target").and_then(coerce_string),
        text: obj.get("text").and_then(coerce_string).unwrap_or_default(),
    })
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
