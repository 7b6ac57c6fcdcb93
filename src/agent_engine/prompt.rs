use crate::config::PromptConfig;
use crate::errors::AgentResult;
use crate::perception::SnapshotNode;

const TRUNCATION_MARKER: &str = "\n... (truncated)";

const SCHEMA: &str = "\
Respond with a single JSON object matching this schema:
{
    \"action\": \"answer|click|type|focus\",
    \"target\": \"string (element title or identifier)\",
    \"text\": \"string (optional, for type and answer actions)\"
}

Available actions:
- answer: Provide a text response without UI interaction
- click: Click on an element (use target to identify element)
- type: Type text into an element (use target and text)
- focus: Focus on an element (use target)";

const GUIDANCE: &str = "\
Rules:
- Prefer the element's visible title as the target.
- Use answer for questions about the screen or when no element fits.
- If a request looks destructive or unsafe (deleting data, sending payments, \
closing unsaved work), do not act: return answer and ask the user to confirm.
- Return only the JSON object, no commentary.";

/// Render the snapshot for the prompt: at most `max_snapshot_nodes` records,
/// pretty-printed, cut at `max_snapshot_chars` characters.
pub fn render_snapshot(snapshot: &[SnapshotNode], cfg: &PromptConfig) -> AgentResult<String> {
    let capped = &snapshot[..snapshot.len().min(cfg.max_snapshot_nodes)];
    let text = serde_json::to_string_pretty(capped)?;

    match text.char_indices().nth(cfg.max_snapshot_chars) {
        Some((cut, _)) => Ok(format!("{}{TRUNCATION_MARKER}", &text[..cut])),
        None => Ok(text),
    }
}

pub fn build_prompt(
    instruction: &str,
    snapshot: &[SnapshotNode],
    cfg: &PromptConfig,
) -> AgentResult<String> {
    let snapshot_text = render_snapshot(snapshot, cfg)?;
    Ok(format!(
        "You are Cluely-Lite, a local AI assistant for desktop automation.\n\n\
         Instruction: {instruction}\n\n\
         Current screen elements:\n{snapshot_text}\n\n\
         {SCHEMA}\n\n\
         {GUIDANCE}\n\n\
         Analyze the instruction and current screen state, then return the \
         appropriate action as JSON. Be precise with element targeting."
    ))
}
