//! Rewrites model-chosen targets into visible snapshot titles.
//!
//! Models often answer with an element's internal identifier, while the
//! automation layer looks elements up by title. Normalization is best-effort:
//! any fault leaves the tool exactly as the model returned it.

use crate::errors::AgentResult;
use crate::llm::tools::ToolCall;
use crate::perception::SnapshotNode;

const MIN_TOKEN_CHARS: usize = 3;

pub fn normalize(tool: ToolCall, snapshot: &[SnapshotNode], instruction: &str) -> ToolCall {
    match try_normalize(&tool, snapshot, instruction) {
        Ok(normalized) => normalized,
        Err(e) => {
            tracing::debug!(error = %e, "target normalization skipped");
            tool
        }
    }
}

pub fn try_normalize(
    tool: &ToolCall,
    snapshot: &[SnapshotNode],
    instruction: &str,
) -> AgentResult<ToolCall> {
    let mut out = tool.clone();
    if !tool.action.targets_element() {
        return Ok(out);
    }
    let Some(target) = tool.target_str() else {
        return Ok(out);
    };

    let mut target = resolve_identifier(target, snapshot)?.unwrap_or_else(|| target.to_string());

    let mut is_title = false;
    for node in snapshot {
        if node.try_title()? == Some(target.as_str()) {
            is_title = true;
            break;
        }
    }
    if !is_title {
        if let Some(best) = best_title_for(instruction, snapshot)? {
            tracing::debug!(from = %target, to = %best, "target inferred from instruction");
            target = best;
        }
    }

    out.target = Some(target);
    Ok(out)
}

/// Title of the first node whose identifier equals `target`, when that title
/// is non-blank. Scanning stops at the first identifier match either way.
fn resolve_identifier(target: &str, snapshot: &[SnapshotNode]) -> AgentResult<Option<String>> {
    for node in snapshot {
        if node.try_id_string()?.as_deref() == Some(target) {
            return Ok(node
                .title()
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string));
        }
    }
    Ok(None)
}

/// Alphabetic words of at least three characters, lower-cased.
fn instruction_tokens(instruction: &str) -> Vec<String> {
    instruction
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS && w.chars().all(char::is_alphabetic))
        .map(str::to_lowercase)
        .collect()
}

/// Title sharing the most instruction tokens; ties keep the earliest.
fn best_title_for(instruction: &str, snapshot: &[SnapshotNode]) -> AgentResult<Option<String>> {
    let tokens = instruction_tokens(instruction);
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut best: Option<(usize, &str)> = None;
    for node in snapshot {
        let Some(title) = node.try_title()? else {
            continue;
        };
        let hay = title.to_lowercase();
        let score = tokens.iter().filter(|t| hay.contains(t.as_str())).count();
        if score > best.map_or(0, |(s, _)| s) {
            best = Some((score, title));
        }
    }
    Ok(best.map(|(_, title)| title.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::tools::ToolAction;
    use serde_json::json;

    fn click(target: &str) -> ToolCall {
        ToolCall {
            action: ToolAction::Click,
            target: Some(target.into()),
            text: String::new(),
        }
    }

    fn save_cancel() -> Vec<SnapshotNode> {
        vec![
            json!({"id": 42, "title": "Save", "role": "AXButton"}).into(),
            json!({"id": "cancel-btn", "title": "Cancel"}).into(),
        ]
    }

    #[test]
    fn numeric_identifier_becomes_title() {
        let out = normalize(click("42"), &save_cancel(), "do it");
        assert_eq!(out.target.as_deref(), Some("Save"));
    }

    #[test]
    fn string_identifier_becomes_title() {
        let out = normalize(click("cancel-btn"), &save_cancel(), "");
        assert_eq!(out.target.as_deref(), Some("Cancel"));
    }

    #[test]
    fn fuzzy_match_from_instruction() {
        let out = normalize(click("xyz"), &save_cancel(), "click the save button");
        assert_eq!(out.target.as_deref(), Some("Save"));
    }

    #[test]
    fn no_overlap_keeps_target() {
        let out = normalize(click("xyz"), &save_cancel(), "do it now");
        assert_eq!(out.target.as_deref(), Some("xyz"));
    }

    #[test]
    fn higher_score_wins_and_ties_keep_first() {
        let snapshot: Vec<SnapshotNode> = vec![
            json!({"id": 1, "title": "Save"}).into(),
            json!({"id": 2, "title": "Save Draft"}).into(),
            json!({"id": 3, "title": "Draft Save"}).into(),
        ];
        let out = normalize(click("zzz"), &snapshot, "save the draft");
        assert_eq!(out.target.as_deref(), Some("Save Draft"));
    }

    #[test]
    fn short_and_non_alphabetic_tokens_are_ignored() {
        let snapshot: Vec<SnapshotNode> = vec![json!({"id": 1, "title": "Go to page 2"}).into()];
        let out = normalize(click("zzz"), &snapshot, "go to 2");
        assert_eq!(out.target.as_deref(), Some("zzz"));
    }

    #[test]
    fn already_normalized_is_a_no_op() {
        let snapshot = save_cancel();
        let once = normalize(click("Save"), &snapshot, "press cancel please");
        assert_eq!(once.target.as_deref(), Some("Save"));
        let twice = normalize(once.clone(), &snapshot, "press cancel please");
        assert_eq!(once, twice);
    }

    #[test]
    fn answers_and_empty_targets_are_untouched() {
        let answer = ToolCall::answer("42");
        assert_eq!(normalize(answer.clone(), &save_cancel(), "save"), answer);

        let empty = ToolCall {
            action: ToolAction::Focus,
            target: Some(String::new()),
            text: String::new(),
        };
        assert_eq!(normalize(empty.clone(), &save_cancel(), "save"), empty);
    }

    #[test]
    fn identifier_match_with_blank_title_stops_scan() {
        let snapshot: Vec<SnapshotNode> = vec![
            json!({"id": 7, "title": " "}).into(),
            json!({"id": 7, "title": "Later"}).into(),
        ];
        let out = normalize(click("7"), &snapshot, "");
        assert_eq!(out.target.as_deref(), Some("7"));
    }

    #[test]
    fn malformed_snapshot_returns_tool_unchanged() {
        let snapshot: Vec<SnapshotNode> =
            vec![json!({"id": 1, "title": "Save"}).into(), json!("oops").into()];
        assert!(try_normalize(&click("xyz"), &snapshot, "click save").is_err());
        let out = normalize(click("xyz"), &snapshot, "click save");
        assert_eq!(out.target.as_deref(), Some("xyz"));
    }
}
