//! Rule-based planning used when the model is unavailable or unusable.
//!
//! Rules are tried in order and the first match wins:
//! 1. `click …` / `press …`      → click
//! 2. `focus …`                  → focus
//! 3. `type …` / `enter …` / `input …` → type
//! 4. help or "what's on my screen" questions → static answer

use std::sync::OnceLock;

use regex::Regex;

use crate::llm::tools::{ToolAction, ToolCall};
use crate::perception::types::{titles, SnapshotNode};

const CLICK_VERBS: &[&str] = &["click ", "press "];
const FOCUS_VERBS: &[&str] = &["focus "];
const TYPE_VERBS: &[&str] = &["type ", "enter ", "input "];

const HELP_PHRASES: &[&str] = &["what's on my screen", "what is on my screen", "help", "how do i"];

pub const HELP_MESSAGE: &str = "I can click, focus, or type into elements on your screen. \
Try \"Click Save\", \"Focus the search field\", or \"Type 'hello' into Search\". \
The local model is not responding right now, so only these simple commands are available.";

pub fn heuristic(instruction: &str, snapshot: &[SnapshotNode]) -> Option<ToolCall> {
    let instruction = instruction.trim();

    // A verb with nothing after it falls through to the later rules.
    if let Some(tool) = strip_verb(instruction, CLICK_VERBS)
        .and_then(|rest| element_action(ToolAction::Click, rest, snapshot))
    {
        return Some(tool);
    }
    if let Some(tool) = strip_verb(instruction, FOCUS_VERBS)
        .and_then(|rest| element_action(ToolAction::Focus, rest, snapshot))
    {
        return Some(tool);
    }
    if let Some(rest) = strip_verb(instruction, TYPE_VERBS) {
        return Some(type_action(rest, snapshot));
    }

    let lower = instruction.to_lowercase();
    if HELP_PHRASES.iter().any(|p| lower.contains(p)) {
        return Some(ToolCall::answer(HELP_MESSAGE));
    }

    None
}

/// Remainder after a leading verb, matched ASCII case-insensitively.
fn strip_verb<'a>(instruction: &'a str, verbs: &[&str]) -> Option<&'a str> {
    verbs.iter().find_map(|verb| {
        let head = instruction.get(..verb.len())?;
        head.eq_ignore_ascii_case(verb).then(|| &instruction[verb.len()..])
    })
}

fn strip_quotes(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

fn element_action(action: ToolAction, rest: &str, snapshot: &[SnapshotNode]) -> Option<ToolCall> {
    let raw = strip_quotes(rest);
    if raw.is_empty() {
        return None;
    }
    Some(ToolCall {
        action,
        target: Some(match_title(raw, snapshot)),
        text: String::new(),
    })
}

fn type_action(rest: &str, snapshot: &[SnapshotNode]) -> ToolCall {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    static TARGET_CLAUSE: OnceLock<Regex> = OnceLock::new();
    let quoted = QUOTED.get_or_init(|| Regex::new(r#""([^"]*)"|'([^']*)'"#).expect("static regex"));
    let clause = TARGET_CLAUSE
        .get_or_init(|| Regex::new(r"(?i)\b(?:into|in)\s+(.+)$").expect("static regex"));

    // The target clause is searched after the quoted text so that an `in`
    // inside the quotes is not mistaken for it.
    let (text, tail) = match quoted.captures(rest) {
        Some(caps) => {
            let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            let end = caps.get(0).map_or(rest.len(), |m| m.end());
            (inner.to_string(), &rest[end..])
        }
        None => (strip_quotes(rest).to_string(), rest),
    };

    // No `into`/`in` clause leaves the target absent (`null`), not "".

    let target = clause
        .captures(tail)
        .and_then(|c| c.get(1))
        .map(|m| strip_quotes(m.as_str()))
        .filter(|t| !t.is_empty())
        .map(|t| match_title(t, snapshot));

    ToolCall {
        action: ToolAction::Type,
        target,
        text,
    }
}

/// First snapshot title that contains, or is contained in, `raw`
/// (case-insensitive). Falls back to `raw` itself.
pub fn match_title(raw: &str, snapshot: &[SnapshotNode]) -> String {
    let needle = raw.to_lowercase();
    titles(snapshot)
        .find(|title| {
            let hay = title.to_lowercase();
            hay.contains(&needle) || needle.contains(&hay)
        })
        .unwrap_or(raw)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snap(titles: &[&str]) -> Vec<SnapshotNode> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| json!({"id": i, "title": t}).into())
            .collect()
    }

    #[test]
    fn click_without_snapshot() {
        let tool = heuristic("Click Save", &[]).unwrap();
        assert_eq!(tool.action, ToolAction::Click);
        assert_eq!(tool.target.as_deref(), Some("Save"));
        assert_eq!(tool.text, "");
    }

    #[test]
    fn press_strips_quotes_and_matches_title() {
        let tool = heuristic("press 'save'", &snap(&["Cancel", "Save Document"])).unwrap();
        assert_eq!(tool.action, ToolAction::Click);
        assert_eq!(tool.target.as_deref(), Some("Save Document"));
    }

    #[test]
    fn title_contained_in_target_matches() {
        let tool = heuristic("click the OK button", &snap(&["OK"])).unwrap();
        assert_eq!(tool.target.as_deref(), Some("OK"));
    }

    #[test]
    fn focus_rule() {
        let tool = heuristic("FOCUS search", &snap(&["Search"])).unwrap();
        assert_eq!(tool.action, ToolAction::Focus);
        assert_eq!(tool.target.as_deref(), Some("Search"));
    }

    #[test]
    fn type_with_quotes_and_target() {
        let tool = heuristic(r#"Type "Hello" into Search"#, &[]).unwrap();
        assert_eq!(tool.action, ToolAction::Type);
        assert_eq!(tool.text, "Hello");
        assert!(tool.target.unwrap().to_lowercase().contains("search"));
    }

    #[test]
    fn type_target_resolves_to_snapshot_title() {
        let tool = heuristic("enter 'cats' in search", &snap(&["Search field"])).unwrap();
        assert_eq!(tool.text, "cats");
        assert_eq!(tool.target.as_deref(), Some("Search field"));
    }

    #[test]
    fn quoted_text_containing_in_keeps_real_target() {
        let tool = heuristic(r#"type "sign in now" into Notes"#, &[]).unwrap();
        assert_eq!(tool.text, "sign in now");
        assert_eq!(tool.target.as_deref(), Some("Notes"));
    }

    #[test]
    fn unquoted_type_uses_remainder() {
        let tool = heuristic("input hello world", &[]).unwrap();
        assert_eq!(tool.text, "hello world");
        assert_eq!(tool.target, None);

        let tool = heuristic("type hello into Search", &[]).unwrap();
        assert_eq!(tool.text, "hello into Search");
        assert_eq!(tool.target.as_deref(), Some("Search"));

        let tool = heuristic("enter cats in search", &snap(&["Search field"])).unwrap();
        assert_eq!(tool.text, "cats in search");
        assert_eq!(tool.target.as_deref(), Some("Search field"));
    }

    #[test]
    fn type_without_clause_has_no_target_even_with_snapshot() {
        let tool = heuristic("type 'hello'", &snap(&["Search", "Notes"])).unwrap();
        assert_eq!(tool.text, "hello");
        assert_eq!(tool.target, None);
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["target"], serde_json::Value::Null);
    }

    #[test]
    fn empty_element_target_falls_through_to_later_rules() {
        assert_eq!(heuristic("focus ''", &[]), None);
        assert_eq!(heuristic("press \"\"", &snap(&["Save"])), None);
    }

    #[test]
    fn in_inside_a_word_is_not_a_target_clause() {
        let tool = heuristic("type login", &[]).unwrap();
        assert_eq!(tool.text, "login");
        assert_eq!(tool.target, None);
    }

    #[test]
    fn help_phrases_answer() {
        for q in ["What's on my screen?", "help me", "How do I save?", "what is on my screen"] {
            let tool = heuristic(q, &[]).unwrap();
            assert_eq!(tool.action, ToolAction::Answer);
            assert_eq!(tool.target, None);
            assert_eq!(tool.text, HELP_MESSAGE);
        }
    }

    #[test]
    fn verb_rules_beat_help_phrases() {
        let tool = heuristic("click Help", &[]).unwrap();
        assert_eq!(tool.action, ToolAction::Click);
    }

    #[test]
    fn no_rule_matches() {
        assert_eq!(heuristic("open settings", &[]), None);
        assert_eq!(heuristic("clicking around", &[]), None);
        assert_eq!(heuristic("click ''", &[]), None);
        assert_eq!(heuristic("", &[]), None);
    }

    #[test]
    fn match_title_falls_back_to_raw() {
        assert_eq!(match_title("Submit", &snap(&["Cancel"])), "Submit");
        assert_eq!(match_title("Submit", &[]), "Submit");
    }
}
