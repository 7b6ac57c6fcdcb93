//! Recovers a tool call from free-form model output.
//!
//! Models wrap JSON in prose, code fences, or emit Python-style dicts. Each
//! strategy below proposes candidate strings; every candidate is parsed and
//! validated, and the first valid tool call wins. The order matters: later
//! strategies are more permissive and would happily accept garbage that an
//! earlier one would have passed over for the real object.

use std::sync::OnceLock;

use regex::Regex;

use crate::llm::tools::{validate, ToolCall};

type Strategy = fn(&str) -> Vec<String>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("verbatim", verbatim),
    ("outer_braces", outer_braces),
    ("single_quotes", single_quotes),
    ("flat_objects", flat_objects),
];

/// Try every strategy in order; `None` when no candidate validates.
pub fn extract(raw: &str) -> Option<ToolCall> {
    for (name, strategy) in STRATEGIES {
        for candidate in strategy(raw) {
            if let Some(tool) = try_candidate(&candidate) {
                tracing::debug!(strategy = name, action = %tool.action, "tool call extracted");
                return Some(tool);
            }
        }
    }
    None
}

fn try_candidate(candidate: &str) -> Option<ToolCall> {
    let value: serde_json::Value = serde_json::from_str(candidate).ok()?;
    match validate(&value) {
        Ok(tool) => Some(tool),
        Err(e) => {
            tracing::trace!(error = %e, "candidate rejected");
            None
        }
    }
}

fn verbatim(raw: &str) -> Vec<String> {
    vec![raw.trim().to_string()]
}

/// Everything between the first `{` and the last `}`.
fn outer_braces(raw: &str) -> Vec<String> {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => vec![raw[start..=end].to_string()],
        _ => Vec::new(),
    }
}

fn single_quotes(raw: &str) -> Vec<String> {
    vec![raw.replace('\'', "\"")]
}

/// Every `{...}` that contains no nested braces, left to right.
fn flat_objects(raw: &str) -> Vec<String> {
    static FLAT_OBJECT: OnceLock<Regex> = OnceLock::new();
    let re = FLAT_OBJECT.get_or_init(|| Regex::new(r"\{[^{}]*\}").expect("static regex"));
    re.find_iter(raw).map(|m| m.as_str().to_string()).collect()
}
