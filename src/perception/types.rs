use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{AgentError, AgentResult};

/// One UI element record supplied by the caller.
///
/// The record is opaque apart from `id` and `title`; every other attribute
/// (role, frame, enabled, ...) is carried through to the prompt untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotNode(pub Value);

impl SnapshotNode {
    /// Identifier in its string form: strings verbatim, other scalars via
    /// their JSON rendering (`42`, `true`). `None` when absent or null.
    pub fn id_string(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    /// Like [`Self::title`], but fails on records that are not JSON objects.
    pub fn try_title(&self) -> AgentResult<Option<&str>> {
        self.as_object()?;
        Ok(self.title())
    }

    pub fn try_id_string(&self) -> AgentResult<Option<String>> {
        self.as_object()?;
        Ok(self.id_string())
    }

    fn as_object(&self) -> AgentResult<&serde_json::Map<String, Value>> {
        self.0
            .as_object()
            .ok_or_else(|| AgentError::Snapshot(format!("element is not an object: {}", self.0)))
    }
}

impl From<Value> for SnapshotNode {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Non-empty titles in snapshot order. Records without a usable title are skipped.
pub fn titles(snapshot: &[SnapshotNode]) -> impl Iterator<Item = &str> {
    snapshot
        .iter()
        .filter_map(SnapshotNode::title)
        .filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_string_renders_scalars() {
        assert_eq!(SnapshotNode(json!({"id": 42})).id_string().as_deref(), Some("42"));
        assert_eq!(SnapshotNode(json!({"id": "btn-1"})).id_string().as_deref(), Some("btn-1"));
        assert_eq!(SnapshotNode(json!({"id": null})).id_string(), None);
        assert_eq!(SnapshotNode(json!({"title": "x"})).id_string(), None);
    }

    #[test]
    fn non_object_records_fail_strict_access() {
        let node = SnapshotNode(json!("Save"));
        assert_eq!(node.title(), None);
        assert!(node.try_title().is_err());
        assert!(node.try_id_string().is_err());
    }

    #[test]
    fn titles_skip_blank_and_missing() {
        let snapshot: Vec<SnapshotNode> = vec![
            json!({"id": 1, "title": "Save"}).into(),
            json!({"id": 2, "title": "  "}).into(),
            json!({"id": 3, "role": "AXGroup"}).into(),
            json!(7).into(),
            json!({"id": 4, "title": "Cancel"}).into(),
        ];
        assert_eq!(titles(&snapshot).collect::<Vec<_>>(), vec!["Save", "Cancel"]);
    }

    #[test]
    fn extra_attributes_round_trip() {
        let raw = json!({"id": "test1", "role": "AXButton", "title": "Save", "frame": {"x": 1}});
        let node: SnapshotNode = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&node).unwrap(), raw);
    }
}
