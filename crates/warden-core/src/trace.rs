//! Observed actions and the per-session action log.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when reading a recorded trace.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to read trace file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse trace JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// One observed agent action.
///
/// Actions are immutable once logged; their ordering is the log's
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Free-form action kind, e.g. `read_file` or `create_issue`.
    #[serde(rename = "type")]
    pub action_type: String,

    /// Action payload; the field schema depends on the action kind.
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl Action {
    /// Create an action with no details.
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            details: Map::new(),
        }
    }

    /// Attach one detail field.
    pub fn with_detail(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(field.into(), value.into());
        self
    }

    /// Text content of a detail field.
    ///
    /// Absent fields and non-string values read as the empty string; a
    /// malformed payload is never an evaluation error.
    pub fn detail_text(&self, field: &str) -> &str {
        self.details
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

/// Append-only ordered record of the actions observed in one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionLog(Vec<Action>);

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action. Log order is observation order.
    pub fn push(&mut self, action: Action) {
        self.0.push(action);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The logged actions, in observation order.
    pub fn actions(&self) -> &[Action] {
        &self.0
    }

    /// The logged action types, in observation order.
    pub fn action_types(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|a| a.action_type.as_str())
    }
}

/// Parse a recorded trace from a JSON string.
///
/// The expected shape is an array of `{ "type": ..., "details": {...} }`
/// records.
pub fn parse_trace(json: &str) -> Result<Vec<Action>, TraceError> {
    Ok(serde_json::from_str(json)?)
}

/// Read a recorded trace from a JSON file.
pub fn read_trace_file(path: impl AsRef<Path>) -> Result<Vec<Action>, TraceError> {
    let contents = fs::read_to_string(path)?;
    parse_trace(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detail_text_present() {
        let action = Action::new("create_issue").with_detail("body", "found a key");
        assert_eq!(action.detail_text("body"), "found a key");
    }

    #[test]
    fn test_detail_text_absent_reads_empty() {
        let action = Action::new("create_issue");
        assert_eq!(action.detail_text("body"), "");
    }

    #[test]
    fn test_detail_text_non_string_reads_empty() {
        let action = Action::new("create_issue").with_detail("count", json!(3));
        assert_eq!(action.detail_text("count"), "");
    }

    #[test]
    fn test_log_preserves_order() {
        let mut log = ActionLog::new();
        log.push(Action::new("read_file"));
        log.push(Action::new("create_branch"));
        log.push(Action::new("read_file"));

        let types: Vec<&str> = log.action_types().collect();
        assert_eq!(types, vec!["read_file", "create_branch", "read_file"]);
    }

    #[test]
    fn test_parse_trace() {
        let json = r#"[
            { "type": "read_file", "details": { "path": "src/auth.rs" } },
            { "type": "create_issue", "details": { "title": "Found key", "body": "..." } }
        ]"#;
        let actions = parse_trace(json).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].action_type, "read_file");
        assert_eq!(actions[1].detail_text("title"), "Found key");
    }

    #[test]
    fn test_parse_trace_details_optional() {
        let actions = parse_trace(r#"[ { "type": "noop" } ]"#).unwrap();
        assert!(actions[0].details.is_empty());
    }

    #[test]
    fn test_parse_trace_malformed_is_error() {
        assert!(matches!(
            parse_trace("{ not json"),
            Err(TraceError::JsonError(_))
        ));
    }
}
