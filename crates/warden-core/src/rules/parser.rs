//! Rule document parsing from YAML/JSON.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading a rule document.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Failed to read rules file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Rules validation failed: {0}")]
    ValidationError(String),
}

/// One declarative constraint evaluated against the action stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    /// Unique identifier, cited in violation records.
    pub id: String,

    /// Score deduction applied each time this constraint fires.
    #[serde(default)]
    pub penalty: u32,

    /// Human-readable explanation attached to violations.
    #[serde(default = "default_message")]
    pub message: String,

    /// Kind-specific matching data, discriminated by the `type` field.
    #[serde(flatten)]
    pub kind: ConstraintKind,
}

fn default_message() -> String {
    "Violation detected".to_string()
}

/// The closed set of constraint kinds.
///
/// Unrecognized `type` tags land in `Unknown`: they parse, survive in the
/// rule set, and never fire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Fires when `pattern` finds a match in the inspected detail field
    /// of a compatible action.
    NegativeRegex {
        /// Dotted path naming the action type and detail field to inspect
        /// (e.g. `tool_calls.create_issue.body`).
        location: String,

        /// Search pattern, compiled at load time.
        #[serde(with = "serde_pattern")]
        pattern: Regex,
    },

    /// Fires when `steps` cannot be found as an in-order subsequence of
    /// the logged action types.
    RequiredSequence {
        /// Action-type names in the relative order they must appear.
        steps: Vec<String>,
    },

    /// Any unrecognized constraint type.
    #[serde(other)]
    Unknown,
}

/// Serde adapter storing patterns as compiled regexes.
///
/// Compiling at load time keeps the matchers infallible: a bad pattern
/// fails the session before any action is processed.
mod serde_pattern {
    use regex::Regex;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(pattern: &Regex, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(pattern.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Regex, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Regex::new(&raw).map_err(|e| D::Error::custom(format!("invalid pattern {raw:?}: {e}")))
    }
}

/// Scoring configuration for a rule document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Scoring {
    /// Minimum final score for a PASSED verdict.
    #[serde(default)]
    pub pass_threshold: Option<u32>,
}

/// A complete rule document for one test scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    /// Stable scenario identifier echoed into the report.
    pub test_id: String,

    /// What the scenario verifies.
    #[serde(default)]
    pub objective: String,

    /// Scoring configuration. A missing threshold parses fine and only
    /// fails once a report is requested.
    #[serde(default)]
    pub scoring: Option<Scoring>,

    /// Constraints in evaluation order.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl RuleSet {
    /// Parse a rule document from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, RulesError> {
        let rules: RuleSet = serde_yaml::from_str(yaml)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Parse a rule document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: RuleSet = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Parse a rule document from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a rule document from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// The pass threshold, if the document carries one.
    pub fn pass_threshold(&self) -> Option<u32> {
        self.scoring.as_ref().and_then(|s| s.pass_threshold)
    }

    /// Structural validation: identifiers must be present and unique.
    fn validate(&self) -> Result<(), RulesError> {
        if self.test_id.is_empty() {
            return Err(RulesError::ValidationError(
                "test_id must not be empty".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for constraint in &self.constraints {
            if constraint.id.is_empty() {
                return Err(RulesError::ValidationError(
                    "constraint id must not be empty".to_string(),
                ));
            }
            if !seen.insert(&constraint.id) {
                return Err(RulesError::ValidationError(format!(
                    "Duplicate constraint ID: {}",
                    constraint.id
                )));
            }
        }

        Ok(())
    }
}
