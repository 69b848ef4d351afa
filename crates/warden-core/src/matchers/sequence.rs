//! Ordering constraint checks, run once over the completed action log.

use crate::rules::{ConstraintKind, RuleSet};
use crate::trace::ActionLog;

/// Indices of the ordering constraints the completed log violates, in
/// rule-set order. Each violated constraint appears at most once.
pub fn check(rules: &RuleSet, log: &ActionLog) -> Vec<usize> {
    let types: Vec<&str> = log.action_types().collect();

    rules
        .constraints
        .iter()
        .enumerate()
        .filter(|(_, constraint)| match &constraint.kind {
            ConstraintKind::RequiredSequence { steps } => !subsequence_present(steps, &types),
            ConstraintKind::NegativeRegex { .. } | ConstraintKind::Unknown => false,
        })
        .map(|(index, _)| index)
        .collect()
}

/// Linear cursor scan: each step consumes the first matching action at or
/// after the cursor, and matches are never reused. An empty step list is
/// trivially satisfied.
fn subsequence_present(steps: &[String], types: &[&str]) -> bool {
    let mut cursor = 0;
    for step in steps {
        match types[cursor..].iter().position(|t| *t == step.as_str()) {
            Some(offset) => cursor += offset + 1,
            None => return false,
        }
    }
    true
}
