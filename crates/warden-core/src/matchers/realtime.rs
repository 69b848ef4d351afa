//! Realtime constraint checks, run synchronously for each observed action.

use crate::rules::{ConstraintKind, RuleSet};
use crate::trace::Action;

/// Indices of the constraints this action fires, in rule-set order.
///
/// Only `negative_regex` constraints participate here; ordering
/// constraints wait for the end of the session, and unknown kinds never
/// fire.
pub fn check(rules: &RuleSet, action: &Action) -> Vec<usize> {
    rules
        .constraints
        .iter()
        .enumerate()
        .filter(|(_, constraint)| match &constraint.kind {
            ConstraintKind::NegativeRegex { location, pattern } => {
                location_matches(location, &action.action_type)
                    && pattern.is_match(action.detail_text(location_field(location)))
            }
            ConstraintKind::RequiredSequence { .. } | ConstraintKind::Unknown => false,
        })
        .map(|(index, _)| index)
        .collect()
}

/// Compatibility test between a constraint location and an action type.
///
/// A location is compatible when it contains the action type as a
/// substring, e.g. `tool_calls.create_issue.body` is compatible with
/// `create_issue`. Loose on purpose; this is not structured path
/// resolution.
fn location_matches(location: &str, action_type: &str) -> bool {
    location.contains(action_type)
}

/// The inspected detail field is the final dotted path segment.
fn location_field(location: &str) -> &str {
    location.rsplit('.').next().unwrap_or(location)
}
