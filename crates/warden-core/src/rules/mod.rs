//! Rule model: parsing, validation, and the constraint types.

mod parser;
pub mod schema;

pub use parser::{Constraint, ConstraintKind, RuleSet, RulesError, Scoring};
