//! Constraint matchers.
//!
//! Two passes over one session: [`realtime`] runs per action as it
//! arrives, [`sequence`] runs once over the completed log. Both are pure
//! and infallible: they report which constraints fired, and the session
//! applies the scoring.

pub mod realtime;
pub mod sequence;
