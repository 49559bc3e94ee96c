//! Action labels for routing between stages.
//!
//! Every stage run returns an [`Action`], and successor tables are keyed by
//! it. Five labels are reserved as shared conventions; all other labels are
//! application-defined.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The label a stage returns to select its successor.
///
/// Actions are opaque to the engine: equality is the only operation performed
/// on them. The reserved constants are conventions between processors and the
/// applications wiring them; the engine attaches no semantics beyond routing.
///
/// # Example
///
/// ```
/// use cogflow::engine::Action;
///
/// let escalate = Action::new("escalate");
/// assert_ne!(escalate, Action::CONTINUE);
/// assert_eq!(Action::from("continue"), Action::CONTINUE);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action(Cow<'static, str>);

impl Action {
    /// More work to do; follow the continuation edge.
    pub const CONTINUE: Action = Action(Cow::Borrowed("continue"));

    /// This traversal's job is done.
    pub const SUCCESS: Action = Action(Cow::Borrowed("success"));

    /// Unrecoverable; end of the line unless the caller wired a handler.
    pub const FAILURE: Action = Action(Cow::Borrowed("failure"));

    /// Re-enter the stage, or a retry-wired successor.
    pub const RETRY: Action = Action(Cow::Borrowed("retry"));

    /// No specific outcome; use the default wiring.
    pub const DEFAULT: Action = Action(Cow::Borrowed("default"));

    /// Create an application-defined action label.
    pub fn new(label: impl Into<String>) -> Self {
        Action(Cow::Owned(label.into()))
    }

    /// The label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Action {
    fn from(label: &str) -> Self {
        Action::new(label)
    }
}

impl From<String> for Action {
    fn from(label: String) -> Self {
        Action(Cow::Owned(label))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
