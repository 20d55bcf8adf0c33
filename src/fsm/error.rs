//! Error types for table construction and parsing
//!
//!     Parsing has exactly three ways to fail, and none of them is recovered inside the
//!     engine:
//!
//!         - Unmatched line: no transition of the current state matches the line. This is
//!           the error operators see in logs, so its message always carries `line N` and
//!           the raw line text verbatim.
//!         - Stack discipline: a `pop` with nothing on the context stack, or (when the
//!           caller asks for it) a parse that ends with states still pushed. These point at
//!           a broken table, not at bad input.
//!         - Action errors: whatever a consumer's action returns. The engine wraps it
//!           transparently so its message and source chain are untouched, and callers can
//!           downcast back to their own type.
//!
//!     Input errors (I/O, undecodable bytes) are kept apart from all three.

use super::state::StateId;
use std::error::Error as StdError;
use std::io;
use thiserror::Error;

/// Boxed error raised by a consumer action.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Coarse classification of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No transition matched the current line.
    UnmatchedLine,
    /// Push/pop misuse by the transition table or its actions.
    StackDiscipline,
    /// Raised by a consumer action, or an action returned a state the table doesn't own.
    Action,
    /// Reading or decoding the input failed.
    Input,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {lineno}: no transition from state `{state}` matches: {line}")]
    UnmatchedLine {
        lineno: usize,
        state: String,
        line: String,
    },

    #[error("line {lineno}: pop on empty context stack: {line}")]
    EmptyStack { lineno: usize, line: String },

    #[error("input ended with {depth} state(s) on the context stack: {}", .states.join(", "))]
    UnbalancedStack { depth: usize, states: Vec<String> },

    #[error("line {lineno}: action chose state {state}, which is not part of this table")]
    UnknownState { lineno: usize, state: StateId },

    #[error("line {lineno}: input is not valid UTF-8")]
    Decode { lineno: usize },

    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Action(BoxError),
}

impl ParseError {
    /// Wrap a domain error raised by an action.
    pub fn action<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        ParseError::Action(err.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnmatchedLine { .. } => ErrorKind::UnmatchedLine,
            ParseError::EmptyStack { .. } | ParseError::UnbalancedStack { .. } => {
                ErrorKind::StackDiscipline
            }
            ParseError::Decode { .. } | ParseError::Io(_) => ErrorKind::Input,
            ParseError::Action(_) | ParseError::UnknownState { .. } => ErrorKind::Action,
        }
    }

    /// The 1-based line number the error refers to, when it refers to one.
    pub fn lineno(&self) -> Option<usize> {
        match self {
            ParseError::UnmatchedLine { lineno, .. }
            | ParseError::EmptyStack { lineno, .. }
            | ParseError::UnknownState { lineno, .. }
            | ParseError::Decode { lineno } => Some(*lineno),
            _ => None,
        }
    }

    /// Borrow the action's original error, if this is one.
    pub fn as_action(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            ParseError::Action(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Take back the action's original error, if this is one.
    pub fn into_action(self) -> Result<BoxError, Self> {
        match self {
            ParseError::Action(err) => Ok(err),
            other => Err(other),
        }
    }
}

/// Errors detected while turning table rows into a [`Table`](super::table::Table).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("transition table has no rules")]
    Empty,

    #[error("state `{state}` binds unknown action `{action}`")]
    UnknownAction { state: String, action: String },

    #[error("action `{0}` is registered more than once")]
    DuplicateAction(String),

    #[error("state `{state}` transitions to undeclared state `{destination}`")]
    DanglingDestination { state: String, destination: String },

    #[error("initial state `{0}` has no rules")]
    UnknownInitial(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("duplicate schema definition: {0}")]
    struct DuplicateSchema(String);

    #[test]
    fn test_unmatched_line_message_is_verbatim() {
        let err = ParseError::UnmatchedLine {
            lineno: 7,
            state: "block".to_string(),
            line: "  weird \"line\"".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "line 7: no transition from state `block` matches:   weird \"line\""
        );
        assert_eq!(err.kind(), ErrorKind::UnmatchedLine);
        assert_eq!(err.lineno(), Some(7));
    }

    #[test]
    fn test_stack_errors_share_a_kind() {
        let empty = ParseError::EmptyStack {
            lineno: 3,
            line: String::new(),
        };
        let unbalanced = ParseError::UnbalancedStack {
            depth: 2,
            states: vec!["init".to_string(), "block".to_string()],
        };
        assert_eq!(empty.kind(), ErrorKind::StackDiscipline);
        assert_eq!(unbalanced.kind(), ErrorKind::StackDiscipline);
        assert_eq!(unbalanced.lineno(), None);
        assert!(unbalanced.to_string().ends_with("init, block"));
    }

    #[test]
    fn test_action_error_is_transparent() {
        let err = ParseError::action(DuplicateSchema("public".to_string()));
        assert_eq!(err.kind(), ErrorKind::Action);
        assert_eq!(err.to_string(), "duplicate schema definition: public");

        let original = err.into_action().expect("action error");
        let schema = original
            .downcast::<DuplicateSchema>()
            .expect("original type survives");
        assert_eq!(schema.0, "public");
    }

    #[test]
    fn test_action_accepts_plain_messages() {
        let err = ParseError::action("bad row");
        assert_eq!(err.to_string(), "bad row");
        assert!(err.as_action().is_some());
    }
}
