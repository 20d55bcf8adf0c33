//! States
//!
//!     A state is a named node of the table holding its transitions in declaration order.
//!     Stepping a line walks those transitions front to back and the first one that
//!     matches decides what happens next. Nothing is reordered or indexed by pattern kind:
//!     declaration order is precedence.

use super::error::ParseError;
use super::transition::{Outcome, Run, Transition};
use std::fmt;
use tracing::trace;

/// Index of a state inside its [`Table`](super::table::Table).
///
/// Ids are only meaningful for the table that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub struct State<C> {
    id: StateId,
    name: String,
    transitions: Vec<Transition<C>>,
}

impl<C> State<C> {
    pub(crate) fn new(id: StateId, name: String) -> Self {
        Self {
            id,
            name,
            transitions: Vec::new(),
        }
    }

    pub(crate) fn push_transition(&mut self, transition: Transition<C>) {
        self.transitions.push(transition);
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transitions in declaration order.
    pub fn transitions(&self) -> &[Transition<C>] {
        &self.transitions
    }

    /// Match the run's current line against this state's transitions.
    ///
    /// Returns the outcome of the first matching transition. Fails with
    /// [`ParseError::UnmatchedLine`] when nothing matches.
    pub(crate) fn step(&self, run: &mut Run<'_, C>) -> Result<Outcome, ParseError> {
        for (index, transition) in self.transitions.iter().enumerate() {
            if let Some(outcome) = transition.try_match(self.id, run)? {
                trace!(
                    target: "linestate::engine",
                    lineno = run.lineno,
                    state = %self.name,
                    rule = index,
                    pattern = %transition.pattern(),
                    "matched"
                );
                return Ok(outcome);
            }
        }

        Err(ParseError::UnmatchedLine {
            lineno: run.lineno,
            state: self.name.clone(),
            line: run.line.to_string(),
        })
    }
}

impl<C> fmt::Debug for State<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("transitions", &self.transitions)
            .finish()
    }
}
