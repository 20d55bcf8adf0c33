//! Transitions and the action interface
//!
//!     A transition binds a [`Pattern`], an optional named action and a declared
//!     destination. When the pattern matches the current line the action (if any) runs
//!     and may override the destination; otherwise the declared destination is taken.
//!
//!     Actions see the running parse through a [`Scope`]: the source state, the declared
//!     destination, the current line and its 1-based number, the consumer's data and the
//!     context stack. An action returns:
//!
//!         - `Ok(None)` to accept the declared destination,
//!         - `Ok(Some(state))` to override it (this is how `pop` resumes an outer state),
//!         - `Err(_)` to abort the whole parse. Domain errors are wrapped with
//!           [`ParseError::action`] and come out of `parse` untouched.
//!
//!     An action that called [`Scope::pop`] does not settle the line. The state it hands
//!     back is resolved against the same line again, by the loop in
//!     [`Table::resolve`](super::table::Table), so unwinding many nested blocks on one
//!     line costs no native stack.

use super::error::ParseError;
use super::pattern::{Captures, Pattern};
use super::stack::ContextStack;
use super::state::StateId;
use super::table::Table;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// What an action hands back to the engine.
pub type ActionResult = Result<Option<StateId>, ParseError>;

/// A named action callback, shared by every transition that binds the name.
pub type Action<C> = Arc<dyn Fn(&mut Scope<'_, C>, &Captures<'_>) -> ActionResult + Send + Sync>;

/// Wrap a closure as a shareable [`Action`].
pub fn action<C, F>(func: F) -> Action<C>
where
    F: Fn(&mut Scope<'_, C>, &Captures<'_>) -> ActionResult + Send + Sync + 'static,
{
    Arc::new(func)
}

/// Result of a matching transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The line is done; this is the next current state.
    Settled(StateId),
    /// The action popped the context stack; resolve the line again in this state.
    Resume(StateId),
}

pub(crate) struct BoundAction<C> {
    pub(crate) name: String,
    pub(crate) func: Action<C>,
}

pub struct Transition<C> {
    pattern: Pattern,
    action: Option<BoundAction<C>>,
    destination: StateId,
}

impl<C> Transition<C> {
    pub(crate) fn new(
        pattern: Pattern,
        action: Option<BoundAction<C>>,
        destination: StateId,
    ) -> Self {
        Self {
            pattern,
            action,
            destination,
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_ref().map(|bound| bound.name.as_str())
    }

    /// The destination declared in the table, before any action override.
    pub fn destination(&self) -> StateId {
        self.destination
    }

    /// Try this transition against the run's current line.
    ///
    /// `Ok(None)` means the pattern did not match and the owning state should try its next
    /// transition.
    pub(crate) fn try_match(
        &self,
        source: StateId,
        run: &mut Run<'_, C>,
    ) -> Result<Option<Outcome>, ParseError> {
        let Some(captures) = self.pattern.matches(run.line) else {
            return Ok(None);
        };
        let Some(bound) = &self.action else {
            return Ok(Some(Outcome::Settled(self.destination)));
        };

        let mut scope = Scope {
            run: run.reborrow(),
            source,
            destination: self.destination,
            popped: false,
        };
        let chosen = (bound.func)(&mut scope, &captures)?.unwrap_or(self.destination);
        Ok(Some(if scope.popped {
            Outcome::Resume(chosen)
        } else {
            Outcome::Settled(chosen)
        }))
    }
}

impl<C> fmt::Debug for Transition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("pattern", &self.pattern)
            .field("action", &self.action())
            .field("destination", &self.destination)
            .finish()
    }
}

/// Per-line view of a parse in progress.
pub(crate) struct Run<'r, C> {
    pub(crate) table: &'r Table<C>,
    pub(crate) line: &'r str,
    pub(crate) lineno: usize,
    pub(crate) stack: &'r mut ContextStack,
    pub(crate) data: &'r mut C,
}

impl<C> Run<'_, C> {
    fn reborrow(&mut self) -> Run<'_, C> {
        Run {
            table: self.table,
            line: self.line,
            lineno: self.lineno,
            stack: &mut *self.stack,
            data: &mut *self.data,
        }
    }
}

/// What an action can see and do while it runs.
pub struct Scope<'a, C> {
    run: Run<'a, C>,
    source: StateId,
    destination: StateId,
    popped: bool,
}

impl<C> Scope<'_, C> {
    /// State whose transition matched.
    pub fn source(&self) -> StateId {
        self.source
    }

    /// Destination declared in the table for the matched transition.
    pub fn destination(&self) -> StateId {
        self.destination
    }

    /// The current line, without its terminator.
    pub fn line(&self) -> &str {
        self.run.line
    }

    /// 1-based number of the current line.
    pub fn lineno(&self) -> usize {
        self.run.lineno
    }

    /// The consumer's data for this parse.
    pub fn data(&mut self) -> &mut C {
        &mut *self.run.data
    }

    /// Look up a state by name.
    pub fn state(&self, name: &str) -> Option<StateId> {
        self.run.table.lookup(name)
    }

    pub fn state_name(&self, id: StateId) -> &str {
        self.run.table.display_name(id)
    }

    /// Number of states currently saved on the context stack.
    pub fn depth(&self) -> usize {
        self.run.stack.len()
    }

    pub fn push(&mut self, state: StateId) {
        self.run.stack.push(state);
        debug!(
            target: "linestate::engine",
            lineno = self.run.lineno,
            state = %self.run.table.display_name(state),
            depth = self.run.stack.len(),
            "push"
        );
    }

    /// Save the state whose transition matched, so a nested scanner can return to it.
    pub fn push_source(&mut self) {
        self.push(self.source);
    }

    /// Resume the most recently saved state.
    ///
    /// The saved state is removed from the stack and returned. Actions hand it back as
    /// their override, and the engine then resolves the *current* line against it, so the
    /// terminating line of a nested block is processed by the outer scanner instead of
    /// being skipped. If that resolution pops again, the engine keeps unwinding on the
    /// same line.
    pub fn pop(&mut self) -> Result<StateId, ParseError> {
        let resumed = self
            .run
            .stack
            .pop()
            .ok_or_else(|| ParseError::EmptyStack {
                lineno: self.run.lineno,
                line: self.run.line.to_string(),
            })?;
        self.popped = true;
        debug!(
            target: "linestate::engine",
            lineno = self.run.lineno,
            state = %self.run.table.display_name(resumed),
            depth = self.run.stack.len(),
            "pop"
        );
        Ok(resumed)
    }
}
