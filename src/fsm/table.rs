//! Transition tables
//!
//!     Consumers describe a format as rows of `(state, pattern, destination, action)`. A
//!     missing destination means "stay in the source state unless the action says
//!     otherwise". Rows for the same source state keep their declaration order, which is
//!     the order the engine tries them in.
//!
//!     Building happens in two phases:
//!
//!         1. Collect every state name mentioned by the rows (as a source or as a
//!            destination) and give each one an index. Forward references are therefore
//!            fine: a row may name a destination declared further down.
//!         2. Bind every row to its source state as a [`Transition`], resolving the action
//!            name and the destination name to what they refer to.
//!
//!     Mistakes in the table are reported here instead of mid-parse: an action name that
//!     was never registered, or (under [`Validation::Strict`]) a destination that has no
//!     rules of its own. Under [`Validation::Lenient`] such a destination becomes a state
//!     with no transitions, so any line reaching it is unmatched.
//!
//!     The resulting [`Table`] is immutable. It can be shared by reference between any
//!     number of engines, on any number of threads.

use super::engine::Engine;
use super::error::{BuildError, ParseError};
use super::pattern::{Captures, Pattern};
use super::state::{State, StateId};
use super::transition::{Action, ActionResult, BoundAction, Outcome, Run, Scope, Transition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// How strictly [`TableBuilder::build`] checks destinations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Validation {
    /// Every destination must be declared as a source state.
    #[default]
    Strict,
    /// Undeclared destinations become empty states and are logged.
    Lenient,
}

/// One declared row of a transition table.
#[derive(Debug, Clone)]
pub struct Rule {
    pub state: String,
    pub pattern: Pattern,
    pub destination: Option<String>,
    pub action: Option<String>,
}

impl Rule {
    pub fn new(
        state: impl Into<String>,
        pattern: Pattern,
        destination: Option<&str>,
        action: Option<&str>,
    ) -> Self {
        Self {
            state: state.into(),
            pattern,
            destination: destination.map(str::to_string),
            action: action.map(str::to_string),
        }
    }
}

/// A transition that can never fire because an earlier `Any` transition of the same
/// state always matches first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shadowed {
    pub state: StateId,
    pub index: usize,
    pub by: usize,
}

pub struct TableBuilder<C> {
    rules: Vec<Rule>,
    actions: HashMap<String, Action<C>>,
    duplicates: Vec<String>,
    initial: Option<String>,
    validation: Validation,
}

impl<C> Default for TableBuilder<C> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            actions: HashMap::new(),
            duplicates: Vec::new(),
            initial: None,
            validation: Validation::default(),
        }
    }
}

impl<C> TableBuilder<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named action.
    pub fn action<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Scope<'_, C>, &Captures<'_>) -> ActionResult + Send + Sync + 'static,
    {
        self.shared_action(name, Arc::new(func))
    }

    /// Register an already shared action, e.g. one of the [`builtin`](super::builtin) ones.
    pub fn shared_action(mut self, name: impl Into<String>, func: Action<C>) -> Self {
        let name = name.into();
        if self.actions.insert(name.clone(), func).is_some() {
            self.duplicates.push(name);
        }
        self
    }

    /// Declare one row.
    pub fn rule(
        mut self,
        state: impl Into<String>,
        pattern: Pattern,
        destination: Option<&str>,
        action: Option<&str>,
    ) -> Self {
        self.rules
            .push(Rule::new(state, pattern, destination, action));
        self
    }

    /// Declare rows from 4-tuples, in order.
    pub fn rules<'a, I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Pattern, Option<&'a str>, Option<&'a str>)>,
    {
        self.rules.extend(
            rules
                .into_iter()
                .map(|(state, pattern, destination, action)| {
                    Rule::new(state, pattern, destination, action)
                }),
        );
        self
    }

    pub fn push_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Start state. Defaults to the source state of the first row.
    pub fn initial(mut self, state: impl Into<String>) -> Self {
        self.initial = Some(state.into());
        self
    }

    pub fn validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    pub fn build(self) -> Result<Table<C>, BuildError> {
        if self.rules.is_empty() {
            return Err(BuildError::Empty);
        }
        if let Some(name) = self.duplicates.into_iter().next() {
            return Err(BuildError::DuplicateAction(name));
        }

        // Phase 1: name every state.
        let mut states: Vec<State<C>> = Vec::new();
        let mut index: HashMap<String, StateId> = HashMap::new();
        for rule in &self.rules {
            if !index.contains_key(&rule.state) {
                let id = StateId(states.len());
                states.push(State::new(id, rule.state.clone()));
                index.insert(rule.state.clone(), id);
            }
        }
        for rule in &self.rules {
            let Some(destination) = &rule.destination else {
                continue;
            };
            if index.contains_key(destination) {
                continue;
            }
            match self.validation {
                Validation::Strict => {
                    return Err(BuildError::DanglingDestination {
                        state: rule.state.clone(),
                        destination: destination.clone(),
                    })
                }
                Validation::Lenient => {
                    warn!(
                        target: "linestate::table",
                        state = %rule.state,
                        destination = %destination,
                        "destination has no rules; any line reaching it will be unmatched"
                    );
                    let id = StateId(states.len());
                    states.push(State::new(id, destination.clone()));
                    index.insert(destination.clone(), id);
                }
            }
        }

        let initial = match &self.initial {
            Some(name) => index
                .get(name)
                .copied()
                .filter(|id| self.rules.iter().any(|rule| index[&rule.state] == *id))
                .ok_or_else(|| BuildError::UnknownInitial(name.clone()))?,
            None => index[&self.rules[0].state],
        };

        // Phase 2: bind rows to their source states.
        for rule in self.rules {
            let source = index[&rule.state];
            let destination = match &rule.destination {
                Some(name) => index[name],
                None => source,
            };
            let action = match rule.action {
                Some(name) => {
                    let func = self.actions.get(&name).cloned().ok_or_else(|| {
                        BuildError::UnknownAction {
                            state: rule.state.clone(),
                            action: name.clone(),
                        }
                    })?;
                    Some(BoundAction { name, func })
                }
                None => None,
            };
            states[source.0].push_transition(Transition::new(rule.pattern, action, destination));
        }

        let table = Table {
            states,
            index,
            initial,
        };
        for shadowed in table.shadowed() {
            let state = table.state(shadowed.state);
            warn!(
                target: "linestate::table",
                state = %state.name(),
                rule = shadowed.index,
                pattern = %state.transitions()[shadowed.index].pattern(),
                by = shadowed.by,
                "transition can never match; an earlier catch-all precedes it"
            );
        }
        debug!(
            target: "linestate::table",
            states = table.states.len(),
            transitions = table.transition_count(),
            initial = %table.name(initial),
            "built transition table"
        );
        Ok(table)
    }
}

/// Immutable state graph produced by [`TableBuilder`].
pub struct Table<C> {
    states: Vec<State<C>>,
    index: HashMap<String, StateId>,
    initial: StateId,
}

impl<C> Table<C> {
    pub fn builder() -> TableBuilder<C> {
        TableBuilder::new()
    }

    /// Fresh engine positioned at the initial state.
    pub fn engine(&self) -> Engine<'_, C> {
        Engine::new(self)
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn lookup(&self, name: &str) -> Option<StateId> {
        self.index.get(name).copied()
    }

    /// The state behind `id`.
    ///
    /// # Panics
    ///
    /// If `id` was not issued by this table and is out of its range. Use [`get`](Self::get)
    /// for ids of unknown origin.
    pub fn state(&self, id: StateId) -> &State<C> {
        &self.states[id.0]
    }

    pub fn get(&self, id: StateId) -> Option<&State<C>> {
        self.states.get(id.0)
    }

    pub fn name(&self, id: StateId) -> &str {
        self.state(id).name()
    }

    /// Name for log output; never panics.
    pub(crate) fn display_name(&self, id: StateId) -> &str {
        self.get(id).map_or("<unknown>", State::name)
    }

    /// Resolve the run's current line, starting in `start`.
    ///
    /// Each pop performed by an action sends the line back through this loop in the
    /// resumed state, so unwinding depth is bounded by the context stack, not by recursion.
    pub(crate) fn resolve(&self, start: StateId, run: &mut Run<'_, C>) -> Result<StateId, ParseError> {
        let mut current = start;
        loop {
            let outcome = self.state(current).step(run)?;
            let (Outcome::Settled(next) | Outcome::Resume(next)) = outcome;
            if self.get(next).is_none() {
                return Err(ParseError::UnknownState {
                    lineno: run.lineno,
                    state: next,
                });
            }
            match outcome {
                Outcome::Settled(_) => return Ok(next),
                Outcome::Resume(_) => current = next,
            }
        }
    }

    /// States in id order: sources by first declaration, then lenient placeholders.
    pub fn states(&self) -> &[State<C>] {
        &self.states
    }

    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|state| state.transitions().len()).sum()
    }

    /// Transitions made unreachable by an earlier `Any` transition in the same state.
    pub fn shadowed(&self) -> Vec<Shadowed> {
        let mut found = Vec::new();
        for state in &self.states {
            let transitions = state.transitions();
            if let Some(by) = transitions.iter().position(|t| t.pattern().is_any()) {
                found.extend((by + 1..transitions.len()).map(|index| Shadowed {
                    state: state.id(),
                    index,
                    by,
                }));
            }
        }
        found
    }
}

impl<C> fmt::Debug for Table<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("initial", &self.initial)
            .field("states", &self.states)
            .finish()
    }
}
