//! Built-in actions
//!
//! `push` and `pop` work for any consumer data. `emit`, `enter` and `fail` record into
//! [`Events`], the data type used when a table comes from a
//! [`TableDefinition`](super::definition::TableDefinition) rather than from Rust code.

use super::error::ParseError;
use super::transition::{action, Action};
use serde::Serialize;
use thiserror::Error;

/// Save the source state on the context stack.
pub fn push<C: 'static>() -> Action<C> {
    action(|scope, _| {
        scope.push_source();
        Ok(None)
    })
}

/// Resume the most recently saved state, re-resolving the current line against it.
pub fn pop<C: 'static>() -> Action<C> {
    action(|scope, _| scope.pop().map(Some))
}

/// One recorded match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub lineno: usize,
    pub action: String,
    pub state: String,
    pub groups: Vec<String>,
}

/// Matches recorded by the built-in actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Events {
    events: Vec<Event>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Record the match: line number, source state and capture groups.
pub fn emit() -> Action<Events> {
    recorder("emit", false)
}

/// Record the match, then save the source state.
pub fn enter() -> Action<Events> {
    recorder("enter", true)
}

fn recorder(name: &'static str, save: bool) -> Action<Events> {
    action::<Events, _>(move |scope, captures| {
        let event = Event {
            lineno: scope.lineno(),
            action: name.to_string(),
            state: scope.state_name(scope.source()).to_string(),
            groups: captures.to_vec(),
        };
        scope.data().push(event);
        if save {
            scope.push_source();
        }
        Ok(None)
    })
}

/// Raised by the `fail` action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("line {lineno}: rejected in state `{state}`: {line}")]
pub struct Rejected {
    pub lineno: usize,
    pub state: String,
    pub line: String,
}

/// Every built-in action under the name table definitions use for it.
pub fn all() -> Vec<(&'static str, Action<Events>)> {
    vec![
        ("emit", emit()),
        ("push", push()),
        ("enter", enter()),
        ("pop", pop()),
        ("fail", fail()),
    ]
}

/// Abort the parse with [`Rejected`].
pub fn fail<C: 'static>() -> Action<C> {
    action(|scope, _| {
        Err(ParseError::action(Rejected {
            lineno: scope.lineno(),
            state: scope.state_name(scope.source()).to_string(),
            line: scope.line().to_string(),
        }))
    })
}
