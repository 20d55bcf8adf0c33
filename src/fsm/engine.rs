//! Parser Engine - Line Driver
//!
//!     The engine owns everything that changes during one parse: the current state, the
//!     context stack, the current line and its 1-based number, and an optional trace. The
//!     [`Table`] it runs is borrowed and never modified, so any number of engines can run
//!     the same table side by side.
//!
//!     Per input line the engine:
//!
//!         1. strips the trailing `\n` / `\r\n` (decoding, when reading bytes, happens
//!            before this and is not part of the state machine),
//!         2. bumps the line counter and keeps the line for actions and error messages,
//!         3. resolves the current state against it,
//!         4. makes the result the new current state.
//!
//!     At end of input it stops. No finalisation action runs; grammars needing an
//!     end-of-input hook do that themselves after `parse` returns.
//!
//!     An engine parses one input. [`Engine::parse`] consumes it; build a new one for the
//!     next input.

use super::error::ParseError;
use super::input::{strip_terminator, Decoding, RawLines};
use super::stack::ContextStack;
use super::state::StateId;
use super::table::Table;
use super::trace::Trace;
use super::transition::Run;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::{debug, trace, warn};

/// Per-parse knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Decoding applied by [`Engine::parse_reader`].
    pub decoding: Decoding,
    /// Fail with [`ParseError::UnbalancedStack`] if states are still pushed at the end.
    pub require_empty_stack: bool,
    /// Record a [`Trace`] of every step.
    pub trace: bool,
}

/// What a finished parse reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub final_state: String,
    pub lines: usize,
    /// States left on the context stack, bottom to top.
    pub stack: Vec<String>,
    pub trace: Option<Trace>,
}

pub struct Engine<'t, C> {
    table: &'t Table<C>,
    options: ParseOptions,
    current: StateId,
    stack: ContextStack,
    line: String,
    lineno: usize,
    trace: Option<Trace>,
}

impl<'t, C> Engine<'t, C> {
    pub fn new(table: &'t Table<C>) -> Self {
        Self::with_options(table, ParseOptions::default())
    }

    pub fn with_options(table: &'t Table<C>, options: ParseOptions) -> Self {
        Self {
            table,
            options,
            current: table.initial(),
            stack: ContextStack::new(),
            line: String::new(),
            lineno: 0,
            trace: options.trace.then(Trace::new),
        }
    }

    /// Turn on trace recording.
    pub fn recording(mut self) -> Self {
        self.options.trace = true;
        self.trace.get_or_insert_with(Trace::new);
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn current(&self) -> StateId {
        self.current
    }

    pub fn current_name(&self) -> &str {
        self.table.name(self.current)
    }

    /// Number of lines consumed so far.
    pub fn lineno(&self) -> usize {
        self.lineno
    }

    /// The last line fed, without its terminator.
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn stack(&self) -> &ContextStack {
        &self.stack
    }

    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    /// Feed a single line.
    ///
    /// For callers that drive the loop themselves. Returns the new current state. After an
    /// error the engine is left on the failing line and should be discarded.
    pub fn feed(&mut self, line: &str, data: &mut C) -> Result<StateId, ParseError> {
        self.lineno += 1;
        self.line.clear();
        self.line.push_str(strip_terminator(line));

        let before = self.current;
        let mut run = Run {
            table: self.table,
            line: &self.line,
            lineno: self.lineno,
            stack: &mut self.stack,
            data,
        };
        let after = self.table.resolve(before, &mut run)?;
        self.current = after;

        trace!(
            target: "linestate::engine",
            lineno = self.lineno,
            from = %self.table.name(before),
            to = %self.table.name(after),
            "step"
        );
        if let Some(trace) = &mut self.trace {
            trace.record(self.lineno, self.table.name(before), self.table.name(after));
        }
        Ok(after)
    }

    /// Run every line through the table, then [`finish`](Self::finish).
    pub fn parse<I>(mut self, lines: I, data: &mut C) -> Result<Summary, ParseError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for line in lines {
            self.feed(line.as_ref(), data)?;
        }
        self.finish()
    }

    /// Read byte lines from `reader`, decode them with the configured [`Decoding`], and
    /// parse them.
    pub fn parse_reader<R: BufRead>(
        mut self,
        reader: R,
        data: &mut C,
    ) -> Result<Summary, ParseError> {
        let decoding = self.options.decoding;
        for raw in RawLines::new(reader) {
            let raw = raw?;
            let text = decoding.decode(&raw).ok_or(ParseError::Decode {
                lineno: self.lineno + 1,
            })?;
            self.feed(&text, data)?;
        }
        self.finish()
    }

    /// End the parse and report where it stopped.
    pub fn finish(self) -> Result<Summary, ParseError> {
        let stack: Vec<String> = self
            .stack
            .iter()
            .map(|id| self.table.display_name(id).to_string())
            .collect();

        if !stack.is_empty() {
            if self.options.require_empty_stack {
                return Err(ParseError::UnbalancedStack {
                    depth: stack.len(),
                    states: stack,
                });
            }
            warn!(
                target: "linestate::engine",
                depth = stack.len(),
                states = %stack.join(", "),
                "input ended with states on the context stack"
            );
        }

        let final_state = self.table.name(self.current).to_string();
        debug!(
            target: "linestate::engine",
            lines = self.lineno,
            final_state = %final_state,
            "parse finished"
        );
        Ok(Summary {
            final_state,
            lines: self.lineno,
            stack,
            trace: self.trace,
        })
    }
}
