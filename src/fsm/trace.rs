//! Parse traces
//!
//! A trace is the list of `(lineno, from, to)` steps an engine took, one per input line.
//! Two engines built from the same table and fed the same input produce equal traces.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub lineno: usize,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Trace {
    steps: Vec<Step>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, lineno: usize, from: &str, to: &str) {
        self.steps.push(Step {
            lineno,
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Destination state of every step, in order.
    pub fn states(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.to.as_str()).collect()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{}: {} -> {}", step.lineno, step.from, step.to)?;
        }
        Ok(())
    }
}
