//! Context stack
//!
//!     Grammars with nested blocks save the state that was scanning the outer level before
//!     handing control to a nested scanner. When the nested scanner sees its terminator it
//!     pops the saved state and the engine re-resolves the *same* line against it, so the
//!     terminating line is never skipped. [`Scope::pop`](super::transition::Scope::pop)
//!     marks the line for another pass and the table's resolve loop runs it, however many
//!     levels unwind at once. This type only keeps the states.
//!
//!     The engine never pushes or pops on its own. Balance is the table's business.

use super::state::StateId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextStack {
    states: Vec<StateId>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, state: StateId) {
        self.states.push(state);
    }

    pub fn pop(&mut self) -> Option<StateId> {
        self.states.pop()
    }

    pub fn peek(&self) -> Option<StateId> {
        self.states.last().copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo() {
        let mut stack = ContextStack::new();
        assert!(stack.pop().is_none());

        stack.push(StateId(0));
        stack.push(StateId(2));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.peek(), Some(StateId(2)));
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec![StateId(0), StateId(2)]);

        assert_eq!(stack.pop(), Some(StateId(2)));
        assert_eq!(stack.pop(), Some(StateId(0)));
        assert!(stack.is_empty());
    }
}
