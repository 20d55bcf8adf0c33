//! Table-driven line state machine
//!
//!     Every module here is one piece of the engine, leaf first:
//!
//!         - [pattern]: match predicates over a single line (any, literal, regex).
//!         - [transition]: pattern + optional named action + declared destination, and the
//!           [`Scope`](transition::Scope) actions run in.
//!         - [state]: a named, ordered list of transitions; first match wins.
//!         - [stack]: the context stack used for nested blocks.
//!         - [table]: two-phase construction of the immutable state graph.
//!         - [engine]: the per-parse driver that feeds lines to the current state.
//!
//!     Around them sit [input] (line terminators and decoding), [trace], [error],
//!     [builtin] actions and [definition] (tables written as YAML/JSON).

pub mod builtin;
pub mod definition;
pub mod engine;
pub mod error;
pub mod input;
pub mod pattern;
pub mod stack;
pub mod state;
pub mod table;
pub mod trace;
pub mod transition;
