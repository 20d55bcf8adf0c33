//! # linestate
//!
//! A table-driven, line-oriented finite-state parser.
//!
//! A format is described as data: an ordered list of `(state, pattern, destination,
//! action)` rows plus a set of named actions. The engine reads one line at a time, tries
//! the current state's patterns in declaration order, runs the first match's action and
//! moves on. Actions accumulate results into consumer-owned data and may save and resume
//! states through the context stack to scan nested blocks.
//!
//! ```rust,ignore
//! use linestate::{Pattern, Table};
//!
//! let table = Table::<Vec<String>>::builder()
//!     .action("name", |scope, caps| {
//!         scope.data().push(caps.get(1).unwrap_or_default().to_string());
//!         Ok(None)
//!     })
//!     .rule("init", Pattern::regex(r"^name=(.*)$")?, None, Some("name"))
//!     .rule("init", Pattern::any(), None, None)
//!     .build()?;
//!
//! let mut names = Vec::new();
//! table.engine().parse(input.lines(), &mut names)?;
//! ```
//!
//! File Layout
//!
//! The engine lives in [fsm]; the most used types are re-exported here.

pub mod fsm;

pub use fsm::builtin::{Event, Events};
pub use fsm::definition::{DefinitionError, TableDefinition};
pub use fsm::engine::{Engine, ParseOptions, Summary};
pub use fsm::error::{BuildError, ErrorKind, ParseError};
pub use fsm::input::Decoding;
pub use fsm::pattern::{Captures, Pattern};
pub use fsm::state::StateId;
pub use fsm::table::{Table, TableBuilder, Validation};
pub use fsm::trace::{Step, Trace};
pub use fsm::transition::{action, Action, ActionResult, Scope};
