//! Line patterns
//!
//!     A pattern is the match predicate of a transition. It looks at one whole line (the
//!     engine has already removed the line terminator) and either rejects it or accepts it
//!     with a set of captures:
//!
//!         - Any: accepts every line. Used as the else branch of a state, so by convention
//!           it is the last transition declared for that state.
//!         - Literal: accepts the line only when it is exactly equal to the literal.
//!         - Regex: accepts the line when the expression matches anywhere in it (search,
//!           not a full-line anchor). Anchor with `^`/`$` when a full match is wanted.
//!
//!     Only regex patterns produce capture groups. They are numbered from 1 like in the
//!     regex crate; group 0 is the whole match.

use regex::Regex;
use std::fmt;

/// Match predicate over a single line.
#[derive(Debug, Clone)]
pub enum Pattern {
    Any,
    Literal(String),
    Regex(Regex),
}

impl Pattern {
    pub fn any() -> Self {
        Pattern::Any
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Pattern::Literal(text.into())
    }

    /// Compile a regex pattern.
    pub fn regex(expr: &str) -> Result<Self, regex::Error> {
        Regex::new(expr).map(Pattern::Regex)
    }

    /// Test `line` against this pattern.
    pub fn matches<'l>(&self, line: &'l str) -> Option<Captures<'l>> {
        match self {
            Pattern::Any => Some(Captures::empty()),
            Pattern::Literal(text) => (line == text.as_str()).then(Captures::empty),
            Pattern::Regex(regex) => regex.captures(line).map(Captures::from_regex),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Pattern::Any)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Pattern::Regex(regex)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Any => write!(f, "*"),
            Pattern::Literal(text) => write!(f, "{:?}", text),
            Pattern::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Groups captured by a successful match.
///
/// Empty for `Any` and `Literal` patterns.
#[derive(Debug)]
pub struct Captures<'l> {
    inner: Option<regex::Captures<'l>>,
}

impl<'l> Captures<'l> {
    fn empty() -> Self {
        Self { inner: None }
    }

    fn from_regex(captures: regex::Captures<'l>) -> Self {
        Self {
            inner: Some(captures),
        }
    }

    /// Group `index`, where 0 is the whole regex match.
    pub fn get(&self, index: usize) -> Option<&'l str> {
        self.inner
            .as_ref()
            .and_then(|caps| caps.get(index))
            .map(|m| m.as_str())
    }

    pub fn name(&self, name: &str) -> Option<&'l str> {
        self.inner
            .as_ref()
            .and_then(|caps| caps.name(name))
            .map(|m| m.as_str())
    }

    /// Number of explicit groups (group 0 not counted).
    pub fn len(&self) -> usize {
        self.inner
            .as_ref()
            .map_or(0, |caps| caps.len().saturating_sub(1))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Explicit groups in order, `None` for groups that did not participate.
    pub fn groups(&self) -> impl Iterator<Item = Option<&'l str>> + '_ {
        (1..=self.len()).map(move |index| self.get(index))
    }

    /// Explicit groups as owned strings, non-participating groups as empty strings.
    pub fn to_vec(&self) -> Vec<String> {
        self.groups()
            .map(|group| group.unwrap_or_default().to_string())
            .collect()
    }
}
