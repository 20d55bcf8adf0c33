//! Declarative table definitions
//!
//!     Tables can also be written as data, in YAML or JSON, and run with the built-in
//!     actions. Each rule names its source state and at most one of `literal` / `regex`;
//!     a rule with neither matches any line. `next` and `action` are optional, exactly
//!     like the 4-tuple form.
//!
//!     ```yaml
//!     initial: init
//!     validation: strict
//!     rules:
//!       - { state: init, regex: '^\[(\d+)\]$', next: block, action: enter }
//!       - { state: init }
//!       - { state: block, regex: '(\w+)=(.*)', action: emit }
//!       - { state: block, next: init, action: pop }
//!     ```
//!
//!     Regexes are compiled while the table is built, so a bad expression is reported
//!     with the number of its rule before any input is read.

use super::builtin::{self, Events};
use super::error::BuildError;
use super::pattern::Pattern;
use super::table::{Rule, Table, TableBuilder, Validation};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("failed to read table definition: {0}")]
    Io(#[from] io::Error),

    #[error("invalid YAML table definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON table definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rule {rule} (state `{state}`): invalid regex: {source}")]
    InvalidRegex {
        rule: usize,
        state: String,
        source: regex::Error,
    },

    #[error("rule {rule} (state `{state}`): `literal` and `regex` are mutually exclusive")]
    AmbiguousPattern { rule: usize, state: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    pub rules: Vec<RuleDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl TableDefinition {
    pub fn from_yaml(text: &str) -> Result<Self, DefinitionError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a definition file; `.json` files are read as JSON, anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::from_yaml(&text),
        }
    }

    /// Compile the rules into a builder. Actions are left for the caller to register.
    ///
    /// `fallback` applies when the definition does not name a validation mode.
    pub fn to_builder<C>(&self, fallback: Validation) -> Result<TableBuilder<C>, DefinitionError> {
        let mut builder = TableBuilder::new().validation(self.validation.unwrap_or(fallback));
        if let Some(initial) = &self.initial {
            builder = builder.initial(initial.clone());
        }
        for (index, rule) in self.rules.iter().enumerate() {
            builder = builder.push_rule(rule.compile(index + 1)?);
        }
        Ok(builder)
    }

    /// Build a table wired to the [`builtin`] actions.
    pub fn build(&self, fallback: Validation) -> Result<Table<Events>, DefinitionError> {
        let builder = builtin::all()
            .into_iter()
            .fold(self.to_builder(fallback)?, |builder, (name, func)| {
                builder.shared_action(name, func)
            });
        Ok(builder.build()?)
    }
}

impl RuleDefinition {
    fn compile(&self, rule: usize) -> Result<Rule, DefinitionError> {
        let pattern = match (&self.literal, &self.regex) {
            (Some(_), Some(_)) => {
                return Err(DefinitionError::AmbiguousPattern {
                    rule,
                    state: self.state.clone(),
                })
            }
            (Some(text), None) => Pattern::literal(text.clone()),
            (None, Some(expr)) => {
                Pattern::regex(expr).map_err(|source| DefinitionError::InvalidRegex {
                    rule,
                    state: self.state.clone(),
                    source,
                })?
            }
            (None, None) => Pattern::any(),
        };
        Ok(Rule::new(
            self.state.clone(),
            pattern,
            self.next.as_deref(),
            self.action.as_deref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCKS: &str = r#"
initial: init
rules:
  - { state: init, regex: '^\[(\d+)\]$', next: block, action: enter }
  - { state: init }
  - { state: block, regex: '(\w+)=(.*)', action: emit }
  - { state: block, next: init, action: pop }
"#;

    #[test]
    fn test_yaml_definition_runs() {
        let table = TableDefinition::from_yaml(BLOCKS)
            .unwrap()
            .build(Validation::Strict)
            .unwrap();

        let mut events = Events::new();
        let summary = table
            .engine()
            .parse("[1]\nname=foo\n\n[2]\nname=bar\n".lines(), &mut events)
            .unwrap();

        assert_eq!(summary.final_state, "block");
        let groups: Vec<Vec<String>> = events.iter().map(|e| e.groups.clone()).collect();
        assert_eq!(
            groups,
            vec![
                vec!["1".to_string()],
                vec!["name".to_string(), "foo".to_string()],
                vec!["2".to_string()],
                vec!["name".to_string(), "bar".to_string()],
            ]
        );
        assert_eq!(summary.stack, vec!["init"]);
    }

    #[test]
    fn test_json_definition() {
        let definition = TableDefinition::from_json(
            r#"{"rules": [{"state": "s", "literal": "END", "action": "fail"}, {"state": "s"}]}"#,
        )
        .unwrap();
        assert_eq!(definition.rules.len(), 2);
        assert_eq!(definition.rules[0].literal.as_deref(), Some("END"));

        let table = definition.build(Validation::Strict).unwrap();
        let err = table
            .engine()
            .parse(["a", "END"], &mut Events::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "line 2: rejected in state `s`: END");
        let rejected = err.into_action().unwrap().downcast::<builtin::Rejected>().unwrap();
        assert_eq!(rejected.lineno, 2);
    }

    #[test]
    fn test_bad_regex_names_rule() {
        let definition = TableDefinition::from_yaml(
            "rules:\n  - { state: a }\n  - { state: b, regex: '(oops' }\n",
        )
        .unwrap();
        let err = definition.build(Validation::Strict).unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidRegex { rule: 2, .. }));
        assert!(err.to_string().starts_with("rule 2 (state `b`): invalid regex"));
    }

    #[test]
    fn test_ambiguous_pattern() {
        let definition = TableDefinition::from_yaml(
            "rules:\n  - { state: a, literal: x, regex: y }\n",
        )
        .unwrap();
        assert!(matches!(
            definition.build(Validation::Strict),
            Err(DefinitionError::AmbiguousPattern { rule: 1, .. })
        ));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = TableDefinition::from_yaml("rules:\n  - { state: a, nxt: b }\n").unwrap_err();
        assert!(matches!(err, DefinitionError::Yaml(_)));
    }

    #[test]
    fn test_validation_fallback() {
        let definition =
            TableDefinition::from_yaml("rules:\n  - { state: a, next: ghost }\n").unwrap();
        assert!(matches!(
            definition.build(Validation::Strict),
            Err(DefinitionError::Build(BuildError::DanglingDestination { .. }))
        ));
        assert!(definition.build(Validation::Lenient).is_ok());

        let pinned = TableDefinition {
            validation: Some(Validation::Strict),
            ..definition
        };
        assert!(pinned.build(Validation::Lenient).is_err());
    }
}
