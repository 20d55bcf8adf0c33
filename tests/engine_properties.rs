//! Property-based and table-driven tests for the engine's matching rules
//!
//! These cover the guarantees consumers build on: declaration order is precedence, a
//! trailing catch-all behaves as an else branch, unmatched lines report exactly what
//! failed, and independent engines never influence each other.

use linestate::{ErrorKind, ParseError, Pattern, Table, Trace};
use proptest::prelude::*;
use rstest::rstest;

/// Which transition fired, by name.
type Fired = Vec<&'static str>;

fn named(name: &'static str) -> linestate::Action<Fired> {
    linestate::action::<Fired, _>(move |scope, _| {
        scope.data().push(name);
        Ok(None)
    })
}

fn end_else_table() -> Table<Fired> {
    Table::<Fired>::builder()
        .shared_action("literal", named("literal"))
        .shared_action("regex", named("regex"))
        .rule("s", Pattern::literal("END"), None, Some("literal"))
        .rule("s", Pattern::regex("^E").unwrap(), None, Some("regex"))
        .build()
        .unwrap()
}

#[rstest]
#[case::literal_declared_first_wins("END", "literal")]
#[case::regex_only("ELSE", "regex")]
#[case::regex_prefix("E", "regex")]
#[case::literal_is_not_a_prefix_match("END!", "regex")]
fn test_literal_regex_precedence(#[case] line: &str, #[case] expected: &str) {
    let table = end_else_table();
    let mut fired = Fired::new();
    table.engine().parse([line], &mut fired).unwrap();
    assert_eq!(fired, vec![expected]);
}

#[rstest]
#[case("XEND")]
#[case("end")]
#[case("")]
fn test_no_transition_matches(#[case] line: &str) {
    let table = end_else_table();
    let err = table.engine().parse([line], &mut Fired::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnmatchedLine);
}

/// `a` goes to `x`, lines starting with `b` go to `y`, anything else goes to `z`.
fn else_table(any_first: bool) -> Table<()> {
    let specific = [
        ("s", Pattern::literal("a"), Some("x"), None),
        ("s", Pattern::regex("^b").unwrap(), Some("y"), None),
    ];
    let fallback = ("s", Pattern::any(), Some("z"), None);

    let mut builder = Table::<()>::builder();
    if any_first {
        builder = builder.rules([fallback]).rules(specific);
    } else {
        builder = builder.rules(specific).rules([fallback]);
    }
    builder
        .rules([
            ("x", Pattern::any(), Some("s"), None),
            ("y", Pattern::any(), Some("s"), None),
            ("z", Pattern::any(), Some("s"), None),
        ])
        .build()
        .unwrap()
}

fn trace_of<C>(table: &Table<C>, lines: &[String], data: &mut C) -> Result<Trace, ParseError> {
    let summary = table.engine().recording().parse(lines, data)?;
    Ok(summary.trace.unwrap_or_default())
}

#[test]
fn test_moving_catch_all_first_changes_trace() {
    let lines = vec!["a".to_string(), "next".to_string()];
    let last = trace_of(&else_table(false), &lines, &mut ()).unwrap();
    let first = trace_of(&else_table(true), &lines, &mut ()).unwrap();

    assert_eq!(last.states(), vec!["x", "s"]);
    assert_eq!(first.states(), vec!["z", "s"]);
    assert_ne!(last, first);
}

#[test]
fn test_engines_share_a_table_across_threads() {
    let table = end_else_table();
    let inputs = [vec!["END", "ELSE"], vec!["EAST", "END"]];

    let results: Vec<Fired> = std::thread::scope(|s| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| {
                let table = &table;
                s.spawn(move || {
                    let mut fired = Fired::new();
                    table.engine().parse(input, &mut fired).unwrap();
                    fired
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results[0], vec!["literal", "regex"]);
    assert_eq!(results[1], vec!["regex", "literal"]);
}

/// Lines drawn from the shapes the block grammar cares about, plus noise.
fn block_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "\\[[0-9]{1,3}\\]",
        "[a-z]{1,6}=[a-z0-9 ]{0,8}",
        Just(String::new()),
        "[ -~]{0,12}",
    ]
}

/// Block grammar where every state ends in a catch-all, so every input parses.
fn total_block_table() -> Table<Vec<String>> {
    Table::<Vec<String>>::builder()
        .action("start", |scope, caps| {
            let id = caps.get(1).unwrap_or_default().to_string();
            scope.data().push(id);
            scope.push_source();
            Ok(None)
        })
        .action("close", |scope, _| Ok(Some(scope.pop()?)))
        .rule("init", Pattern::regex(r"^\[(\d+)\]$").unwrap(), Some("block"), Some("start"))
        .rule("init", Pattern::any(), None, None)
        .rule("block", Pattern::regex(r"(\w+)=(.*)").unwrap(), None, None)
        .rule("block", Pattern::any(), Some("init"), Some("close"))
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn prop_traces_are_reproducible(lines in prop::collection::vec(block_line(), 0..40)) {
        let table = total_block_table();
        let mut first_data = Vec::new();
        let first = trace_of(&table, &lines, &mut first_data).unwrap();

        // Same table, fresh engine.
        let mut second_data = Vec::new();
        let second = trace_of(&table, &lines, &mut second_data).unwrap();

        // Independently built table.
        let rebuilt = total_block_table();
        let mut third_data = Vec::new();
        let third = trace_of(&rebuilt, &lines, &mut third_data).unwrap();

        prop_assert_eq!(first.len(), lines.len());
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &third);
        prop_assert_eq!(&first_data, &second_data);
        prop_assert_eq!(&first_data, &third_data);
        for (index, step) in first.steps().iter().enumerate() {
            prop_assert_eq!(step.lineno, index + 1);
        }
    }

    #[test]
    fn prop_catch_all_is_the_else_branch(line in "[ -~]{0,12}") {
        prop_assume!(line != "a" && !line.starts_with('b'));
        let trace = trace_of(&else_table(false), &[line], &mut ()).unwrap();
        prop_assert_eq!(trace.states(), vec!["z"]);
    }

    #[test]
    fn prop_unmatched_line_reports_text_and_number(
        prefix in 0usize..20,
        bad in "[ -~]{0,12}",
    ) {
        prop_assume!(bad != "END" && !bad.starts_with('E'));
        let mut lines = vec!["END".to_string(); prefix];
        lines.push(bad.clone());
        lines.push("END".to_string());

        let table = end_else_table();
        let err = table.engine().parse(&lines, &mut Fired::new()).unwrap_err();
        match err {
            ParseError::UnmatchedLine { lineno, state, line } => {
                prop_assert_eq!(lineno, prefix + 1);
                prop_assert_eq!(state, "s");
                prop_assert_eq!(&line, &bad);
            }
            other => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
