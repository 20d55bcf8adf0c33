//! Command-line interface for linestate
//! This binary runs declarative transition tables (YAML or JSON) over text files.
//!
//! Usage:
//!   linestate run `<table>` `<input>` [--format text|json] [--trace] [--decoding `<mode>`]
//!   linestate check `<table>`                  - Build a table and list its states
//!
//! Global options:
//!   --config `<file>`      - Layer a TOML config file over the built-in defaults
//!   --log-level `<level>`  - Override `log.level`

mod logging;

use clap::{Arg, ArgAction, ArgMatches, Command};
use linestate::{Engine, Events, Summary, Table, TableDefinition};
use linestate_config::{ConfigError, LinestateConfig, Loader};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing::debug;

fn main() {
    let matches = Command::new("linestate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run table-driven line parsers over text files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML configuration file layered over the defaults")
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log level: off, error, warn, info, debug, trace")
                .global(true),
        )
        .subcommand(
            Command::new("run")
                .about("Parse an input file with a transition table")
                .arg(
                    Arg::new("table")
                        .help("Path to the table definition (.yaml, .yml or .json)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("input")
                        .help("Path to the input file, or - for stdin")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    Arg::new("trace")
                        .long("trace")
                        .help("Print every (line, from, to) step")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("decoding")
                        .long("decoding")
                        .help("How input bytes become text")
                        .value_parser(["utf8", "utf8-lossy", "raw"]),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Build a transition table and report its states and transitions")
                .arg(
                    Arg::new("table")
                        .help("Path to the table definition (.yaml, .yml or .json)")
                        .required(true)
                        .index(1),
                ),
        )
        .get_matches();

    let config = load_config(&matches);
    if let Err(e) = logging::init(&config.log) {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    match matches.subcommand() {
        Some(("run", sub)) => handle_run_command(sub, &config),
        Some(("check", sub)) => handle_check_command(sub, &config),
        _ => unreachable!("a subcommand is required"),
    }
}

fn load_config(matches: &ArgMatches) -> LinestateConfig {
    build_config(matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    })
}

/// Defaults, then `--config`, then individual flags.
fn build_config(matches: &ArgMatches) -> Result<LinestateConfig, ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        loader = loader.set_override("log.level", level.as_str())?;
    }
    if let Some(("run", sub)) = matches.subcommand() {
        if let Some(decoding) = sub.get_one::<String>("decoding") {
            loader = loader.set_override("parse.decoding", decoding.as_str())?;
        }
    }
    loader.build()
}

fn load_table(path: &str, config: &LinestateConfig) -> Table<Events> {
    debug!(target: "linestate::cli", path, validation = ?config.table.validation, "loading table");
    TableDefinition::from_path(path)
        .and_then(|definition| definition.build(config.table.validation))
        .unwrap_or_else(|e| {
            eprintln!("Table error in {}: {}", path, e);
            std::process::exit(1);
        })
}

#[derive(Serialize)]
struct RunReport<'a> {
    events: &'a Events,
    summary: &'a Summary,
}

/// Handle the run command
fn handle_run_command(matches: &ArgMatches, config: &LinestateConfig) {
    let table_path = matches.get_one::<String>("table").expect("table is required");
    let input_path = matches.get_one::<String>("input").expect("input is required");
    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");

    let table = load_table(table_path, config);
    let reader: Box<dyn BufRead> = if input_path == "-" {
        Box::new(io::stdin().lock())
    } else {
        match File::open(input_path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                eprintln!("Failed to open {}: {}", input_path, e);
                std::process::exit(1);
            }
        }
    };

    let mut engine = Engine::with_options(&table, config.parse);
    if matches.get_flag("trace") {
        engine = engine.recording();
    }

    debug!(target: "linestate::cli", input = %input_path, options = ?config.parse, "parsing");
    let mut events = Events::new();
    let summary = engine.parse_reader(reader, &mut events).unwrap_or_else(|e| {
        eprintln!("Parse error in {}: {}", input_path, e);
        std::process::exit(1);
    });

    match format {
        "json" => {
            let report = RunReport {
                events: &events,
                summary: &summary,
            };
            let json = serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
                eprintln!("Error formatting report: {}", e);
                std::process::exit(1);
            });
            println!("{}", json);
        }
        _ => print!("{}", render_text(&events, &summary)),
    }
}

fn render_text(events: &Events, summary: &Summary) -> String {
    let mut out = String::new();
    for event in events.iter() {
        out.push_str(&format!("{}\t{}\t{}", event.lineno, event.state, event.action));
        for group in &event.groups {
            out.push('\t');
            out.push_str(group);
        }
        out.push('\n');
    }
    out.push_str(&format!("final state: {}\n", summary.final_state));
    out.push_str(&format!("lines: {}\n", summary.lines));
    if !summary.stack.is_empty() {
        out.push_str(&format!("stack: {}\n", summary.stack.join(", ")));
    }
    if let Some(trace) = &summary.trace {
        out.push_str("trace:\n");
        out.push_str(&trace.to_string());
    }
    out
}

/// Handle the check command
fn handle_check_command(matches: &ArgMatches, config: &LinestateConfig) {
    let table_path = matches.get_one::<String>("table").expect("table is required");
    let table = load_table(table_path, config);

    println!("initial: {}", table.name(table.initial()));
    println!(
        "states: {}, transitions: {}",
        table.states().len(),
        table.transition_count()
    );
    for state in table.states() {
        println!("{}", state.name());
        for transition in state.transitions() {
            let mut line = format!(
                "  {} -> {}",
                transition.pattern(),
                table.name(transition.destination())
            );
            if let Some(action) = transition.action() {
                line.push_str(&format!(" [{}]", action));
            }
            println!("{}", line);
        }
    }
    for shadowed in table.shadowed() {
        println!(
            "warning: state `{}` transition {} is unreachable after catch-all transition {}",
            table.name(shadowed.state),
            shadowed.index + 1,
            shadowed.by + 1
        );
    }
}
