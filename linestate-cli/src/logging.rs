//! Log initialisation for the CLI
//!
//! Built on `tracing-subscriber`: one formatting layer on stderr, filtered per target so
//! table construction and per-line engine events can be turned up independently.

use linestate_config::{LogConfig, LogFormat};
use std::io;
use std::str::FromStr;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

const TARGETS: &[&str] = &["linestate::table", "linestate::engine", "linestate::cli"];

/// Install the global subscriber described by `log_config`.
///
/// Returns an error naming the offending value if a level does not parse.
pub fn init(log_config: &LogConfig) -> Result<(), String> {
    let mut targets = Targets::new().with_default(parse_level(&log_config.level)?);
    for target in TARGETS {
        targets = targets.with_target(*target, parse_level(log_config.level_for(target))?);
    }

    let layer = create_format_layer(log_config.format, io::stderr).with_filter(targets);
    tracing_subscriber::registry().with(layer).init();
    Ok(())
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    LevelFilter::from_str(level).map_err(|_| format!("invalid log level `{}`", level))
}

fn create_format_layer<W, F>(format: LogFormat, make_writer: F) -> impl Layer<tracing_subscriber::Registry>
where
    W: io::Write + Send + Sync + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(make_writer)
            .boxed(),
    }
}
