//! Tracing setup for the CLI.

use tracing::metadata::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Env var overriding the default level filter.
pub const ENV_LOG: &str = "LOG";

/// Initializes the global subscriber. Default level comes from the
/// `--verbose` count; the `LOG` env var takes precedence.
pub fn init(verbosity: u8, format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(verbosity).into())
        .with_env_var(ENV_LOG)
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}
