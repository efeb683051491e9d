//! Command-line surface.

use std::ffi::OsString;

use clap::{ArgAction, Parser};
use tracing::info;

use crate::Result;
use crate::config::Config;
use crate::export::{self, CancelToken, ExportOptions, ExportReport};
use crate::store::{self, LocalStore};

#[derive(Parser, Debug)]
#[command(
    name = "thaw",
    version,
    about = "Export Splunk frozen-bucket journals to JSONL",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Source prefix holding frozen buckets (local path or file:// URL).
    pub source: String,

    /// Target root for JSONL output (default: the source prefix).
    #[arg(long, value_name = "URL")]
    pub output_bucket: Option<String>,

    /// Prefix for output JSONL files (default: decoded/).
    #[arg(long, value_name = "STRING")]
    pub output_prefix: Option<String>,

    /// Print events to stdout instead of writing JSONL files.
    #[arg(long)]
    pub console: bool,

    /// Journals decoded in parallel (default: available cores).
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Debug output (repeat for more).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn parse_from<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::parse_from(args)
}

/// Runs one export batch. Per-journal decode failures are reported, not
/// returned: only setup failures (bad source, no journals) are errors.
pub fn run(cli: Cli, config: Config) -> Result<ExportReport> {
    let store = LocalStore::new(&cli.source)?;
    let output_root = match cli.output_bucket.as_deref() {
        Some(bucket) => store::local_root(bucket)?,
        None => store.root().to_path_buf(),
    };

    let options = ExportOptions {
        output_root,
        output_prefix: cli.output_prefix.unwrap_or(config.output_prefix),
        console: cli.console,
        jobs: cli.jobs.unwrap_or(config.jobs),
        cancel: CancelToken::new(),
    };

    let report = export::run(&store, &options)?;
    info!(
        journals = report.journals,
        events = report.events,
        failures = report.failures,
        seconds = report.duration.as_secs_f64(),
        events_per_second = report.events_per_second(),
        "export finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_invocation() {
        let cli = parse_from(["thaw", "/data/frozen"]);
        assert_eq!(cli.source, "/data/frozen");
        assert!(cli.output_bucket.is_none());
        assert!(!cli.console);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_full_invocation() {
        let cli = parse_from([
            "thaw",
            "/data/frozen",
            "--output-bucket",
            "/data/out",
            "--output-prefix",
            "thawed/",
            "--console",
            "--jobs",
            "4",
            "-vv",
        ]);
        assert_eq!(cli.output_bucket.as_deref(), Some("/data/out"));
        assert_eq!(cli.output_prefix.as_deref(), Some("thawed/"));
        assert!(cli.console);
        assert_eq!(cli.jobs, Some(4));
        assert_eq!(cli.verbose, 2);
    }
}
