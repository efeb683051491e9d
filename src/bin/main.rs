use thaw::{cli, config, telemetry};

fn main() {
    let cli = cli::parse_from(std::env::args_os());

    // telemetry is not up yet, so a bad config file goes to stderr directly
    let config = config::load().unwrap_or_else(|err| {
        eprintln!("thaw: {err}; continuing with built-in defaults");
        config::Config::fallback()
    });
    telemetry::init(cli.verbose, config.logging.format);

    if let Err(err) = cli::run(cli, config) {
        tracing::error!("export failed: {err}");
        std::process::exit(1);
    }
}
