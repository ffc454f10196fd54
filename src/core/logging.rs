//! Tracing subscriber setup for the CLI

use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive, e.g. `gearkit=debug`
pub const LOG_ENV: &str = "GEAR_LOG";

/// Filter for a `-v` count when `GEAR_LOG` is unset
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "gearkit=info",
        2 => "gearkit=debug",
        _ => "trace",
    }
}

/// Install the global subscriber, writing to stderr
///
/// Does nothing if a subscriber is already installed.
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
