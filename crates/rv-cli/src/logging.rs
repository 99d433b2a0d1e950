use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

pub(crate) const LOG_ENV: &str = "RV_LOG";

pub(crate) fn default_filter(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("rv_installer={level},rv_cli={level}")
}

/// Installs the stderr log subscriber. `RV_LOG` overrides the `-v` derived filter.
pub(crate) fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .without_time()
        .try_init();
}
