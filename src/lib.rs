pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod report;
pub mod util;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging. Diagnostics go to stderr so command output
/// stays clean on stdout.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
