//! Tracing subscriber setup.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter directive: `debug` with the debug switch, else `info`.
const fn default_directive(debug: bool) -> &'static str {
    if debug { "debug" } else { "info" }
}

/// Installs the process-wide stderr subscriber.
///
/// `RUST_LOG` wins over the debug switch when set.
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Builds a subscriber that writes one project's diagnostics to `path`
/// (truncating it), without ANSI colours.
pub fn project_subscriber(path: &Path, debug: bool) -> io::Result<impl Subscriber + Send + Sync + 'static> {
    let file = File::create(path)?;

    Ok(tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(EnvFilter::new(default_directive(debug))))
}
