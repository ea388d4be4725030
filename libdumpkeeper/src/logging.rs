use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// Reads `RUST_LOG` for filtering and falls back to `default_level`
/// (`info` unless the caller asked for more).  Calling this twice is
/// harmless: the second subscriber is simply not installed.
pub fn init_with(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Diagnostics go to stderr; stdout is reserved for command output
    // (`list`, `--format json`).
    let _ = fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Same as [`init_with`] with an `info` default.
pub fn init() {
    init_with("info");
}
