//! Logging configuration
//!
//! Initializes tracing for the application.

/// Initializes logging with the specified default level
///
/// `DEPLOYLINE_LOG` (standard `EnvFilter` syntax) overrides the default.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_env("DEPLOYLINE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
