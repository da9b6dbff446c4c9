//! Logging configuration using tracing
//!
//! Structured logging to stderr with support for the RUST_LOG environment variable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
///
/// Sets up structured logging with:
/// - Filtering via RUST_LOG (defaults to "info" so every per-item sync decision is visible)
/// - Compact formatted output to stderr
///
/// # Example RUST_LOG values
/// - `RUST_LOG=warn` - Only problems (skips, failures, rule warnings)
/// - `RUST_LOG=debug` - Include request-level detail
/// - `RUST_LOG=gitlab_jira_sync=trace,reqwest=info` - Different levels per crate
///
/// # Errors
/// Returns an error if the subscriber has already been initialized
pub fn init() -> crate::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .compact(),
        )
        .try_init()
        .map_err(|e| crate::SyncError::Other(format!("Failed to initialize tracing: {}", e)))?;

    Ok(())
}

/// Initialize logging for tests (no-op if already initialized)
pub fn init_test() {
    let _ = init();
}
