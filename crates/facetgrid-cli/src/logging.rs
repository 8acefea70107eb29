use crate::types::LogLevel;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "FACETGRID_LOG";

/// Install the stderr subscriber. An explicit level wins over `FACETGRID_LOG`;
/// without either only warnings are shown.
pub fn init(level: Option<LogLevel>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    // A second init (e.g. from tests calling `run` twice) keeps the first.
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
