use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the stdout subscriber. Falls back to `info` when `filter` does
/// not parse; a second call is a no-op.
pub fn init(filter: &str) {
    let filter_layer = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter_layer)
        .try_init();

    if installed.is_ok() {
        tracing::debug!(filter, "tracing configured");
    }
}
