//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Output format of log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact human-readable lines (progress milestones, audit results).
    #[default]
    Text,
    /// One JSON object per event, with timestamps.
    Json,
}

/// Initialize tracing/logging for the process.
///
/// Filtering is configurable via `RUST_LOG` (default `info`). Safe to call
/// multiple times (subsequent calls are no-ops).
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_target(false);

    let _ = match format {
        LogFormat::Text => builder.compact().try_init(),
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init(),
    };
}
