//! Structured logging setup for RoomKit services

use roomkit_config::LogFormat;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// `RUST_LOG` wins over the configured level
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install a JSON subscriber for replay runs and other machine-read output
///
/// One object per line with target, file and line; span context is left out
/// since the reconciler doesn't open spans. The first record names the
/// binary under `service`.
pub fn init_logging(service_name: &str, default_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    tracing::info!(service = service_name, format = "json", "Logging initialized");
}

/// Initialize human-readable console logging (for development)
pub fn init_console_logging(service_name: &str, default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(service = service_name, format = "console", "Logging initialized");
}

/// Initialize logging in the configured format
pub fn init_with_format(service_name: &str, default_level: &str, format: LogFormat) {
    match format {
        LogFormat::Json => init_logging(service_name, default_level),
        LogFormat::Console => init_console_logging(service_name, default_level),
    }
}
