//! Logging bootstrap built on `tracing-subscriber`.

use biblioteca_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,tower_http=debug";

/// Install the global subscriber. Later calls are no-ops.
pub fn init(settings: &TelemetrySettings) {
    let filter = build_filter(settings);

    let installed = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::debug!(
            target: "biblioteca-telemetry",
            format = ?settings.log_format,
            "tracing subscriber installed"
        );
    }
}

/// `RUST_LOG` wins, then the configured directive, then the default.
fn build_filter(settings: &TelemetrySettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| {
            settings
                .filter
                .as_deref()
                .and_then(|directive| EnvFilter::try_new(directive).ok())
        })
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
