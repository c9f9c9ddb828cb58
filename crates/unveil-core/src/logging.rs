#![forbid(unsafe_code)]

//! JSON log output for production builds.
//!
//! Installs a global `tracing` subscriber that writes one JSON object per
//! event. The filter follows `RUST_LOG` when set and falls back to the
//! directive passed by the caller.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the JSON subscriber.
///
/// Returns `false` if a global subscriber was already installed; the
/// existing subscriber is kept in that case.
pub fn init_json(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(target: "unveil", directive = default_directive, "json logging installed");
    }
    installed
}
