//! Logging initialization.
//!
//! Controlled by `UNLFS_LOG`:
//! - unset or empty → no subscriber (tracing disabled)
//! - `"stderr"` → JSON events to stderr, with span close timing
//! - anything else → human-readable events to stderr
//!
//! The level filter comes from `RUST_LOG` and defaults to `info`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Environment variable that switches logging on.
pub const LOG_ENV: &str = "UNLFS_LOG";

/// Install the global subscriber selected by [`LOG_ENV`].
pub fn init() {
    match std::env::var(LOG_ENV).ok().as_deref() {
        None | Some("") => {}
        Some("stderr") => init_json(),
        Some(_) => init_fmt(),
    }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// JSON events to stderr via tracing-subscriber's JSON formatter.
fn init_json() {
    tracing_subscriber::registry()
        .with(filter())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE),
        )
        .init();
}

fn init_fmt() {
    tracing_subscriber::registry()
        .with(filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
