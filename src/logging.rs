//! Tracing subscriber initialization
//!
//! Embedders that want the engine's structured logs call [init] once at
//! startup; tests can call it repeatedly, later calls are no-ops.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// Filter defaults to debug for this crate and can be overridden with
/// `RUST_LOG`.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "archivist=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .ok();
}
