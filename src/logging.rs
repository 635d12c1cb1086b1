//! Structured logging init, bound to `tracing` + `tracing-subscriber`.
//!
//! Structured logging modeled on `ShiftControl-io-axum-response-cache`'s `CacheService`, a
//! response cache instrumented end-to-end with `tracing`.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Initialize the global `tracing` subscriber at the given level. `RUST_LOG` still takes
/// precedence if set, matching `tracing-subscriber`'s usual `EnvFilter` behavior.
pub fn init(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
