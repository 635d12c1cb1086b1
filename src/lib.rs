//! A caching reverse HTTP proxy: accepts client requests, forwards a configured subset to an
//! upstream origin, and transparently caches successful responses for a bounded time and bounded
//! total memory footprint.
//!
//! The pieces, leaves first:
//!
//! - [`cache`] — the bounded TTL+LRU in-memory store.
//! - [`capture`] — tees an upstream response body to the client while buffering a copy.
//! - [`upstream`] — the reverse-proxy transport bound to [`reqwest`].
//! - [`handlers`] — the pass-through and caching request handlers.
//! - [`routes`] — binds configured `(method, pattern)` routes onto the `axum` router.
//! - [`config`] — JSON configuration loading.
//! - [`logging`] — `tracing` subscriber init.
//! - [`error`] — boot/config error types.

pub mod cache;
pub mod capture;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod routes;
pub mod upstream;

use std::sync::Arc;

use crate::cache::Cache;
use crate::config::Config;
use crate::error::BootError;
use crate::handlers::AppState;
use crate::upstream::Upstream;

/// Build the fully-wired `axum` router and the cache it shares with every request, from an
/// already-loaded [`Config`]. Split out from `main` so integration tests can build the same
/// router the binary serves without going through the process boot sequence (file I/O,
/// listener bind, logging init).
pub fn build_app(config: &Config) -> Result<(axum::Router, Arc<Cache>), BootError> {
    let target_url = config.target_url()?;
    let client = reqwest::Client::builder().build()?;
    let upstream = Upstream::new(client, target_url);
    let cache = Arc::new(Cache::new(config.cache_ttl_in_millis, config.cache_capacity_in_bytes));

    let state = AppState { cache: Arc::clone(&cache), upstream };
    let router =
        routes::build_router(&config.cached_routes, &config.pass_through_routes, state);
    Ok((router, cache))
}
