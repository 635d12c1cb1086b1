//! Process entry point: load configuration, wire up the cache, the upstream client, and the
//! router, then serve forever. Any failure here is fatal — logged and turned into a non-zero
//! exit code, never a panic.

use caching_reverse_proxy::config::Config;
use caching_reverse_proxy::error::BootError;

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // tracing may not be initialized yet if the failure happened while loading the config
        // that tells us what level to log at, so fall back to eprintln for that case.
        eprintln!("fatal: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BootError> {
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;

    let level = config.tracing_filter()?;
    caching_reverse_proxy::logging::init(level);

    tracing::info!(listen_addr = %config.listen_addr, target_url = %config.target_url, "booting");

    let (router, _cache) = caching_reverse_proxy::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|source| BootError::Bind { addr: config.listen_addr.clone(), source })?;

    tracing::info!(listen_addr = %config.listen_addr, "listening");
    axum::serve(listener, router)
        .await
        .map_err(|source| BootError::Bind { addr: config.listen_addr.clone(), source })
}
