//! Error types for configuration loading and process boot.
//!
//! Cache operations never fail (see [`crate::cache`]); upstream/transport failures are not
//! represented here because they are surfaced to the client as an HTTP response, not propagated
//! as a Rust error (see [`crate::handlers`]).

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while loading and validating the configuration file.
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("failed to read config file at {path}")]
    #[diagnostic(code(caching_reverse_proxy::config::io))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file as JSON")]
    #[diagnostic(code(caching_reverse_proxy::config::parse))]
    Parse(#[from] serde_json::Error),
    #[error("invalid TargetUrl")]
    #[diagnostic(code(caching_reverse_proxy::config::target_url))]
    TargetUrl(#[from] url::ParseError),
    #[error("invalid LogLevel {0:?}")]
    #[diagnostic(code(caching_reverse_proxy::config::log_level))]
    LogLevel(String),
}

/// Errors that are fatal at process boot: config loading, client construction, and binding the
/// listener.
#[derive(Error, Diagnostic, Debug)]
pub enum BootError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build the upstream HTTP client")]
    #[diagnostic(code(caching_reverse_proxy::boot::client))]
    Client(#[from] reqwest::Error),
    #[error("failed to bind listener on {addr}")]
    #[diagnostic(code(caching_reverse_proxy::boot::bind))]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
