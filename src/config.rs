//! Configuration loading — a JSON file mirroring the original tool's `config.json` shape, bound
//! to `serde`/`serde_json`.

use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// A single `(methods, pattern)` route entry, as it appears under `CachedRoutes` or
/// `PassThroughRoutes` in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    #[serde(rename = "Methods")]
    pub methods: Vec<String>,
    #[serde(rename = "Pattern")]
    pub pattern: String,
}

/// The deserialized shape of the configuration file. Field names are renamed to match the
/// original PascalCase JSON keys so existing `config.json` files remain wire-compatible.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "LogLevel")]
    pub log_level: String,
    #[serde(rename = "ListenAddr")]
    pub listen_addr: String,
    #[serde(rename = "TargetUrl")]
    pub target_url: String,
    #[serde(rename = "CacheTtlInMillis")]
    pub cache_ttl_in_millis: i64,
    #[serde(rename = "CacheCapacityInBytes")]
    pub cache_capacity_in_bytes: usize,
    #[serde(rename = "CachedRoutes")]
    pub cached_routes: Vec<RouteConfig>,
    #[serde(rename = "PassThroughRoutes")]
    pub pass_through_routes: Vec<RouteConfig>,
}

impl Config {
    /// Read and parse the configuration file at `path`. Does not yet validate `target_url` or
    /// `log_level` — use [`Config::target_url`] and [`Config::tracing_filter`] for that, so the
    /// specific failure (read vs. parse vs. validate) is distinguishable in boot logs.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Parse `target_url` into a [`Url`], the upstream origin requests are forwarded to.
    pub fn target_url(&self) -> Result<Url, ConfigError> {
        Ok(Url::parse(&self.target_url)?)
    }

    /// Validate `log_level` against the set of levels `tracing` understands.
    pub fn tracing_filter(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_config() {
        let json = r#"{
            "LogLevel": "info",
            "ListenAddr": "0.0.0.0:8080",
            "TargetUrl": "http://localhost:9090",
            "CacheTtlInMillis": 60000,
            "CacheCapacityInBytes": 1048576,
            "CachedRoutes": [ { "Methods": ["GET"], "Pattern": "/api/things" } ],
            "PassThroughRoutes": [ { "Methods": ["GET", "POST"], "Pattern": "/api/other" } ]
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.cache_ttl_in_millis, 60_000);
        assert_eq!(config.cached_routes.len(), 1);
        assert_eq!(config.pass_through_routes[0].methods, vec!["GET", "POST"]);
        assert_eq!(config.target_url().unwrap().as_str(), "http://localhost:9090/");
        assert_eq!(config.tracing_filter().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn rejects_an_invalid_log_level() {
        let config = Config {
            log_level: "not-a-level".into(),
            listen_addr: "127.0.0.1:0".into(),
            target_url: "http://localhost".into(),
            cache_ttl_in_millis: 0,
            cache_capacity_in_bytes: 0,
            cached_routes: Vec::new(),
            pass_through_routes: Vec::new(),
        };
        assert!(matches!(config.tracing_filter(), Err(ConfigError::LogLevel(_))));
    }

    #[test]
    fn rejects_an_unparseable_target_url() {
        let config = Config {
            log_level: "info".into(),
            listen_addr: "127.0.0.1:0".into(),
            target_url: "not a url".into(),
            cache_ttl_in_millis: 0,
            cache_capacity_in_bytes: 0,
            cached_routes: Vec::new(),
            pass_through_routes: Vec::new(),
        };
        assert!(matches!(config.target_url(), Err(ConfigError::TargetUrl(_))));
    }
}
