//! Service configuration read from the environment.
//!
//! # Environment Variables
//!
//! - `PORT`: HTTP port (default: 8000)
//! - `BIND_ADDR`: Listen address (default: `0.0.0.0`)
//! - `DATABASE_URL`: Document store connection string (optional)
//! - `DATABASE_NAME`: Database name (optional)
//! - `STORE_BACKEND`: `mongo` (default) or `memory`
//! - `CORS_ALLOW_ORIGINS`: Comma-separated origins, or `*` (default)

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8000;

/// Which document store implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// MongoDB, reached through `DATABASE_URL`.
    #[default]
    Mongo,
    /// In-process store; data is lost on restart.
    Memory,
}

impl StoreBackend {
    /// Parse a backend name. Unknown values fall back to `Mongo`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" | "in-memory" => StoreBackend::Memory,
            _ => StoreBackend::Mongo,
        }
    }
}

/// Allowed CORS origins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    pub fn parse(s: &str) -> Self {
        let origins: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            CorsOrigins::Any
        } else {
            CorsOrigins::List(origins)
        }
    }
}

/// Runtime configuration for the HTTP service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub store_backend: StoreBackend,
    pub cors_origins: CorsOrigins,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            database_url: None,
            database_name: None,
            store_backend: StoreBackend::Mongo,
            cors_origins: CorsOrigins::Any,
        }
    }
}

impl ServiceConfig {
    /// Create configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars().collect())
    }

    /// Create configuration from an explicit variable map.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        Self {
            bind_addr: non_empty("BIND_ADDR")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bind_addr),
            port: non_empty("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            database_url: non_empty("DATABASE_URL").map(str::to_string),
            database_name: non_empty("DATABASE_NAME").map(str::to_string),
            store_backend: non_empty("STORE_BACKEND")
                .map(StoreBackend::parse)
                .unwrap_or(defaults.store_backend),
            cors_origins: non_empty("CORS_ALLOW_ORIGINS")
                .map(CorsOrigins::parse)
                .unwrap_or(defaults.cors_origins),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    pub fn database_url_set(&self) -> bool {
        self.database_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServiceConfig::from_vars(HashMap::new());
        assert_eq!(config.port, 8000);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8000");
        assert!(config.database_url.is_none());
        assert!(!config.database_url_set());
        assert_eq!(config.store_backend, StoreBackend::Mongo);
        assert_eq!(config.cors_origins, CorsOrigins::Any);
    }

    #[test]
    fn test_reads_all_variables() {
        let config = ServiceConfig::from_vars(vars(&[
            ("PORT", "9001"),
            ("BIND_ADDR", "127.0.0.1"),
            ("DATABASE_URL", "mongodb://localhost:27017"),
            ("DATABASE_NAME", "analytics"),
            ("STORE_BACKEND", "memory"),
            ("CORS_ALLOW_ORIGINS", "https://a.example, https://b.example"),
        ]));

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9001");
        assert!(config.database_url_set());
        assert_eq!(config.database_name.as_deref(), Some("analytics"));
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(
            config.cors_origins,
            CorsOrigins::List(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = ServiceConfig::from_vars(vars(&[("PORT", "not-a-port")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_blank_database_url_is_unset() {
        let config = ServiceConfig::from_vars(vars(&[("DATABASE_URL", "  ")]));
        assert!(!config.database_url_set());
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!(StoreBackend::parse("MEMORY"), StoreBackend::Memory);
        assert_eq!(StoreBackend::parse("mongo"), StoreBackend::Mongo);
        assert_eq!(StoreBackend::parse("unknown"), StoreBackend::Mongo);
    }

    #[test]
    fn test_wildcard_origin_means_any() {
        assert_eq!(CorsOrigins::parse("https://a.example,*"), CorsOrigins::Any);
        assert_eq!(CorsOrigins::parse(" , "), CorsOrigins::Any);
    }
}
