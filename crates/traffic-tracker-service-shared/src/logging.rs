//! Structured logging.
//!
//! - `LOG_FORMAT`: `json` (default) or `text`
//! - `RUST_LOG`: filter directives, replacing [`DEFAULT_FILTER`]
//! - `SERVICE_NAME`: recorded on every request span (default
//!   [`DEFAULT_SERVICE`])
//!
//! JSON output includes the current span, so request entries carry the
//! service name and request id.

use std::collections::HashMap;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Our crates at `info`, HTTP plumbing and dependencies at `warn`.
pub const DEFAULT_FILTER: &str = "traffic_tracker=info,tower_http=warn,warn";

pub const DEFAULT_SERVICE: &str = "traffic-tracker";

static SERVICE: OnceCell<String> = OnceCell::new();

/// Service name installed by [`init_logging`].
pub fn service_name() -> &'static str {
    SERVICE.get().map(String::as_str).unwrap_or(DEFAULT_SERVICE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl LogFormat {
    /// `text` and `pretty` select text output; anything else is JSON.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub filter: String,
    pub service: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            filter: DEFAULT_FILTER.to_string(),
            service: DEFAULT_SERVICE.to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars().collect())
    }

    /// Blank values are treated as unset.
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        Self {
            format: non_empty("LOG_FORMAT")
                .map(LogFormat::parse)
                .unwrap_or(defaults.format),
            filter: non_empty("RUST_LOG")
                .map(str::to_string)
                .unwrap_or(defaults.filter),
            service: non_empty("SERVICE_NAME")
                .map(str::to_string)
                .unwrap_or(defaults.service),
        }
    }

    /// Filter from the configured directives, or [`DEFAULT_FILTER`] when
    /// they do not parse.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LoggingConfig) {
    let _ = SERVICE.set(config.service.clone());

    let registry = tracing_subscriber::registry().with(config.env_filter());

    match config.format {
        LogFormat::Text => registry.with(fmt::layer().compact()).init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .init(),
    }

    tracing::info!(
        service = %config.service,
        filter = %config.filter,
        format = ?config.format,
        "logging initialized"
    );
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
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" text "), LogFormat::Text);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
        assert_eq!(LogFormat::parse("yaml"), LogFormat::Json);
    }

    #[test]
    fn test_defaults_when_unset_or_blank() {
        let config = LoggingConfig::from_vars(vars(&[("RUST_LOG", "  ")]));
        assert_eq!(config, LoggingConfig::default());
        assert_eq!(config.filter, DEFAULT_FILTER);
        assert_eq!(config.service, "traffic-tracker");
    }

    #[test]
    fn test_environment_overrides() {
        let config = LoggingConfig::from_vars(vars(&[
            ("LOG_FORMAT", "text"),
            ("RUST_LOG", "debug"),
            ("SERVICE_NAME", "tracker-eu"),
        ]));
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.filter, "debug");
        assert_eq!(config.service, "tracker-eu");
    }

    #[test]
    fn test_env_filter_falls_back_on_bad_directives() {
        let config = LoggingConfig {
            filter: "traffic_tracker=loud".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(config.env_filter().to_string(), EnvFilter::new(DEFAULT_FILTER).to_string());
    }

    #[test]
    fn test_service_name_defaults_before_init() {
        assert!(!service_name().is_empty());
    }
}
