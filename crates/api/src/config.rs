//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Default accounting service URL inside the cluster.
const KUBERNETES_ACCOUNTING_URL: &str = "http://accounting-system";
/// Default accounting service URL for local development.
const LOCAL_ACCOUNTING_URL: &str = "http://localhost:8090";

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `ACCOUNTING_BASE_URL` — explicit accounting service URL; when unset
///   the URL is picked by deployment environment: `IS_KUBERNETES_ENV`
///   set means in-cluster, otherwise local
/// - `ACCOUNTING_TIMEOUT_SECS` — per-request timeout for accounting
///   calls (default: `30`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub accounting_base_url: String,
    pub accounting_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            accounting_base_url: accounting_base_url(
                std::env::var("ACCOUNTING_BASE_URL").ok(),
                std::env::var("IS_KUBERNETES_ENV").is_ok(),
            ),
            accounting_timeout: Duration::from_secs(
                std::env::var("ACCOUNTING_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolves the accounting service base URL once, at startup.
fn accounting_base_url(explicit: Option<String>, is_kubernetes: bool) -> String {
    if let Some(url) = explicit {
        return url;
    }
    if is_kubernetes {
        KUBERNETES_ACCOUNTING_URL.to_string()
    } else {
        LOCAL_ACCOUNTING_URL.to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            accounting_base_url: LOCAL_ACCOUNTING_URL.to_string(),
            accounting_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.accounting_base_url, "http://localhost:8090");
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_accounting_url_local_by_default() {
        assert_eq!(accounting_base_url(None, false), "http://localhost:8090");
    }

    #[test]
    fn test_accounting_url_in_kubernetes() {
        assert_eq!(accounting_base_url(None, true), "http://accounting-system");
    }

    #[test]
    fn test_accounting_url_explicit_override_wins() {
        assert_eq!(
            accounting_base_url(Some("http://acc.test:1234".to_string()), true),
            "http://acc.test:1234"
        );
    }
}
