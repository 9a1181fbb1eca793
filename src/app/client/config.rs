//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the `reqwest`
//! client used for raw-content downloads.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::http;
use crate::errors::{FetchError, FetchResult};

/// Configuration for the HTTP client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `User-Agent` sent with every request
    pub user_agent: String,
    /// Whole-request timeout enforced by the client
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum number of idle connections per host
    pub pool_max_per_host: usize,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: http::USER_AGENT.to_string(),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            tcp_nodelay: true,
        }
    }
}

impl ClientConfig {
    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the HTTP client with the specified configuration
    ///
    /// A zero request timeout leaves the client without one; deadlines then
    /// come only from the caller's `FetchContext`.
    pub fn build_http_client(&self) -> FetchResult<Client> {
        let mut client_builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str())
            .tcp_nodelay(self.tcp_nodelay)
            .pool_max_idle_per_host(self.pool_max_per_host);

        if !self.request_timeout.is_zero() {
            client_builder = client_builder.timeout(self.request_timeout);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder.build().map_err(FetchError::Client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert!(config.user_agent.starts_with("nflverse_fetcher/"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.tcp_nodelay);
    }

    #[test]
    fn test_client_config_builders() {
        let config = ClientConfig::default()
            .with_user_agent("my-agent/1.0")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.user_agent, "my-agent/1.0");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.pool_max_per_host, http::POOL_MAX_PER_HOST);
    }

    #[test]
    fn test_http_client_creation() {
        assert!(ClientConfig::default().build_http_client().is_ok());

        let no_timeout = ClientConfig::default().with_timeout(Duration::ZERO);
        assert!(no_timeout.build_http_client().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            user_agent = "toml-agent"
            request_timeout = "45s"
            "#,
        )
        .unwrap();
        assert_eq!(config.user_agent, "toml-agent");
        assert_eq!(config.request_timeout, Duration::from_secs(45));
        assert_eq!(config.connect_timeout, http::CONNECT_TIMEOUT);
    }
}
