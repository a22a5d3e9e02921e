//! Connection settings for the provider API

use std::time::Duration;

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "PROVIDER_API_URL";

/// Base URL used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Settings shared by every API client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL all endpoint paths are appended to, without trailing slash
    pub api_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
