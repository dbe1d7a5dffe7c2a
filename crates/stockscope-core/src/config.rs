//! Client configuration for the market service.

/// Connection settings for [`crate::HttpMarketApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service origin without a trailing slash, e.g. `http://localhost:5000`.
    pub base_url: String,
    /// Per-request timeout budget in milliseconds.
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(Self::DEFAULT_BASE_URL),
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            user_agent: format!("stockscope/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:5000";
    /// Must cover the service's own upstream retries (three attempts, 2s apart).
    pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Absolute URL for a path beginning with `/`.
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ClientConfig::new("http://api.test:5000/");
        assert_eq!(config.url("/api/plot"), "http://api.test:5000/api/plot");
    }

    #[test]
    fn defaults_point_at_local_service() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.timeout_ms, 15_000);
        assert!(config.user_agent.starts_with("stockscope/"));
    }
}
