//! Configuration for the remote client.

use std::time::Duration;

/// Configuration for talking to the feed API.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the API server (e.g., "https://feed.example.com").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent sent with each request.
    pub user_agent: String,
}

impl RemoteConfig {
    /// Creates a configuration for the given server.
    ///
    /// A trailing slash on `base_url` is dropped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            user_agent: format!("feedsync/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::new("")
    }
}
