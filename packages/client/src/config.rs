//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::ClientError;

/// Where the proxy listens and how long to wait for it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the proxy's HTTP API, e.g. `http://127.0.0.1:3500/`.
    pub base_url: Url,

    /// Per-call timeout applied to every outbound request.
    pub timeout: Duration,

    /// Pub/sub component to publish through. When unset, topics are
    /// published on the proxy's default component.
    pub pubsub_name: Option<String>,
}

impl ClientConfig {
    pub const DEFAULT_HTTP_PORT: u16 = 3500;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            timeout: Self::DEFAULT_TIMEOUT,
            pubsub_name: None,
        })
    }

    /// Proxy on `host:port` over plain HTTP.
    pub fn from_host_port(host: &str, port: u16) -> Result<Self, ClientError> {
        Self::new(&format!("http://{}:{}/", host, port))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_pubsub(mut self, name: impl Into<String>) -> Self {
        self.pubsub_name = Some(name.into());
        self
    }
}
