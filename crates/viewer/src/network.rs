use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

#[async_trait]
pub trait NetworkProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Online when the API host resolves within `timeout`.
pub struct DnsProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl DnsProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Probes the host of `api_base`; `None` when it has no host.
    pub fn for_base(api_base: &str, timeout: Duration) -> Option<Self> {
        let url = Url::parse(api_base).ok()?;
        let host = url.host_str()?.to_string();
        let port = url.port_or_known_default().unwrap_or(443);
        Some(Self::new(host, port, timeout))
    }
}

#[async_trait]
impl NetworkProbe for DnsProbe {
    async fn is_online(&self) -> bool {
        let target = format!("{}:{}", self.host, self.port);
        match tokio::time::timeout(self.timeout, tokio::net::lookup_host(target)).await {
            Ok(Ok(mut addrs)) => addrs.next().is_some(),
            Ok(Err(err)) => {
                debug!(host = %self.host, error = %err, "dns lookup failed");
                false
            }
            Err(_) => {
                debug!(host = %self.host, "dns lookup timed out");
                false
            }
        }
    }
}

pub struct AssumeOnline;

#[async_trait]
impl NetworkProbe for AssumeOnline {
    async fn is_online(&self) -> bool {
        true
    }
}
