use crate::domain::ports::HealthProbe;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Plain GET reachability check. Any HTTP response counts, body is ignored.
#[derive(Debug, Clone, Default)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<u16> {
        tracing::debug!("Probing {}", url);
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        tracing::debug!("Probe response status: {}", status);
        Ok(status.as_u16())
    }
}
