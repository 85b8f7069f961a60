use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::PageSource;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Plain HTTP GET page source
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Option<String> {
        debug!("GET {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request for {} failed. Error: {}", url, e);
                return None;
            }
        };

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            warn!("Request for {} failed. Status: {}", url, status);
            return None;
        }

        match response.text().await {
            Ok(body) => {
                debug!("Downloaded {} bytes of HTML", body.len());
                Some(body)
            }
            Err(e) => {
                warn!("Failed to read response body from {}: {}", url, e);
                None
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "HTTP"
    }
}
