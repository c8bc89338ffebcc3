use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, Url, header};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct AssetClient {
    client: Client,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl AssetClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&config.user_agent)
                .context("invalid user agent header value")?,
        );

        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self { client })
    }

    /// Wraps a preconfigured client, e.g. one routed through a proxy.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.get(url).await?;
        Ok(response.text().await?)
    }

    pub async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self.get(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(FetchError::Status(status))
        }
    }
}
