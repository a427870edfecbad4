//! Provider for the proxy-list.download API
//!
//! The API serves a plain-text `ip:port` list per protocol via
//! `/api/v1/get?type=<protocol>`, so the protocol is queried one at a
//! time and prefixed onto every returned line.

use async_trait::async_trait;
use reqwest::Client;

use crate::proxy::models::Protocol;
use crate::proxy::providers::Provider;

const BASE_URL: &str = "https://www.proxy-list.download/api/v1/get";

pub struct ProxyListDownloadProvider {
    client: Client,
    base_url: String,
}

impl ProxyListDownloadProvider {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Provider for ProxyListDownloadProvider {
    fn name(&self) -> &str {
        "proxy-list.download"
    }

    async fn gather(&self) -> crate::Result<Vec<String>> {
        let mut raws = Vec::new();

        for protocol in Protocol::ALL {
            let response = self
                .client
                .get(&self.base_url)
                .query(&[("type", protocol.to_string())])
                .send()
                .await?
                .error_for_status()?;
            let body = response.text().await?;

            raws.extend(
                body.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(|line| format!("{}:{}", protocol, line)),
            );
        }

        Ok(raws)
    }
}
