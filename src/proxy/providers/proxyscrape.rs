//! Provider for the proxyscrape.com API

use async_trait::async_trait;
use reqwest::Client;

use crate::proxy::models::Protocol;
use crate::proxy::providers::Provider;

const BASE_URL: &str = "https://api.proxyscrape.com/";

// The v1 API has no separate https type; https proxies come back under
// the http list.
const PROTOCOLS: [Protocol; 3] = [Protocol::Http, Protocol::Socks4, Protocol::Socks5];

pub struct ProxyScrapeProvider {
    client: Client,
    base_url: String,
}

impl ProxyScrapeProvider {
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
impl Provider for ProxyScrapeProvider {
    fn name(&self) -> &str {
        "proxyscrape.com"
    }

    async fn gather(&self) -> crate::Result<Vec<String>> {
        let mut raws = Vec::new();

        for protocol in PROTOCOLS {
            let response = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("request", "getproxies".to_string()),
                    ("proxytype", protocol.to_string()),
                ])
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
