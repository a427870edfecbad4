//! Provider for free-proxy-list.net
//!
//! The site serves an HTML table; entries are pulled out with the
//! shared ip:port extraction instead of a full HTML parse. Everything
//! it lists is an http proxy.

use async_trait::async_trait;
use reqwest::Client;

use crate::proxy::models::Protocol;
use crate::proxy::providers::{extract_hosts, Provider};

const BASE_URL: &str = "https://free-proxy-list.net/";

pub struct FreeProxyListProvider {
    client: Client,
    base_url: String,
}

impl FreeProxyListProvider {
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
impl Provider for FreeProxyListProvider {
    fn name(&self) -> &str {
        "free-proxy-list.net"
    }

    async fn gather(&self) -> crate::Result<Vec<String>> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;

        Ok(extract_hosts(&body)
            .into_iter()
            .map(|(host, port)| format!("{}:{}:{}", Protocol::Http, host, port))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gather_extracts_from_html() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_body(
                r#"<html><body><textarea>
51.158.68.68:8811
88.198.24.108:3128
</textarea></body></html>"#,
            )
            .create_async()
            .await;

        let provider = FreeProxyListProvider::with_base_url(Client::new(), server.url());
        let raws = provider.gather().await.unwrap();

        assert_eq!(raws, vec!["http:51.158.68.68:8811", "http:88.198.24.108:3128"]);
    }

    #[tokio::test]
    async fn test_gather_empty_page_yields_no_raws() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_body("<html><body>No proxies today</body></html>")
            .create_async()
            .await;

        let provider = FreeProxyListProvider::with_base_url(Client::new(), server.url());
        let raws = provider.gather().await.unwrap();
        assert!(raws.is_empty());
    }
}
