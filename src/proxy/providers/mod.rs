//! Proxy list providers
//!
//! Each provider wraps one public proxy-list source and produces raw
//! `"<protocol>:<ip>:<port>"` strings. Providers are stateless across
//! calls. A transport failure is surfaced to the aggregator, which
//! treats it as a partial failure of that one source.

pub mod free_proxy_list;
pub mod proxy_list_download;
pub mod proxyscrape;

pub use free_proxy_list::FreeProxyListProvider;
pub use proxy_list_download::ProxyListDownloadProvider;
pub use proxyscrape::ProxyScrapeProvider;

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;

use crate::error::ParseError;
use crate::proxy::models::Candidate;

/// Default timeout for provider HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent for provider HTTP requests
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Regex pattern to match IP:PORT patterns in text
static IP_PORT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}):(\d{1,5})\b")
        .expect("Invalid IP:PORT regex")
});

/// One public proxy-list source.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short source name used in logs.
    fn name(&self) -> &str;

    /// Fetch the source and return raw `"<protocol>:<ip>:<port>"`
    /// strings.
    async fn gather(&self) -> crate::Result<Vec<String>>;

    /// Parse one raw string into a candidate.
    fn parse(&self, raw: &str) -> Result<Candidate, ParseError> {
        raw.parse()
    }
}

/// Build the HTTP client shared by the default providers.
pub(crate) fn http_client(timeout: Duration) -> crate::Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .build()?;
    Ok(client)
}

/// Extract `ip:port` pairs embedded in arbitrary text or HTML.
pub(crate) fn extract_hosts(content: &str) -> Vec<(String, u16)> {
    IP_PORT_REGEX
        .captures_iter(content)
        .filter_map(|cap| {
            let host = cap.get(1)?.as_str().to_string();
            let port: u16 = cap.get(2)?.as_str().parse().ok()?;

            // Reject octets above 255; the pattern alone allows them
            for part in host.split('.') {
                let num: u32 = part.parse().ok()?;
                if num > 255 {
                    return None;
                }
            }

            if port == 0 {
                return None;
            }

            Some((host, port))
        })
        .collect()
}

/// The default registry of free proxy-list sources.
///
/// Returned as a plain Vec so callers can inject their own set into
/// the fetcher instead.
pub fn default_providers(timeout: Option<Duration>) -> crate::Result<Vec<Box<dyn Provider>>> {
    let timeout = timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    let client = http_client(timeout)?;
    Ok(vec![
        Box::new(FreeProxyListProvider::new(client.clone())),
        Box::new(ProxyListDownloadProvider::new(client.clone())),
        Box::new(ProxyScrapeProvider::new(client)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::models::Protocol;

    #[test]
    fn test_extract_hosts_plain_lines() {
        let content = "192.168.1.1:8080\n10.0.0.1:3128\n";
        let hosts = extract_hosts(content);
        assert_eq!(hosts.len(), 2);
        assert!(hosts.contains(&("192.168.1.1".to_string(), 8080)));
    }

    #[test]
    fn test_extract_hosts_from_html() {
        let content = "<tr><td>something</td></tr> proxy at 10.0.0.1:3128 in prose";
        let hosts = extract_hosts(content);
        assert_eq!(hosts, vec![("10.0.0.1".to_string(), 3128)]);
    }

    #[test]
    fn test_extract_hosts_rejects_invalid_octets() {
        assert!(extract_hosts("999.999.999.999:8080").is_empty());
    }

    #[test]
    fn test_extract_hosts_rejects_zero_port() {
        assert!(extract_hosts("192.168.1.1:0").is_empty());
    }

    #[test]
    fn test_default_parse_impl() {
        struct Dummy;

        #[async_trait]
        impl Provider for Dummy {
            fn name(&self) -> &str {
                "dummy"
            }

            async fn gather(&self) -> crate::Result<Vec<String>> {
                Ok(vec![])
            }
        }

        let candidate = Dummy.parse("http:1.2.3.4:8080").unwrap();
        assert_eq!(candidate.protocol, Protocol::Http);
        assert!(Dummy.parse("bad-string").is_err());
    }

    #[test]
    fn test_default_providers_registry() {
        let providers = default_providers(None).unwrap();
        assert_eq!(providers.len(), 3);
    }
}
