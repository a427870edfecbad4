//! Proxy validation through concurrent network probes
//!
//! Each candidate is probed by routing a request through it to a judge
//! endpoint that echoes what it received. A successful round trip
//! confirms liveness; the echoed content decides the anonymity class.
//! Dead candidates are dropped silently. When a limit is set, the
//! probe stream is dropped as soon as enough proxies are confirmed,
//! which cancels every in-flight probe and closes its connection.

use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Proxy as ReqwestProxy};
use tracing::debug;

use crate::proxy::models::{Anonymity, Candidate, Protocol, Proxy};

/// Default timeout for each probe in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of concurrent probes
const DEFAULT_CONCURRENCY: usize = 50;

/// Default judge endpoint that echoes request headers back
const DEFAULT_JUDGE_URL: &str = "http://httpbin.org/get";

/// Default endpoint that returns the caller's external IP as plain text
const DEFAULT_IP_ECHO_URL: &str = "http://api.ipify.org";

static IP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("Invalid IP regex"));

/// Header names a proxy leaves behind in the echoed request when it is
/// not elite.
const PROXY_MARKERS: [&str; 3] = ["via", "forwarded", "proxy"];

/// Configuration for the validator
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Timeout for each probe
    pub timeout: Duration,
    /// Number of concurrent probes
    pub concurrency: usize,
    /// Judge URL requested through each candidate
    pub judge_url: String,
    /// URL used to learn the client's own external IP
    pub ip_echo_url: String,
    /// Pre-resolved external IP; skips the lookup when set
    pub real_ip: Option<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            judge_url: DEFAULT_JUDGE_URL.to_string(),
            ip_echo_url: DEFAULT_IP_ECHO_URL.to_string(),
            real_ip: None,
        }
    }
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_judge_url(mut self, url: impl Into<String>) -> Self {
        self.judge_url = url.into();
        self
    }

    pub fn with_ip_echo_url(mut self, url: impl Into<String>) -> Self {
        self.ip_echo_url = url.into();
        self
    }

    pub fn with_real_ip(mut self, ip: impl Into<String>) -> Self {
        self.real_ip = Some(ip.into());
        self
    }
}

/// Validator confirming candidate liveness and measuring anonymity
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Probe every candidate and collect the ones that pass.
    ///
    /// With `limit == 0` every probe runs to completion and all
    /// confirmed proxies are returned. With `limit > 0` the first
    /// `limit` proxies in completion order are returned and the
    /// remaining in-flight probes are cancelled.
    pub async fn validate(&self, candidates: Vec<Candidate>, limit: usize) -> Vec<Proxy> {
        if candidates.is_empty() {
            return Vec::new();
        }
        debug!(
            "validating {} candidates ({} concurrent probes, limit {})",
            candidates.len(),
            self.config.concurrency,
            limit
        );

        let real_ip = match &self.config.real_ip {
            Some(ip) => Some(ip.clone()),
            None => self.lookup_real_ip().await,
        };

        let confirmed = stream::iter(candidates)
            .map(|candidate| {
                let real_ip = real_ip.clone();
                async move { self.probe(candidate, real_ip.as_deref()).await }
            })
            .buffer_unordered(self.config.concurrency)
            .filter_map(|outcome| async move { outcome });

        // Dropping the stream once `limit` proxies are taken drops the
        // in-flight probe futures along with their connections.
        let proxies: Vec<Proxy> = if limit > 0 {
            confirmed.take(limit).collect().await
        } else {
            confirmed.collect().await
        };

        debug!("{} proxies confirmed", proxies.len());
        proxies
    }

    /// Probe one candidate. Any failure drops the candidate; a dead
    /// proxy is an expected outcome, not an error.
    async fn probe(&self, candidate: Candidate, real_ip: Option<&str>) -> Option<Proxy> {
        let client = match self.proxied_client(&candidate) {
            Ok(client) => client,
            Err(err) => {
                debug!(candidate = %candidate, error = %err, "could not build probe client");
                return None;
            }
        };

        let start = Instant::now();
        let response = match tokio::time::timeout(
            self.config.timeout,
            client.get(&self.config.judge_url).send(),
        )
        .await
        {
            Ok(Ok(response)) if response.status().is_success() => response,
            Ok(Ok(response)) => {
                debug!(candidate = %candidate, status = %response.status(), "probe rejected");
                return None;
            }
            Ok(Err(err)) => {
                debug!(candidate = %candidate, error = %err, "probe failed");
                return None;
            }
            Err(_) => {
                debug!(candidate = %candidate, "probe timed out");
                return None;
            }
        };
        let latency = start.elapsed();

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                debug!(candidate = %candidate, error = %err, "probe body unreadable");
                return None;
            }
        };

        let anonymity = classify(&body, real_ip);
        debug!(candidate = %candidate, %anonymity, latency_ms = latency.as_millis() as u64, "proxy confirmed");
        Some(Proxy::new(candidate, anonymity, latency))
    }

    /// Create a client that routes every request through the candidate
    fn proxied_client(&self, candidate: &Candidate) -> crate::Result<Client> {
        let proxy_url = candidate.url();

        let proxy = match candidate.protocol {
            Protocol::Http | Protocol::Https => ReqwestProxy::http(&proxy_url)?,
            Protocol::Socks4 | Protocol::Socks5 => ReqwestProxy::all(&proxy_url)?,
        };

        let client = Client::builder()
            .proxy(proxy)
            .timeout(self.config.timeout)
            .build()?;

        Ok(client)
    }

    /// Learn this client's external IP with a direct, unproxied
    /// request. Without it transparent proxies cannot be told apart
    /// from anonymous ones, so a lookup failure degrades rather than
    /// aborts.
    async fn lookup_real_ip(&self) -> Option<String> {
        let client = Client::builder().timeout(self.config.timeout).build().ok()?;
        let body = client
            .get(&self.config.ip_echo_url)
            .send()
            .await
            .ok()?
            .text()
            .await
            .ok()?;
        let ip = body.trim();
        if IP_REGEX.is_match(ip) {
            Some(ip.to_string())
        } else {
            debug!(body = ip, "ip echo endpoint returned no address");
            None
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify the anonymity of a proxy from the judge's echo of the
/// request that went through it.
///
/// The real client IP appearing anywhere in the echo means the proxy
/// exposes its users (transparent). Proxy-added headers without the
/// real IP mean the origin is hidden but the proxying is visible
/// (anonymous). A clean echo means elite.
fn classify(body: &str, real_ip: Option<&str>) -> Anonymity {
    let content = body.to_lowercase();

    if let Some(real_ip) = real_ip {
        if IP_REGEX
            .find_iter(&content)
            .any(|found| found.as_str() == real_ip)
        {
            return Anonymity::Transparent;
        }
    }

    if PROXY_MARKERS.iter().any(|marker| content.contains(marker)) {
        return Anonymity::Anonymous;
    }

    Anonymity::Elite
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Judge echo with no proxy traces and no client IP.
    pub(crate) const ELITE_BODY: &str = r#"{"headers": {"Host": "judge.invalid", "Accept": "*/*"}}"#;

    /// Judge echo carrying a Via header but no client IP.
    pub(crate) const ANONYMOUS_BODY: &str =
        r#"{"headers": {"Host": "judge.invalid", "Via": "1.1 squid"}}"#;

    /// The external IP injected into validators under test.
    pub(crate) const REAL_IP: &str = "203.0.113.9";

    /// Judge echo exposing the client IP.
    pub(crate) const TRANSPARENT_BODY: &str =
        r#"{"headers": {"Host": "judge.invalid", "X-Forwarded-For": "203.0.113.9"}}"#;

    /// Spawn a fake HTTP proxy that answers any request with a canned
    /// 200 response after `delay`. The probe never reaches a real
    /// judge; the fake proxy plays both roles.
    pub(crate) async fn spawn_fake_proxy(body: &'static str, delay: Duration) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut buf = [0u8; 4096];
                    loop {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => {
                                head.extend_from_slice(&buf[..n]);
                                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                                    break;
                                }
                            }
                        }
                    }
                    tokio::time::sleep(delay).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        addr
    }

    /// Spawn a fake proxy that accepts connections and never responds.
    /// `closed` is incremented when a client hangs up, which is how
    /// tests observe that a cancelled probe released its socket.
    pub(crate) async fn spawn_stuck_proxy(closed: Arc<AtomicUsize>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let closed = closed.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    loop {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => break,
                            Ok(_) => {}
                        }
                    }
                    closed.fetch_add(1, Ordering::SeqCst);
                });
            }
        });
        addr
    }
}
