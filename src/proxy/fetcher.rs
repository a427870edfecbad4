//! Pipeline orchestration behind the public two-method contract
//!
//! The fetcher wires aggregation, filtering and validation together.
//! It owns the provider registry and the validator for its lifetime,
//! checks outbound connectivity once at construction, and turns an
//! empty validation result into the caller-visible "no proxies found"
//! error.

use std::time::Duration;

use tracing::debug;

use crate::error::FetchError;
use crate::proxy::aggregator::aggregate;
use crate::proxy::filterer::filter;
use crate::proxy::models::{Anonymity, Protocol, Proxy};
use crate::proxy::providers::{default_providers, Provider};
use crate::proxy::validator::{Validator, ValidatorConfig};

/// Address dialed to verify outbound connectivity (a public DNS
/// resolver; any reachable endpoint works).
const DEFAULT_CONNECTIVITY_PROBE: &str = "1.1.1.1:53";

const DEFAULT_CONNECTIVITY_TIMEOUT_SECS: u64 = 3;

/// Configuration for the fetcher and the pipeline it runs
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Validation-phase settings (probe timeout, concurrency, judge)
    pub validator: ValidatorConfig,
    /// Address dialed once at construction to confirm connectivity
    pub connectivity_probe: String,
    /// How long the connectivity dial may take
    pub connectivity_timeout: Duration,
    /// Timeout for provider list downloads; providers default their
    /// own when unset
    pub provider_timeout: Option<Duration>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            validator: ValidatorConfig::default(),
            connectivity_probe: DEFAULT_CONNECTIVITY_PROBE.to_string(),
            connectivity_timeout: Duration::from_secs(DEFAULT_CONNECTIVITY_TIMEOUT_SECS),
            provider_timeout: None,
        }
    }
}

impl FetcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(mut self, validator: ValidatorConfig) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_connectivity_probe(mut self, addr: impl Into<String>) -> Self {
        self.connectivity_probe = addr.into();
        self
    }

    pub fn with_connectivity_timeout(mut self, timeout: Duration) -> Self {
        self.connectivity_timeout = timeout;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = Some(timeout);
        self
    }
}

/// Fetches working proxies by running the gather, filter, validate
/// pipeline.
pub struct ProxyFetcher {
    providers: Vec<Box<dyn Provider>>,
    validator: Validator,
}

impl ProxyFetcher {
    /// Create a fetcher over the default provider registry.
    ///
    /// Fails fast with [`FetchError::NoConnectivity`] when no outbound
    /// connection can be made; nothing is retried.
    pub async fn new(config: FetcherConfig) -> crate::Result<Self> {
        let providers = default_providers(config.provider_timeout)?;
        Self::with_providers(config, providers).await
    }

    /// Create a fetcher over an explicit provider set.
    pub async fn with_providers(
        config: FetcherConfig,
        providers: Vec<Box<dyn Provider>>,
    ) -> crate::Result<Self> {
        if !has_connectivity(&config.connectivity_probe, config.connectivity_timeout).await {
            return Err(FetchError::NoConnectivity.into());
        }

        Ok(Self {
            providers,
            validator: Validator::with_config(config.validator),
        })
    }

    /// Get a single working proxy matching the allow-lists.
    pub async fn get_one(
        &self,
        protocols: &[Protocol],
        anonymities: &[Anonymity],
    ) -> Result<Proxy, FetchError> {
        self.get(protocols, anonymities, 1)
            .await?
            .pop()
            .ok_or(FetchError::NoProxiesFound)
    }

    /// Get up to `limit` working proxies matching the allow-lists.
    ///
    /// A limit of 0 returns every proxy that passes validation. The
    /// result is never empty; finding nothing is reported as
    /// [`FetchError::NoProxiesFound`].
    pub async fn get(
        &self,
        protocols: &[Protocol],
        anonymities: &[Anonymity],
        limit: usize,
    ) -> Result<Vec<Proxy>, FetchError> {
        let candidates = aggregate(&self.providers).await;
        let filtered = filter(candidates, protocols, anonymities);
        debug!("{} candidates after filtering", filtered.len());

        let proxies = self
            .validator
            .validate(filtered.into_iter().collect(), limit)
            .await;

        if proxies.is_empty() {
            return Err(FetchError::NoProxiesFound);
        }
        Ok(proxies)
    }
}

/// Dial `addr` once to confirm outbound connectivity.
async fn has_connectivity(addr: &str, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, tokio::net::TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}
