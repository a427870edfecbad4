//! Candidate aggregation across providers
//!
//! All providers are queried concurrently and their output is merged
//! into one deduplicated set. A provider that fails outright, or a raw
//! string that fails to parse, reduces the output instead of aborting
//! the batch; an empty merged set is only treated as a failure later,
//! by the fetcher.

use std::collections::HashSet;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::proxy::models::Candidate;
use crate::proxy::providers::Provider;

/// Gather raw strings from every provider concurrently and merge them
/// into a deduplicated candidate set.
pub async fn aggregate(providers: &[Box<dyn Provider>]) -> HashSet<Candidate> {
    debug!("gathering candidates from {} providers", providers.len());

    // One in-flight gather per provider; provider count is small.
    let gathers = providers
        .iter()
        .map(|provider| async move { (provider.as_ref(), provider.gather().await) });

    let mut candidates: HashSet<Candidate> = HashSet::new();
    for (provider, outcome) in join_all(gathers).await {
        let raws = match outcome {
            Ok(raws) => raws,
            Err(err) => {
                warn!(
                    provider = provider.name(),
                    error = %err,
                    "provider gather failed, skipping its contribution"
                );
                continue;
            }
        };

        let total = raws.len();
        let mut added = 0;
        for raw in raws {
            match provider.parse(&raw) {
                Ok(candidate) => {
                    if candidates.insert(candidate) {
                        added += 1;
                    }
                }
                Err(err) => {
                    debug!(provider = provider.name(), raw = %raw, error = %err, "dropping unparsable raw");
                }
            }
        }
        debug!(
            "{} of {} candidates added from {}",
            added,
            total,
            provider.name()
        );
    }

    debug!("aggregated {} unique candidates", candidates.len());
    candidates
}

#[cfg(test)]
pub(crate) mod test_support {
    use anyhow::anyhow;
    use async_trait::async_trait;

    use crate::proxy::providers::Provider;

    /// Provider test double serving a fixed list of raw strings.
    pub(crate) struct StaticProvider {
        pub name: &'static str,
        pub raws: Vec<String>,
    }

    impl StaticProvider {
        pub(crate) fn new(name: &'static str, raws: &[&str]) -> Self {
            Self {
                name,
                raws: raws.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl Provider for StaticProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn gather(&self) -> crate::Result<Vec<String>> {
            Ok(self.raws.clone())
        }
    }

    /// Provider test double whose gather always fails with a transport
    /// error.
    pub(crate) struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn gather(&self) -> crate::Result<Vec<String>> {
            Err(anyhow!("connection reset by peer"))
        }
    }
}
