//! Proxy discovery and validation pipeline
//!
//! This module provides the gather, filter, validate pipeline:
//! - Gathering raw candidates from public proxy-list providers
//! - Deduplicating and filtering them by protocol and anonymity
//! - Confirming liveness with concurrent network probes

pub mod aggregator;
pub mod fetcher;
pub mod filterer;
pub mod models;
pub mod providers;
pub mod validator;

pub use aggregator::aggregate;
pub use fetcher::{FetcherConfig, ProxyFetcher};
pub use filterer::filter;
pub use models::{Anonymity, Candidate, Protocol, Proxy};
pub use providers::{default_providers, Provider};
pub use validator::{Validator, ValidatorConfig};
