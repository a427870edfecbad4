//! Error taxonomy for the fetch pipeline
//!
//! Only two failures ever reach a caller: no outbound connectivity at
//! construction time, and an empty working set after validation. Every
//! per-item failure (malformed raw string, provider transport error,
//! dead proxy) is absorbed inside the pipeline and logged.

use thiserror::Error;

/// Caller-visible failures of the fetch pipeline.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No outbound connectivity; checked once at construction and never
    /// retried.
    #[error("no outbound internet connectivity")]
    NoConnectivity,

    /// The pipeline completed but no candidate survived validation.
    #[error("no working proxies found")]
    NoProxiesFound,
}

/// Failure to parse a raw provider string into a candidate.
///
/// Always absorbed by the aggregator; never crosses a component
/// boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected <protocol>:<ip>:<port>, got {0:?}")]
    BadFieldCount(String),

    #[error("invalid port {0:?}")]
    BadPort(String),

    #[error("unknown protocol {0:?}")]
    UnknownProtocol(String),

    #[error("unknown anonymity level {0:?}")]
    UnknownAnonymity(String),
}
