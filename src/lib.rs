//! Proxy Fetch - Proxy Discovery and Validation
//!
//! Discovers publicly listed proxies from multiple free sources,
//! deduplicates and filters them, and validates their liveness with
//! concurrent network probes. Callers get back a bounded set of
//! working proxies or one of two errors: no connectivity, or nothing
//! found.

pub mod error;
pub mod proxy;

pub use error::{FetchError, ParseError};
pub use proxy::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
