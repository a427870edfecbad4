//! Proxy data models

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Proxy protocol enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Protocol {
    #[default]
    Http,
    Https,
    Socks4,
    Socks5,
}

impl Protocol {
    /// All supported protocols, in the order sources usually list them.
    pub const ALL: [Protocol; 4] = [
        Protocol::Http,
        Protocol::Https,
        Protocol::Socks4,
        Protocol::Socks5,
    ];
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
            Protocol::Socks4 => write!(f, "socks4"),
            Protocol::Socks5 => write!(f, "socks5"),
        }
    }
}

impl FromStr for Protocol {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            "socks4" => Ok(Protocol::Socks4),
            "socks5" => Ok(Protocol::Socks5),
            _ => Err(ParseError::UnknownProtocol(s.to_string())),
        }
    }
}

/// Anonymity level of a proxy, determined by what identifying
/// information it forwards to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anonymity {
    /// The original client IP is exposed to the target.
    Transparent,
    /// Proxy headers are present but the client IP is hidden.
    Anonymous,
    /// No trace of proxying is observable.
    Elite,
}

impl fmt::Display for Anonymity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anonymity::Transparent => write!(f, "transparent"),
            Anonymity::Anonymous => write!(f, "anonymous"),
            Anonymity::Elite => write!(f, "elite"),
        }
    }
}

impl FromStr for Anonymity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "transparent" => Ok(Anonymity::Transparent),
            "anonymous" => Ok(Anonymity::Anonymous),
            "elite" => Ok(Anonymity::Elite),
            _ => Err(ParseError::UnknownAnonymity(s.to_string())),
        }
    }
}

/// An unvalidated proxy candidate parsed from a provider's raw output.
///
/// Candidates only live for the duration of a pipeline run; they are
/// consumed by the filterer and the validator. Equality and hashing are
/// defined on the (protocol, host, port) triple so a
/// `HashSet<Candidate>` deduplicates across providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    /// Anonymity reported by the source, if any. Unknown until probed
    /// otherwise.
    pub anonymity: Option<Anonymity>,
}

impl Candidate {
    pub fn new(protocol: Protocol, host: impl Into<String>, port: u16) -> Self {
        Self {
            protocol,
            host: host.into(),
            port,
            anonymity: None,
        }
    }

    pub fn with_anonymity(mut self, anonymity: Anonymity) -> Self {
        self.anonymity = Some(anonymity);
        self
    }

    /// Get the candidate URL string, e.g. `socks5://1.2.3.4:1080`
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.protocol == other.protocol && self.host == other.host && self.port == other.port
    }
}

impl Eq for Candidate {}

impl Hash for Candidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.protocol.hash(state);
        self.host.hash(state);
        self.port.hash(state);
    }
}

impl FromStr for Candidate {
    type Err = ParseError;

    /// Parse a raw `"<protocol>:<ip>:<port>"` provider string.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let mut parts = raw.splitn(3, ':');
        let (protocol, host, port) = match (parts.next(), parts.next(), parts.next()) {
            (Some(protocol), Some(host), Some(port)) => (protocol, host, port),
            _ => return Err(ParseError::BadFieldCount(raw.to_string())),
        };

        if host.is_empty() {
            return Err(ParseError::BadFieldCount(raw.to_string()));
        }

        let port: u16 = port
            .parse()
            .map_err(|_| ParseError::BadPort(port.to_string()))?;

        Ok(Candidate::new(protocol.parse()?, host, port))
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

/// A validated proxy that passed a live network probe.
///
/// Only the validator constructs these. Equality and hashing follow the
/// same (protocol, host, port) identity as [`Candidate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proxy {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    pub anonymity: Anonymity,
    /// Round-trip time of the probe that confirmed this proxy.
    pub latency: Duration,
}

impl Proxy {
    pub fn new(candidate: Candidate, anonymity: Anonymity, latency: Duration) -> Self {
        Self {
            protocol: candidate.protocol,
            host: candidate.host,
            port: candidate.port,
            anonymity,
            latency,
        }
    }

    /// Get the proxy URL string, e.g. `http://1.2.3.4:8080`
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    /// Get the proxy string in the raw PROTOCOL:IP:PORT format
    pub fn to_raw_string(&self) -> String {
        format!("{}:{}:{}", self.protocol, self.host, self.port)
    }
}

impl PartialEq for Proxy {
    fn eq(&self, other: &Self) -> bool {
        self.protocol == other.protocol && self.host == other.host && self.port == other.port
    }
}

impl Eq for Proxy {}

impl Hash for Proxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.protocol.hash(state);
        self.host.hash(state);
        self.port.hash(state);
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}
