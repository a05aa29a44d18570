//! Error types for the Workplace Search client.
//!
//! # Design
//! Callers need to tell "the upstream never gave us a usable body" apart from
//! "the upstream answered with something we refuse to parse". The first lands
//! in `Transport` with whatever status, headers, and body were available; the
//! second lands in `Deserialization` with the parser message and the raw text.
//! `Configuration` covers mistakes caught before any I/O happens.

use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors returned by the transport core and the endpoint facade.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A required parameter was omitted, or the client was configured with
    /// an unusable base URL. No request was sent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The round trip did not produce a usable body.
    #[error("{0}")]
    Transport(TransportError),

    /// A body was received but could not be safely parsed as JSON.
    #[error("deserialization failed: {message}")]
    Deserialization { message: String, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ClientError {
    pub(crate) fn missing_parameter(name: &str) -> Self {
        ClientError::Configuration(format!("missing required parameter \"{name}\""))
    }

    /// HTTP status attached to a transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Transport(err) => err.status,
            _ => None,
        }
    }
}

/// Details of a failed HTTP round trip.
///
/// `status` is `None` when no response arrived at all (connection refused,
/// TLS failure, body read interrupted before headers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub reason: String,
}

impl TransportError {
    /// Look up a response header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status}: {}", self.reason),
            None => write!(f, "request failed: {}", self.reason),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(TransportError {
            status: err.status().map(|s| s.as_u16()),
            headers: Vec::new(),
            body: String::new(),
            reason: err.to_string(),
        })
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Configuration(format!("invalid base URL: {err}"))
    }
}
