//! Error types for call provider operations.

use std::fmt;

/// Provider-agnostic error returned by every telephony and analysis provider.
///
/// Implementations map their native errors (HTTP client errors, unexpected status
/// codes, malformed bodies) onto these variants.
#[derive(Debug)]
pub enum Error {
    /// Connection failures, DNS errors and timeouts. Usually transient.
    Network(String),

    /// Missing or malformed provider configuration (base URL, secrets).
    Configuration(String),

    /// The provider answered but refused the request, e.g. an invalid number.
    Provider(String),

    /// The referenced call session does not exist on the provider side.
    NotFound(String),

    /// The provider response could not be decoded.
    Deserialization(String),

    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Deserialization(err.to_string())
    }
}
