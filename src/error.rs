//! Error types.
//!
//! Two layers live here. [`Error`] is the raw failure raised anywhere while a
//! call is being built, sent, or decoded; it is also what builder methods
//! return. [`NetworkError`] is the closed taxonomy a caller sees inside
//! [`NetworkResult::Error`](crate::NetworkResult::Error) after an
//! [`ErrorClassifier`](crate::ErrorClassifier) has looked at the raw failure.

use crate::codec::DecodeError;
use http::{HeaderMap, StatusCode};
use std::sync::Arc;

/// A failure raised while building, dispatching, or decoding a request.
///
/// Callers of [`Client::execute`](crate::Client::execute) never see this type
/// directly; it is classified into a [`NetworkError`] first. It is returned
/// as-is from configuration methods such as
/// [`ClientBuilder::build`](crate::ClientBuilder::build).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The transport failed (connection refused, DNS failure, timeout, etc.).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A plain I/O failure, typically raised by a custom
    /// [`Transport`](crate::Transport).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The call exceeded its deadline.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a 4xx or 5xx status.
    ///
    /// Only produced under [`StatusPolicy::StatusFirst`](crate::StatusPolicy::StatusFirst).
    #[error("HTTP error {status}: {raw_response}")]
    Status {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// The response body could not be decoded into the target type.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The request body could not be serialized.
    #[error("Failed to serialize request: {0}")]
    Serialization(String),

    /// Invalid configuration, such as a bad header or a missing URL.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A spawned call or a registered decoder panicked, or the runtime shut
    /// down.
    #[error("Request task failed: {0}")]
    TaskFailed(String),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The classified reason a call did not produce a value.
///
/// The set is closed: new failure kinds are added as variants, and callers
/// are expected to match on it exhaustively.
///
/// # Examples
///
/// ```
/// use netresult::NetworkError;
///
/// let error = NetworkError::ServerError {
///     code: 404,
///     body: Some("Not Found".to_string()),
/// };
///
/// assert_eq!(error.status_code(), Some(404));
/// assert!(!error.is_connectivity());
/// ```
#[derive(thiserror::Error, Debug, Clone)]
pub enum NetworkError {
    /// The call hit its deadline before an answer arrived.
    #[error("Request timed out")]
    Timeout,

    /// The server could not be reached at all (connect or DNS failure).
    #[error("No internet connection")]
    NoInternet,

    /// The connection broke while the request or response was in flight.
    #[error("I/O failure while talking to the server")]
    IoException,

    /// The server rejected the request with a 4xx or 5xx status.
    #[error("Server error {code}: {}", .body.as_deref().unwrap_or(GENERIC_SERVER_ERROR))]
    ServerError {
        /// The numeric HTTP status.
        code: u16,
        /// The server-supplied message, or a generic label when it sent none.
        body: Option<String>,
    },

    /// Anything else. The original failure is kept for diagnostics.
    #[error("Unknown error: {cause}")]
    UnknownError {
        /// The failure that could not be classified more precisely.
        #[source]
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },
}

pub(crate) const GENERIC_SERVER_ERROR: &str = "Server Error";

impl NetworkError {
    /// Wraps an arbitrary error as [`NetworkError::UnknownError`].
    pub fn unknown(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        NetworkError::UnknownError {
            cause: Arc::new(cause),
        }
    }

    /// Returns the HTTP status code for [`NetworkError::ServerError`].
    pub fn status_code(&self) -> Option<u16> {
        match self {
            NetworkError::ServerError { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns `true` for failures where the server was never reached or the
    /// connection dropped.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, NetworkError::NoInternet | NetworkError::IoException)
    }

    /// Returns `true` for [`NetworkError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, NetworkError::Timeout)
    }
}
