//! Mapping raw failures onto the [`NetworkError`] taxonomy.
//!
//! Classification is done once, at the boundary of
//! [`Client::execute`](crate::Client::execute). The default rules, first match
//! wins:
//!
//! 1. Deadline exceeded → [`NetworkError::Timeout`]. Checked before I/O
//!    because the transport reports timeouts distinctly from socket failures.
//! 2. Could not connect → [`NetworkError::NoInternet`]; connection broke
//!    mid-flight → [`NetworkError::IoException`].
//! 3. 4xx/5xx status → [`NetworkError::ServerError`].
//! 4. Anything else → [`NetworkError::UnknownError`], keeping the cause.

use crate::error::GENERIC_SERVER_ERROR;
use crate::{Error, NetworkError};
use http::StatusCode;
use std::io;

/// Decides which [`NetworkError`] a failure belongs to.
///
/// Implementations must be total: every input maps to exactly one variant.
///
/// # Examples
///
/// ```
/// use netresult::{Error, ErrorClassifier, NetworkError};
///
/// struct EverythingTimesOut;
///
/// impl ErrorClassifier for EverythingTimesOut {
///     fn classify(&self, _error: Error) -> NetworkError {
///         NetworkError::Timeout
///     }
/// }
///
/// let error = EverythingTimesOut.classify(Error::Configuration("bad".into()));
/// assert!(error.is_timeout());
/// ```
pub trait ErrorClassifier: Send + Sync {
    /// Classifies `error`.
    fn classify(&self, error: Error) -> NetworkError;
}

/// The classification rules described in the module documentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorClassifier;

impl ErrorClassifier for DefaultErrorClassifier {
    fn classify(&self, error: Error) -> NetworkError {
        if is_timeout(&error) {
            return NetworkError::Timeout;
        }

        if let Some(connectivity) = connectivity(&error) {
            return connectivity;
        }

        match error {
            Error::Status {
                status,
                raw_response,
                ..
            } => NetworkError::ServerError {
                code: status.as_u16(),
                body: Some(server_message(status, raw_response)),
            },
            Error::Transport(e) if e.status().is_some() => {
                let status = e.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                NetworkError::ServerError {
                    code: status.as_u16(),
                    body: Some(server_message(status, String::new())),
                }
            }
            other => NetworkError::unknown(other),
        }
    }
}

fn is_timeout(error: &Error) -> bool {
    match error {
        Error::Timeout => true,
        Error::Transport(e) => {
            e.is_timeout() || io_error_in_chain(e).is_some_and(|io| io.kind() == io::ErrorKind::TimedOut)
        }
        Error::Io(e) => e.kind() == io::ErrorKind::TimedOut,
        _ => false,
    }
}

fn connectivity(error: &Error) -> Option<NetworkError> {
    match error {
        Error::Transport(e) if e.is_connect() => Some(NetworkError::NoInternet),
        Error::Transport(e) if e.is_request() || e.is_body() || io_error_in_chain(e).is_some() => {
            Some(NetworkError::IoException)
        }
        Error::Io(e) => Some(match e.kind() {
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable => NetworkError::NoInternet,
            _ => NetworkError::IoException,
        }),
        _ => None,
    }
}

fn io_error_in_chain<'a>(error: &'a (dyn std::error::Error + 'static)) -> Option<&'a io::Error> {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(io) = err.downcast_ref::<io::Error>() {
            return Some(io);
        }
        current = err.source();
    }
    None
}

fn server_message(status: StatusCode, raw_response: String) -> String {
    if raw_response.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or(GENERIC_SERVER_ERROR)
            .to_string()
    } else {
        raw_response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeError;
    use http::HeaderMap;

    fn classify(error: Error) -> NetworkError {
        DefaultErrorClassifier.classify(error)
    }

    fn status(code: u16, body: &str) -> Error {
        Error::Status {
            status: StatusCode::from_u16(code).unwrap(),
            raw_response: body.to_string(),
            headers: HeaderMap::new(),
        }
    }

    #[test]
    fn test_timeout_variants() {
        assert!(matches!(classify(Error::Timeout), NetworkError::Timeout));
        assert!(matches!(
            classify(Error::Io(io::Error::new(io::ErrorKind::TimedOut, "slow"))),
            NetworkError::Timeout
        ));
    }

    #[test]
    fn test_io_variants() {
        assert!(matches!(
            classify(Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "refused"
            ))),
            NetworkError::NoInternet
        ));
        assert!(matches!(
            classify(Error::Io(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"))),
            NetworkError::IoException
        ));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("wrapped")]
    struct Wrapped(#[source] io::Error);

    #[test]
    fn test_io_error_found_in_source_chain() {
        let wrapped = Wrapped(io::Error::new(io::ErrorKind::TimedOut, "deep"));
        let found = io_error_in_chain(&wrapped).map(io::Error::kind);
        assert_eq!(found, Some(io::ErrorKind::TimedOut));

        let plain = DecodeError::EmptyBody;
        assert!(io_error_in_chain(&plain).is_none());
    }

    #[test]
    fn test_status_keeps_server_text() {
        match classify(status(400, "name is required")) {
            NetworkError::ServerError { code, body } => {
                assert_eq!(code, 400);
                assert_eq!(body.as_deref(), Some("name is required"));
            }
            other => panic!("Expected ServerError, got {:?}", other),
        }
    }

    #[test]
    fn test_status_without_body_gets_label() {
        match classify(status(503, "  ")) {
            NetworkError::ServerError { code, body } => {
                assert_eq!(code, 503);
                assert_eq!(body.as_deref(), Some("Service Unavailable"));
            }
            other => panic!("Expected ServerError, got {:?}", other),
        }

        match classify(status(599, "")) {
            NetworkError::ServerError { body, .. } => {
                assert_eq!(body.as_deref(), Some("Server Error"));
            }
            other => panic!("Expected ServerError, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_keeps_cause() {
        match classify(Error::Decode(DecodeError::EmptyBody)) {
            NetworkError::UnknownError { cause } => {
                assert_eq!(cause.to_string(), "Empty response body");
            }
            other => panic!("Expected UnknownError, got {:?}", other),
        }

        assert!(matches!(
            classify(Error::Configuration("missing url".into())),
            NetworkError::UnknownError { .. }
        ));
    }

    #[test]
    fn test_classification_is_deterministic() {
        for _ in 0..3 {
            assert!(matches!(classify(Error::Timeout), NetworkError::Timeout));
            assert_eq!(classify(status(502, "")).status_code(), Some(502));
        }
    }
}
