//! The seam between the executor and the network.
//!
//! A [`Transport`] receives a fully built `reqwest::Request` and returns the
//! response. Non-2xx answers come back as ordinary responses; the client's
//! [`StatusPolicy`](crate::StatusPolicy) decides what they mean.

use crate::Result;
use async_trait::async_trait;

/// Sends one request and returns its response.
///
/// Implement this to put middleware in front of the network, or to inject
/// faults in tests.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use netresult::{Error, Transport};
///
/// struct Offline;
///
/// #[async_trait]
/// impl Transport for Offline {
///     async fn send(&self, _request: reqwest::Request) -> netresult::Result<reqwest::Response> {
///         Err(Error::Io(std::io::Error::new(
///             std::io::ErrorKind::ConnectionRefused,
///             "offline",
///         )))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the response, whatever its status.
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response>;
}

/// The default transport, backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default `reqwest::Client`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport around an existing `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        Ok(self.client.execute(request).await?)
    }
}
