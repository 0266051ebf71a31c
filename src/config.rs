//! Declarative client configuration.
//!
//! [`ClientConfig`] carries everything [`ClientBuilder`](crate::ClientBuilder)
//! can be told without code: base URL, default headers, timeout, codec
//! options and the status policy. It deserializes from JSON with every field
//! optional.

use crate::{CodecConfig, Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// How a non-2xx response is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// A 4xx or 5xx status becomes a
    /// [`NetworkError::ServerError`](crate::NetworkError::ServerError)
    /// without looking at the body. 1xx and 3xx responses are decoded.
    #[default]
    StatusFirst,

    /// The body is decoded whatever the status. A 400 carrying a well-formed
    /// payload yields `Success`.
    DecodeRegardless,
}

/// Serializable client settings.
///
/// # Examples
///
/// ```
/// use netresult::{ClientConfig, StatusPolicy};
///
/// let config = ClientConfig::from_json(r#"{
///     "base_url": "https://api.example.com",
///     "default_headers": { "User-Agent": "my-app/1.0" },
///     "timeout_ms": 5000,
///     "codec": { "ignore_unknown_fields": false },
///     "status_policy": "decode_regardless"
/// }"#).unwrap();
///
/// assert_eq!(config.status_policy, StatusPolicy::DecodeRegardless);
/// assert!(!config.codec.ignore_unknown_fields);
/// assert!(config.codec.lenient_parsing);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL relative request URLs are resolved against.
    pub base_url: Option<String>,

    /// Headers sent with every request unless the request overrides them.
    pub default_headers: BTreeMap<String, String>,

    /// Per-request deadline handed to the transport, in milliseconds.
    pub timeout_ms: Option<u64>,

    /// Codec options.
    pub codec: CodecConfig,

    /// Treatment of non-2xx responses.
    pub status_policy: StatusPolicy,
}

impl ClientConfig {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the text is not a valid configuration.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| Error::Configuration(format!("Invalid client configuration: {}", e)))
    }

    /// Returns the timeout as a `Duration`.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
