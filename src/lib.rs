//! # netresult - typed HTTP calls with a uniform result
//!
//! netresult wraps `reqwest` in a small request pipeline: describe a call by
//! mutating a [`RequestSpec`], send it once, decode the body into your type,
//! and get back a [`NetworkResult`] that is either `Success { data }` or
//! `Error { error, message }`. Transport failures, HTTP error statuses and
//! decoding problems are classified into one closed [`NetworkError`] set, so
//! callers branch on data instead of juggling error types.
//!
//! ## Quick Start
//!
//! ```no_run
//! use netresult::{Client, HttpMethod, NetworkError, NetworkResult};
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize)]
//! struct CreateUser {
//!     name: String,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netresult::Error> {
//!     let client = Client::builder()
//!         .base_url("https://api.example.com")?
//!         .timeout(Duration::from_secs(30))
//!         .build()?;
//!
//!     // GET with the verb helper
//!     match client.get::<User>("/users/123").await {
//!         NetworkResult::Success { data } => println!("User: {}", data.name),
//!         NetworkResult::Error { error: NetworkError::ServerError { code, .. }, .. } => {
//!             println!("Server said {code}");
//!         }
//!         NetworkResult::Error { error, .. } => println!("Failed: {error}"),
//!     }
//!
//!     // POST with the configuration closure
//!     let new_user = CreateUser { name: "Alice".to_string() };
//!     let created: NetworkResult<User> = client
//!         .execute(|spec| {
//!             spec.set_url("/users")
//!                 .set_method(HttpMethod::Post)
//!                 .body(&new_user);
//!         })
//!         .await;
//!     println!("{created:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`RequestSpec`]: per-call method, URL, headers and body
//! - [`ResponseDecoder`] with a [`DecoderRegistry`]: caller-registered decoders win over `Deserialize`
//! - [`JsonCodec`] and [`CodecConfig`]: unknown-field, lenient and default-encoding switches
//! - [`ErrorClassifier`]: total mapping from failures to [`NetworkError`]
//! - [`Client`] and [`ClientBuilder`]: wiring, default headers, status policy
//! - [`Transport`]: the seam in front of the network
//!
//! ## Logging
//!
//! Requests and failures are reported through `tracing`. Install any
//! subscriber to see them; the library installs none.

mod classify;
mod client;
mod codec;
mod config;
mod decoder;
mod error;
mod request;
mod result;
mod transport;

pub use classify::{DefaultErrorClassifier, ErrorClassifier};
pub use client::{Client, ClientBuilder};
pub use codec::{CodecConfig, CodecConfigBuilder, DecodeError, JsonCodec};
pub use config::{ClientConfig, StatusPolicy};
pub use decoder::{DecodeFn, DecoderRegistry, RawResponse, ResponseDecoder};
pub use error::{Error, NetworkError, Result};
pub use request::{HttpMethod, RequestBody, RequestSpec};
pub use result::NetworkResult;
pub use transport::{ReqwestTransport, Transport};
