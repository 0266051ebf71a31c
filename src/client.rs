//! HTTP client that resolves every call to a [`NetworkResult`].
//!
//! The [`Client`] type is the main entry point for making HTTP requests.
//! Use [`ClientBuilder`] to configure and create clients.

use crate::{
    classify::{DefaultErrorClassifier, ErrorClassifier},
    codec::{CodecConfig, DecodeError, JsonCodec},
    config::{ClientConfig, StatusPolicy},
    decoder::{DecoderRegistry, RawResponse, ResponseDecoder},
    request::{HttpMethod, RequestBody, RequestSpec},
    transport::{ReqwestTransport, Transport},
    Error, NetworkResult, Result,
};
use http::{header::CONTENT_TYPE, HeaderName, HeaderValue};
use serde::{de::DeserializeOwned, Serialize};
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use url::Url;

/// An HTTP client whose calls never fail with a Rust error.
///
/// Each call builds a fresh [`RequestSpec`], sends it once, decodes the body
/// and returns a [`NetworkResult`]. Any failure along the way is classified
/// into a [`NetworkError`](crate::NetworkError). The client is cheap to clone
/// and holds no per-call state.
///
/// Dropping the future returned by a call cancels the in-flight request and
/// produces no result.
///
/// # Examples
///
/// ```no_run
/// use netresult::{Client, HttpMethod, NetworkResult};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// struct NewPost {
///     title: String,
/// }
///
/// #[derive(Deserialize)]
/// struct Post {
///     id: u64,
///     title: String,
/// }
///
/// # async fn example() -> Result<(), netresult::Error> {
/// let client = Client::builder()
///     .base_url("https://jsonplaceholder.typicode.com")?
///     .build()?;
///
/// let new_post = NewPost { title: "Hello".to_string() };
/// let result: NetworkResult<Post> = client
///     .execute(|spec| {
///         spec.set_url("/posts")
///             .set_method(HttpMethod::Post)
///             .headers([("X-Trace", "abc")])
///             .body(&new_post);
///     })
///     .await;
///
/// if let NetworkResult::Success { data } = result {
///     println!("Created post {}: {}", data.id, data.title);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    classifier: Box<dyn ErrorClassifier>,
    decoder: ResponseDecoder,
    base_url: Option<Url>,
    defaults: RequestSpec,
    timeout: Option<Duration>,
    status_policy: StatusPolicy,
    runtime: Option<Handle>,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Makes a typed HTTP request.
    ///
    /// `configure` fills in a [`RequestSpec`] that already carries the
    /// client's default headers. The call is sent exactly once; there is no
    /// retry.
    ///
    /// This never returns a Rust error: transport, status and decoding
    /// failures all end up in [`NetworkResult::Error`]. A panicking
    /// registered decoder is reported as
    /// [`NetworkError::UnknownError`](crate::NetworkError::UnknownError),
    /// with or without a configured runtime.
    pub async fn execute<T, F>(&self, configure: F) -> NetworkResult<T>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(&mut RequestSpec),
    {
        let spec = self.prepare(configure);
        let (method, url) = (spec.method, spec.url.clone());
        let outcome = self.run(spec, Client::call::<T>).await;
        self.resolve(outcome, method, &url)
    }

    /// Like [`execute`](Self::execute) but skips decoding and returns the raw
    /// response. The status policy still applies.
    pub async fn execute_raw<F>(&self, configure: F) -> NetworkResult<RawResponse>
    where
        F: FnOnce(&mut RequestSpec),
    {
        let spec = self.prepare(configure);
        let (method, url) = (spec.method, spec.url.clone());
        let outcome = self.run(spec, Client::call_raw).await;
        self.resolve(outcome, method, &url)
    }

    fn prepare<F>(&self, configure: F) -> RequestSpec
    where
        F: FnOnce(&mut RequestSpec),
    {
        let mut spec = self.inner.defaults.clone();
        configure(&mut spec);
        spec
    }

    /// Runs `call` inline, or on the configured runtime when there is one.
    async fn run<R, C, Fut>(&self, spec: RequestSpec, call: C) -> Result<R>
    where
        R: Send + 'static,
        C: FnOnce(Client, RequestSpec) -> Fut,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let fut = call(self.clone(), spec);
        match &self.inner.runtime {
            Some(handle) => {
                let mut task = AbortOnDrop(handle.spawn(fut));
                match (&mut task.0).await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(Error::TaskFailed(e.to_string())),
                }
            }
            None => fut.await,
        }
    }

    async fn call<T>(self, spec: RequestSpec) -> Result<T>
    where
        T: DeserializeOwned + 'static,
    {
        let raw = self.fetch(spec).await?;
        let decoded = panic::catch_unwind(AssertUnwindSafe(|| {
            self.inner.decoder.decode::<T>(&raw)
        }))
        .map_err(|payload| {
            let reason = panic_message(&*payload);
            tracing::error!(reason = %reason, "Response decoder panicked");
            Error::TaskFailed(format!("Response decoder panicked: {}", reason))
        })?;
        decoded.map_err(|e| {
            tracing::error!(
                error = %e,
                status = raw.status.as_u16(),
                raw_response = %raw.body,
                "Failed to deserialize response"
            );
            Error::from(e)
        })
    }

    async fn call_raw(self, spec: RequestSpec) -> Result<RawResponse> {
        self.fetch(spec).await
    }

    /// Sends one request and reads the whole body.
    async fn fetch(&self, spec: RequestSpec) -> Result<RawResponse> {
        let request = self.build_request(spec)?;

        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            "Executing HTTP request"
        );

        let start = Instant::now();
        let response = self.inner.transport.send(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        let latency = start.elapsed();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            "Received HTTP response"
        );

        let is_error_status = status.is_client_error() || status.is_server_error();
        if is_error_status && self.inner.status_policy == StatusPolicy::StatusFirst {
            if status.is_client_error() {
                tracing::error!(
                    status = status.as_u16(),
                    response = %body,
                    "Client error (4xx)"
                );
            } else {
                tracing::warn!(
                    status = status.as_u16(),
                    response = %body,
                    "Server error (5xx)"
                );
            }

            return Err(Error::Status {
                status,
                raw_response: body,
                headers,
            });
        }

        Ok(RawResponse {
            status,
            headers,
            body,
            latency,
        })
    }

    fn build_request(&self, spec: RequestSpec) -> Result<reqwest::Request> {
        let parts = spec.into_parts();

        let mut url = self.resolve_url(&parts.url)?;
        if !parts.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &parts.query {
                pairs.append_pair(key, value);
            }
        }

        let body = parts.body.map_err(Error::Serialization)?;

        let mut request = reqwest::Request::new(parts.method.into(), url);

        let headers = request.headers_mut();
        for (name, value) in &parts.headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        if let Some(body) = body {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(body.content_type()));
            }
            let text = match body {
                RequestBody::Json(value) => self
                    .inner
                    .decoder
                    .codec()
                    .encode_value(value)
                    .map_err(|e| Error::Serialization(e.to_string()))?,
                RequestBody::Text(text) => text,
            };
            *request.body_mut() = Some(text.into());
        }

        *request.timeout_mut() = self.inner.timeout;

        Ok(request)
    }

    fn resolve_url(&self, target: &str) -> Result<Url> {
        if target.trim().is_empty() {
            return Err(Error::Configuration("Request URL was not set".to_string()));
        }

        match Url::parse(target) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self.inner.base_url.as_ref().ok_or_else(|| {
                    Error::Configuration(format!("Relative URL `{}` needs a base URL", target))
                })?;
                Ok(base.join(target.trim_start_matches('/'))?)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn resolve<T>(&self, outcome: Result<T>, method: HttpMethod, url: &str) -> NetworkResult<T> {
        match outcome {
            Ok(data) => NetworkResult::success(data),
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    method = %method,
                    url = %url,
                    "Request failed"
                );
                NetworkResult::failure(self.inner.classifier.classify(error))
            }
        }
    }

    /// Makes a GET request to the specified URL.
    pub async fn get<T>(&self, url: impl Into<String>) -> NetworkResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = url.into();
        self.execute(|spec| {
            spec.set_url(url);
        })
        .await
    }

    /// Makes a POST request with a JSON body.
    pub async fn post<B, T>(&self, url: impl Into<String>, body: &B) -> NetworkResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        self.with_body(HttpMethod::Post, url.into(), body).await
    }

    /// Makes a PUT request with a JSON body.
    pub async fn put<B, T>(&self, url: impl Into<String>, body: &B) -> NetworkResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        self.with_body(HttpMethod::Put, url.into(), body).await
    }

    /// Makes a PATCH request with a JSON body.
    pub async fn patch<B, T>(&self, url: impl Into<String>, body: &B) -> NetworkResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        self.with_body(HttpMethod::Patch, url.into(), body).await
    }

    /// Makes a DELETE request.
    pub async fn delete<T>(&self, url: impl Into<String>) -> NetworkResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = url.into();
        self.execute(|spec| {
            spec.set_url(url).set_method(HttpMethod::Delete);
        })
        .await
    }

    /// Makes a HEAD request. HEAD responses carry no body, so the raw
    /// response is returned.
    pub async fn head(&self, url: impl Into<String>) -> NetworkResult<RawResponse> {
        let url = url.into();
        self.execute_raw(|spec| {
            spec.set_url(url).set_method(HttpMethod::Head);
        })
        .await
    }

    /// Makes an OPTIONS request and returns the raw response.
    pub async fn options(&self, url: impl Into<String>) -> NetworkResult<RawResponse> {
        let url = url.into();
        self.execute_raw(|spec| {
            spec.set_url(url).set_method(HttpMethod::Options);
        })
        .await
    }

    async fn with_body<B, T>(&self, method: HttpMethod, url: String, body: &B) -> NetworkResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        self.execute(|spec| {
            spec.set_url(url).set_method(method).body(body);
        })
        .await
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Aborts the spawned call when the awaiting future is dropped.
struct AbortOnDrop<R>(JoinHandle<R>);

impl<R> Drop for AbortOnDrop<R> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// Every collaborator is passed in here; nothing is looked up globally, so
/// several independently configured clients can coexist.
///
/// # Examples
///
/// ```no_run
/// use netresult::{ClientBuilder, CodecConfig, StatusPolicy};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), netresult::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://api.example.com/v1")?
///     .timeout(Duration::from_secs(30))
///     .codec(CodecConfig::strict())
///     .status_policy(StatusPolicy::StatusFirst)
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    defaults: RequestSpec,
    codec: CodecConfig,
    registry: DecoderRegistry,
    timeout: Option<Duration>,
    status_policy: StatusPolicy,
    transport: Option<Arc<dyn Transport>>,
    classifier: Option<Box<dyn ErrorClassifier>>,
    runtime: Option<Handle>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    ///
    /// `Accept: application/json` is sent with every request unless replaced.
    pub fn new() -> Self {
        let mut defaults = RequestSpec::new();
        defaults.set_header("Accept", "application/json");

        Self {
            base_url: None,
            defaults,
            codec: CodecConfig::default(),
            registry: DecoderRegistry::new(),
            timeout: None,
            status_policy: StatusPolicy::default(),
            transport: None,
            classifier: None,
            runtime: None,
        }
    }

    /// Creates a builder pre-filled from a [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or a header is invalid.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let mut builder = Self::new()
            .codec(config.codec)
            .status_policy(config.status_policy);

        if let Some(base_url) = &config.base_url {
            builder = builder.base_url(base_url)?;
        }
        for (name, value) in &config.default_headers {
            builder = builder.default_header(name, value)?;
        }
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(builder)
    }

    /// Sets the base URL relative request URLs are resolved against.
    ///
    /// A trailing `/` is added to the path when missing, so
    /// `https://api.example.com/v1` joined with `/users` gives
    /// `https://api.example.com/v1/users`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let mut url = Url::parse(url.as_ref())?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = Some(url);
        Ok(self)
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
        HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
        self.defaults.set_header(name.as_ref(), value.as_ref());
        Ok(self)
    }

    /// Sets the codec options.
    pub fn codec(mut self, config: CodecConfig) -> Self {
        self.codec = config;
        self
    }

    /// Registers a decoder used instead of `T`'s `Deserialize` implementation.
    pub fn register_decoder<T, F>(mut self, decoder: F) -> Self
    where
        T: 'static,
        F: Fn(&RawResponse) -> std::result::Result<T, DecodeError> + Send + Sync + 'static,
    {
        self.registry.register(decoder);
        self
    }

    /// Sets the per-request deadline handed to the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how non-2xx responses are treated.
    pub fn status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    /// Replaces the default reqwest transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets a custom error classifier.
    ///
    /// By default, [`DefaultErrorClassifier`] is used.
    pub fn error_classifier(mut self, classifier: Box<dyn ErrorClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Runs every call as a task on `handle` instead of the caller's task.
    ///
    /// The task is aborted if the caller stops waiting for it.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the default HTTP client cannot be created.
    pub fn build(self) -> Result<Client> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let http_client = reqwest::Client::builder().build().map_err(|e| {
                    Error::Configuration(format!("Failed to build HTTP client: {}", e))
                })?;
                Arc::new(ReqwestTransport::from_client(http_client))
            }
        };

        let classifier = self
            .classifier
            .unwrap_or_else(|| Box::new(DefaultErrorClassifier));

        Ok(Client {
            inner: Arc::new(ClientInner {
                transport,
                classifier,
                decoder: ResponseDecoder::new(JsonCodec::new(self.codec), self.registry),
                base_url: self.base_url,
                defaults: self.defaults,
                timeout: self.timeout,
                status_policy: self.status_policy,
                runtime: self.runtime,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> Client {
        Client::builder().base_url(base).unwrap().build().unwrap()
    }

    #[test]
    fn test_relative_url_joins_base_path() {
        let client = client("https://api.example.com/v1");
        let url = client.resolve_url("/users/1").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/users/1");
    }

    #[test]
    fn test_absolute_url_bypasses_base() {
        let client = client("https://api.example.com");
        let url = client.resolve_url("https://other.example.com/x").unwrap();
        assert_eq!(url.as_str(), "https://other.example.com/x");
    }

    #[test]
    fn test_missing_url_is_configuration_error() {
        let client = client("https://api.example.com");
        assert!(matches!(
            client.resolve_url(""),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_relative_url_without_base() {
        let client = Client::builder().build().unwrap();
        assert!(matches!(
            client.resolve_url("/users"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_build_request_attaches_defaults_and_body() {
        let client = Client::builder()
            .base_url("https://api.example.com")
            .unwrap()
            .default_header("X-Api-Key", "secret")
            .unwrap()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        let spec = client.prepare(|spec| {
            spec.set_url("/posts")
                .set_method(HttpMethod::Post)
                .query("page", "2")
                .body(&serde_json::json!({"title": "hi"}));
        });
        let request = client.build_request(spec).unwrap();

        assert_eq!(request.method(), &http::Method::POST);
        assert_eq!(request.url().as_str(), "https://api.example.com/posts?page=2");
        assert_eq!(request.headers()["accept"], "application/json");
        assert_eq!(request.headers()["x-api-key"], "secret");
        assert_eq!(request.headers()["content-type"], "application/json");
        assert_eq!(request.timeout(), Some(&Duration::from_secs(5)));
        assert_eq!(
            request.body().and_then(|b| b.as_bytes()),
            Some(br#"{"title":"hi"}"#.as_slice())
        );
    }

    #[test]
    fn test_build_request_text_body() {
        let client = client("https://api.example.com");
        let spec = client.prepare(|spec| {
            spec.set_url("/notes")
                .set_method(HttpMethod::Put)
                .text_body("remember the milk");
        });
        let request = client.build_request(spec).unwrap();

        assert_eq!(
            request.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            request.body().and_then(|b| b.as_bytes()),
            Some(b"remember the milk".as_slice())
        );
    }

    #[test]
    fn test_json_body_keeps_field_order() {
        #[derive(Serialize)]
        struct Ordered {
            zebra: u8,
            mango: u8,
            apple: u8,
        }

        let client = client("https://api.example.com");
        let spec = client.prepare(|spec| {
            spec.set_url("/fruit").set_method(HttpMethod::Post).body(&Ordered {
                zebra: 1,
                mango: 2,
                apple: 3,
            });
        });
        let request = client.build_request(spec).unwrap();

        assert_eq!(
            request.body().and_then(|b| b.as_bytes()),
            Some(br#"{"zebra":1,"mango":2,"apple":3}"#.as_slice())
        );
    }

    #[test]
    fn test_no_body_means_no_content_type() {
        let client = client("https://api.example.com");
        let spec = client.prepare(|spec| {
            spec.set_url("/posts");
        });
        let request = client.build_request(spec).unwrap();

        assert!(!request.headers().contains_key(CONTENT_TYPE));
        assert!(request.body().is_none());
    }

    #[test]
    fn test_request_headers_override_defaults() {
        let client = client("https://api.example.com");
        let spec = client.prepare(|spec| {
            spec.set_url("/feed").headers([("accept", "application/xml")]);
        });
        let request = client.build_request(spec).unwrap();

        let accepts: Vec<_> = request.headers().get_all("accept").iter().collect();
        assert_eq!(accepts, vec!["application/xml"]);
    }

    #[test]
    fn test_invalid_header_fails_at_dispatch() {
        let client = client("https://api.example.com");
        let spec = client.prepare(|spec| {
            spec.set_url("/x").set_header("bad header", "v");
        });
        assert!(matches!(
            client.build_request(spec),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig::from_json(
            r#"{"base_url": "https://api.example.com", "default_headers": {"X-App": "demo"}}"#,
        )
        .unwrap();
        let client = ClientBuilder::from_config(config).unwrap().build().unwrap();

        let spec = client.prepare(|spec| {
            spec.set_url("/ping");
        });
        assert_eq!(spec.header("x-app"), Some("demo"));
        assert_eq!(spec.header("accept"), Some("application/json"));
    }
}
