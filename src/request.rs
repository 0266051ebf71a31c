//! Per-call request description.
//!
//! A [`RequestSpec`] is created fresh for every call, filled in by the
//! caller's configuration closure, and consumed when the request is sent.

use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// The HTTP methods a [`RequestSpec`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    /// `GET`, the default.
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The payload attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// A value captured for JSON encoding.
    Json(Value),
    /// Raw UTF-8 text, sent as-is.
    Text(String),
}

impl RequestBody {
    /// The `Content-Type` attached when the caller did not set one.
    pub fn content_type(&self) -> &'static str {
        match self {
            RequestBody::Json(_) => "application/json",
            RequestBody::Text(_) => "text/plain; charset=utf-8",
        }
    }
}

/// Mutable description of one outgoing call.
///
/// `url` may be absolute or relative to the client's base URL. Nothing is
/// validated here; malformed URLs and header values are reported when the
/// request is sent.
///
/// # Examples
///
/// ```
/// use netresult::{HttpMethod, RequestSpec};
///
/// let mut spec = RequestSpec::new();
/// spec.set_url("/posts")
///     .set_method(HttpMethod::Post)
///     .headers([("A", "1")])
///     .headers([("a", "2"), ("B", "3")]);
///
/// assert_eq!(spec.header("A"), Some("2"));
/// assert_eq!(spec.header("b"), Some("3"));
/// assert_eq!(spec.header_entries().count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestSpec {
    /// Absolute URL, or a path resolved against the base URL.
    pub url: String,

    /// The HTTP method. Defaults to `GET`.
    pub method: HttpMethod,

    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
    body_error: Option<String>,
}

impl RequestSpec {
    /// Creates an empty `GET` spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target URL.
    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = url.into();
        self
    }

    /// Sets the HTTP method.
    pub fn set_method(&mut self, method: HttpMethod) -> &mut Self {
        self.method = method;
        self
    }

    /// Merges headers into the spec.
    ///
    /// Names are compared case-insensitively. A later write of the same name
    /// replaces the earlier value and keeps the newer spelling.
    pub fn headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.insert_header(name.into(), value.into());
        }
        self
    }

    /// Sets a single header, replacing any value with the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.insert_header(name.into(), value.into());
        self
    }

    fn insert_header(&mut self, name: String, value: String) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => *entry = (name, value),
            None => self.headers.push((name, value)),
        }
    }

    /// Returns the value of a header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over the headers in insertion order.
    pub fn header_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Appends a query parameter.
    pub fn query(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Iterates over the query parameters in insertion order.
    pub fn query_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Stores a JSON payload. The last call wins.
    ///
    /// The value is captured immediately. If it cannot be serialized the
    /// failure is kept and reported when the request is sent.
    pub fn body<B>(&mut self, body: &B) -> &mut Self
    where
        B: Serialize + ?Sized,
    {
        match serde_json::to_value(body) {
            Ok(value) => {
                self.body = Some(RequestBody::Json(value));
                self.body_error = None;
            }
            Err(e) => {
                self.body = None;
                self.body_error = Some(e.to_string());
            }
        }
        self
    }

    /// Stores a raw text payload. The last call wins.
    pub fn text_body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = Some(RequestBody::Text(body.into()));
        self.body_error = None;
        self
    }

    /// Returns the stored payload, if any.
    pub fn body_ref(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub(crate) fn into_parts(self) -> RequestParts {
        RequestParts {
            url: self.url,
            method: self.method,
            headers: self.headers,
            query: self.query,
            body: match self.body_error {
                Some(e) => Err(e),
                None => Ok(self.body),
            },
        }
    }
}

pub(crate) struct RequestParts {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Result<Option<RequestBody>, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_defaults() {
        let spec = RequestSpec::new();
        assert_eq!(spec.method, HttpMethod::Get);
        assert!(spec.url.is_empty());
        assert!(spec.body_ref().is_none());
        assert_eq!(spec.header_entries().count(), 0);
    }

    #[test]
    fn test_header_merge_overwrites() {
        let mut spec = RequestSpec::new();
        spec.headers([("A", "1")]);
        spec.headers([("A", "2"), ("B", "3")]);

        let headers: BTreeMap<&str, &str> = spec.header_entries().collect();
        assert_eq!(headers, BTreeMap::from([("A", "2"), ("B", "3")]));
    }

    #[test]
    fn test_header_merge_is_case_insensitive() {
        let mut spec = RequestSpec::new();
        spec.set_header("Accept", "application/json");
        spec.set_header("accept", "text/plain");

        let headers: Vec<_> = spec.header_entries().collect();
        assert_eq!(headers, vec![("accept", "text/plain")]);
        assert_eq!(spec.header("ACCEPT"), Some("text/plain"));
    }

    #[test]
    fn test_body_last_write_wins() {
        let mut spec = RequestSpec::new();
        spec.body(&serde_json::json!({"first": true}));
        spec.body(&serde_json::json!({"second": true}));

        assert_eq!(
            spec.body_ref(),
            Some(&RequestBody::Json(serde_json::json!({"second": true})))
        );

        spec.text_body("plain");
        assert_eq!(spec.body_ref(), Some(&RequestBody::Text("plain".to_string())));
    }

    #[test]
    fn test_unserializable_body_is_deferred() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "non-string key");

        let mut spec = RequestSpec::new();
        spec.set_url("/x").body(&map);

        let parts = spec.into_parts();
        assert!(parts.body.is_err());
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(Method::from(HttpMethod::Patch), Method::PATCH);
        assert_eq!(HttpMethod::Options.to_string(), "OPTIONS");
    }
}
