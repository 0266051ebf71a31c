//! Turning raw responses into typed values.

use crate::codec::{DecodeError, JsonCodec};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A response as it came off the transport, body already read.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The body as text.
    pub body: String,

    /// Time from dispatch until the body was fully read.
    pub latency: Duration,
}

impl RawResponse {
    /// Creates a new `RawResponse`.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            latency: Duration::ZERO,
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

/// A shared decoder for values of type `T`.
pub type DecodeFn<T> = Arc<dyn Fn(&RawResponse) -> Result<T, DecodeError> + Send + Sync>;

/// Caller-registered decoders, keyed by target type.
///
/// A decoder registered for `T` is used instead of `T`'s `Deserialize`
/// implementation whenever a response is decoded into `T`.
///
/// # Examples
///
/// ```
/// use netresult::{DecoderRegistry, RawResponse};
/// use http::{HeaderMap, StatusCode};
///
/// #[derive(Debug, PartialEq)]
/// struct Version(String);
///
/// let mut registry = DecoderRegistry::new();
/// registry.register(|raw: &RawResponse| Ok(Version(raw.body.trim().to_string())));
///
/// let decode = registry.get::<Version>().unwrap();
/// let raw = RawResponse::new(StatusCode::OK, HeaderMap::new(), "1.2.3\n");
/// assert_eq!(decode(&raw).unwrap(), Version("1.2.3".to_string()));
/// ```
#[derive(Clone, Default)]
pub struct DecoderRegistry {
    decoders: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl DecoderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `decoder` for values of type `T`, replacing any previous one.
    pub fn register<T, F>(&mut self, decoder: F)
    where
        T: 'static,
        F: Fn(&RawResponse) -> Result<T, DecodeError> + Send + Sync + 'static,
    {
        let decoder: DecodeFn<T> = Arc::new(decoder);
        self.decoders.insert(TypeId::of::<T>(), Arc::new(decoder));
    }

    /// Returns the decoder registered for `T`, if any.
    pub fn get<T: 'static>(&self) -> Option<DecodeFn<T>> {
        self.decoders
            .get(&TypeId::of::<T>())?
            .downcast_ref::<DecodeFn<T>>()
            .cloned()
    }

    /// Returns `true` if a decoder is registered for `T`.
    pub fn contains<T: 'static>(&self) -> bool {
        self.decoders.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of registered decoders.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("registered", &self.decoders.len())
            .finish()
    }
}

/// Decodes raw responses, consulting registered decoders before the codec.
#[derive(Debug, Clone, Default)]
pub struct ResponseDecoder {
    codec: JsonCodec,
    registry: DecoderRegistry,
}

impl ResponseDecoder {
    /// Creates a decoder from a codec and a registry.
    pub fn new(codec: JsonCodec, registry: DecoderRegistry) -> Self {
        Self { codec, registry }
    }

    /// Returns the underlying codec.
    pub fn codec(&self) -> &JsonCodec {
        &self.codec
    }

    /// Decodes the body of `response` into `T`.
    ///
    /// Blank bodies are always rejected, even when a custom decoder is
    /// registered for `T`.
    pub fn decode<T>(&self, response: &RawResponse) -> Result<T, DecodeError>
    where
        T: DeserializeOwned + 'static,
    {
        if response.body.trim().is_empty() {
            return Err(DecodeError::EmptyBody);
        }

        match self.registry.get::<T>() {
            Some(decoder) => decoder(response),
            None => self.codec.decode(&response.body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodecConfig;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestData {
        id: u32,
        name: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        email: String,
    }

    fn ok(body: &str) -> RawResponse {
        RawResponse::new(StatusCode::OK, HeaderMap::new(), body)
    }

    #[test]
    fn test_falls_back_to_deserialize() {
        let decoder = ResponseDecoder::default();
        let data: TestData = decoder.decode(&ok(r#"{"id":1,"name":"Test User"}"#)).unwrap();
        assert_eq!(data.id, 1);
    }

    #[test]
    fn test_registered_decoder_takes_precedence() {
        let mut registry = DecoderRegistry::new();
        registry.register(|raw: &RawResponse| {
            Ok(TestData {
                id: raw.status.as_u16() as u32,
                name: raw.body.to_uppercase(),
            })
        });
        let decoder = ResponseDecoder::new(JsonCodec::default(), registry);

        let data: TestData = decoder.decode(&ok("not json at all")).unwrap();
        assert_eq!(data.id, 200);
        assert_eq!(data.name, "NOT JSON AT ALL");
    }

    #[test]
    fn test_blank_body_rejected_before_registry() {
        let mut registry = DecoderRegistry::new();
        registry.register(|_: &RawResponse| {
            Ok(TestData {
                id: 0,
                name: String::new(),
            })
        });
        let decoder = ResponseDecoder::new(JsonCodec::default(), registry);

        assert_eq!(
            decoder.decode::<TestData>(&ok("  \n")),
            Err(DecodeError::EmptyBody)
        );
    }

    #[test]
    fn test_no_coercion_across_shapes() {
        let decoder =
            ResponseDecoder::new(JsonCodec::new(CodecConfig::default()), DecoderRegistry::new());
        let result = decoder.decode::<User>(&ok(r#"{"id":1,"name":"Test User"}"#));
        assert!(matches!(result, Err(DecodeError::Malformed { .. })));
    }

    #[test]
    fn test_registry_is_keyed_by_type() {
        let mut registry = DecoderRegistry::new();
        registry.register(|_: &RawResponse| Ok(1u8));

        assert!(registry.contains::<u8>());
        assert!(!registry.contains::<u16>());
        assert!(registry.get::<u16>().is_none());
        assert_eq!(registry.len(), 1);
    }
}
