//! JSON codec with configurable strictness.
//!
//! [`JsonCodec`] converts between typed values and their JSON text. Its
//! behaviour is controlled by [`CodecConfig`]:
//!
//! - `ignore_unknown_fields`: when `false`, a payload carrying a field the
//!   target type does not consume fails to decode.
//! - `lenient_parsing`: when `true`, bare words, single-quoted strings and
//!   trailing commas are accepted on input.
//! - `encode_default_values`: when `false`, `null` members are left out of
//!   encoded objects.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// A failure to turn a response body into the requested type.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The body was empty or contained only whitespace.
    #[error("Empty response body")]
    EmptyBody,

    /// The body did not match the shape of the target type.
    #[error("Failed to parse response: {serde_error}")]
    Malformed {
        /// The raw response body
        raw_response: String,
        /// The error reported by the decoder
        serde_error: String,
    },

    /// The body carried a field the target type does not know about.
    #[error("Failed to parse response: unknown field `{field}`")]
    UnknownField {
        /// The raw response body
        raw_response: String,
        /// Path of the first unexpected field, e.g. `items.0.extra`
        field: String,
    },
}

impl DecodeError {
    /// Returns the raw body that failed to decode, when there was one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            DecodeError::EmptyBody => None,
            DecodeError::Malformed { raw_response, .. } => Some(raw_response),
            DecodeError::UnknownField { raw_response, .. } => Some(raw_response),
        }
    }
}

/// Options recognised by [`JsonCodec`].
///
/// The default matches what most JSON APIs need in practice: unknown fields
/// are skipped, lenient input is accepted, and every field is encoded.
///
/// # Examples
///
/// ```
/// use netresult::CodecConfig;
///
/// let config = CodecConfig::builder()
///     .ignore_unknown_fields(false)
///     .build();
///
/// assert!(!config.ignore_unknown_fields);
/// assert!(config.lenient_parsing);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Skip fields the target type does not declare.
    pub ignore_unknown_fields: bool,

    /// Accept bare words, single quotes and trailing commas.
    pub lenient_parsing: bool,

    /// Encode `null` object members instead of omitting them.
    pub encode_default_values: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            ignore_unknown_fields: true,
            lenient_parsing: true,
            encode_default_values: true,
        }
    }
}

impl CodecConfig {
    /// Creates a new builder for configuring the codec.
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }

    /// Creates a configuration that rejects unknown fields, requires strict
    /// JSON and omits `null` members.
    pub fn strict() -> Self {
        Self {
            ignore_unknown_fields: false,
            lenient_parsing: false,
            encode_default_values: false,
        }
    }
}

/// Builder for `CodecConfig`.
#[derive(Default)]
pub struct CodecConfigBuilder {
    ignore_unknown_fields: Option<bool>,
    lenient_parsing: Option<bool>,
    encode_default_values: Option<bool>,
}

impl CodecConfigBuilder {
    /// Sets whether unknown fields are skipped.
    pub fn ignore_unknown_fields(mut self, ignore: bool) -> Self {
        self.ignore_unknown_fields = Some(ignore);
        self
    }

    /// Sets whether lenient input is accepted.
    pub fn lenient_parsing(mut self, lenient: bool) -> Self {
        self.lenient_parsing = Some(lenient);
        self
    }

    /// Sets whether `null` members are encoded.
    pub fn encode_default_values(mut self, encode: bool) -> Self {
        self.encode_default_values = Some(encode);
        self
    }

    /// Builds the `CodecConfig`.
    pub fn build(self) -> CodecConfig {
        let default = CodecConfig::default();
        CodecConfig {
            ignore_unknown_fields: self
                .ignore_unknown_fields
                .unwrap_or(default.ignore_unknown_fields),
            lenient_parsing: self.lenient_parsing.unwrap_or(default.lenient_parsing),
            encode_default_values: self
                .encode_default_values
                .unwrap_or(default.encode_default_values),
        }
    }
}

/// String ⇄ typed value codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    config: CodecConfig,
}

impl JsonCodec {
    /// Creates a codec with the given options.
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Returns the codec's options.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decodes `text` into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::EmptyBody`] for blank input,
    /// [`DecodeError::UnknownField`] when unknown fields are rejected and one
    /// is present, and [`DecodeError::Malformed`] for everything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use netresult::{CodecConfig, JsonCodec};
    /// use serde::Deserialize;
    ///
    /// #[derive(Debug, Deserialize, PartialEq)]
    /// struct Point { x: i32, y: i32 }
    ///
    /// let codec = JsonCodec::new(CodecConfig::default());
    /// let point: Point = codec.decode("{x: 1, y: 2,}").unwrap();
    /// assert_eq!(point, Point { x: 1, y: 2 });
    /// ```
    pub fn decode<T>(&self, text: &str) -> Result<T, DecodeError>
    where
        T: DeserializeOwned,
    {
        if text.trim().is_empty() {
            return Err(DecodeError::EmptyBody);
        }

        let normalized;
        let input = if self.config.lenient_parsing {
            normalized = normalize_lenient(text);
            normalized.as_str()
        } else {
            text
        };

        let malformed = |e: serde_json::Error| DecodeError::Malformed {
            raw_response: text.to_string(),
            serde_error: e.to_string(),
        };

        let mut de = serde_json::Deserializer::from_str(input);
        let mut unknown = Vec::new();
        let value = if self.config.ignore_unknown_fields {
            T::deserialize(&mut de)
        } else {
            serde_ignored::deserialize(&mut de, |path| unknown.push(path.to_string()))
        }
        .map_err(malformed)?;
        de.end().map_err(malformed)?;

        if let Some(field) = unknown.into_iter().next() {
            return Err(DecodeError::UnknownField {
                raw_response: text.to_string(),
                field,
            });
        }

        Ok(value)
    }

    /// Encodes `value` as JSON text.
    pub fn encode<T>(&self, value: &T) -> Result<String, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        self.encode_value(serde_json::to_value(value)?)
    }

    /// Encodes an already captured JSON value.
    pub fn encode_value(&self, mut value: Value) -> Result<String, serde_json::Error> {
        if !self.config.encode_default_values {
            strip_nulls(&mut value);
        }
        serde_json::to_string(&value)
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

/// Rewrites relaxed JSON into strict JSON.
///
/// Bare words other than `true`, `false`, `null` and numbers are quoted,
/// single-quoted strings become double-quoted, and commas directly before a
/// closing bracket are dropped. Anything inside double quotes is untouched.
fn normalize_lenient(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    out.push(c);
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                out.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            '\'' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                            None => {}
                        },
                        '"' => out.push_str("\\\""),
                        '\'' => break,
                        _ => out.push(c),
                    }
                }
                out.push('"');
            }
            ',' => {
                let mut lookahead = chars.clone();
                while lookahead.next_if(|c| c.is_whitespace()).is_some() {}
                if !matches!(lookahead.peek(), Some('}') | Some(']')) {
                    out.push(',');
                }
            }
            c if is_word_char(c) => {
                let mut word = String::from(c);
                while let Some(next) = chars.next_if(|c| is_word_char(*c)) {
                    word.push(next);
                }
                if is_literal(&word) {
                    out.push_str(&word);
                } else {
                    out.push('"');
                    out.push_str(&word.replace('\\', "\\\\"));
                    out.push('"');
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | ':' | '{' | '}' | '[' | ']' | '"' | '\'')
}

fn is_literal(word: &str) -> bool {
    if matches!(word, "true" | "false" | "null") {
        return true;
    }
    let starts_numeric = word
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-');
    starts_numeric && word.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct TestData {
        id: u32,
        name: String,
    }

    #[derive(Debug, Serialize)]
    struct Draft {
        title: String,
        note: Option<String>,
    }

    #[test]
    fn test_decode_valid_payload() {
        let codec = JsonCodec::default();
        let data: TestData = codec.decode(r#"{"id":1,"name":"Test User"}"#).unwrap();
        assert_eq!(
            data,
            TestData {
                id: 1,
                name: "Test User".to_string()
            }
        );
    }

    #[test]
    fn test_decode_blank_body() {
        let codec = JsonCodec::default();
        assert_eq!(codec.decode::<TestData>(""), Err(DecodeError::EmptyBody));
        assert_eq!(
            codec.decode::<TestData>("   \n\t  "),
            Err(DecodeError::EmptyBody)
        );
    }

    #[test]
    fn test_unknown_fields_ignored_by_default() {
        let codec = JsonCodec::default();
        let data: TestData = codec
            .decode(r#"{"id":1,"name":"Test User","extra":"value"}"#)
            .unwrap();
        assert_eq!(data.id, 1);
        assert_eq!(data.name, "Test User");
    }

    #[test]
    fn test_unknown_fields_rejected_when_strict() {
        let codec = JsonCodec::new(CodecConfig::strict());
        let err = codec
            .decode::<TestData>(r#"{"id":1,"name":"Test User","extra":"value"}"#)
            .unwrap_err();

        match err {
            DecodeError::UnknownField { field, .. } => assert_eq!(field, "extra"),
            other => panic!("Expected UnknownField, got {:?}", other),
        }
    }

    #[test]
    fn test_type_mismatch_is_malformed() {
        let codec = JsonCodec::default();
        let err = codec
            .decode::<TestData>(r#"{"id": "one", "name": "Test User"}"#)
            .unwrap_err();

        assert!(matches!(err, DecodeError::Malformed { .. }));
        assert!(err.to_string().starts_with("Failed to parse response:"));
        assert_eq!(
            err.raw_response(),
            Some(r#"{"id": "one", "name": "Test User"}"#)
        );
    }

    #[test]
    fn test_lenient_input() {
        let codec = JsonCodec::default();
        let data: TestData = codec.decode("{id: 7, name: 'O\\'Brien',}").unwrap();
        assert_eq!(data.id, 7);
        assert_eq!(data.name, "O'Brien");

        let words: Vec<String> = codec.decode("[alpha, beta,]").unwrap();
        assert_eq!(words, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_lenient_input_rejected_when_strict() {
        let codec = JsonCodec::new(CodecConfig::strict());
        assert!(codec.decode::<TestData>("{id: 7, name: bob}").is_err());
    }

    #[test]
    fn test_normalize_leaves_quoted_text_alone() {
        let text = r#"{"msg":"a, ] b: 'c'","n":-1.5e3}"#;
        assert_eq!(normalize_lenient(text), text);
    }

    #[test]
    fn test_encode_defaults_toggle() {
        let draft = Draft {
            title: "hello".to_string(),
            note: None,
        };

        let full = JsonCodec::default().encode(&draft).unwrap();
        let full: Value = serde_json::from_str(&full).unwrap();
        assert_eq!(full, serde_json::json!({"title": "hello", "note": null}));

        let trimmed = JsonCodec::new(CodecConfig::strict()).encode(&draft).unwrap();
        assert_eq!(trimmed, r#"{"title":"hello"}"#);
    }

    #[test]
    fn test_builder_falls_back_to_defaults() {
        let config = CodecConfig::builder().lenient_parsing(false).build();
        assert!(config.ignore_unknown_fields);
        assert!(!config.lenient_parsing);
        assert!(config.encode_default_values);
    }
}
