//! Captured request and response payloads.
//!
//! Bodies are opaque to the recorder; the only interpretation applied at
//! capture time is the JSON-versus-text split driven by the Content-Type
//! header.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Placeholder stored when a response body could not be read or decoded.
pub const UNREADABLE_BODY: &str = "[Unable to read response body]";

/// A captured payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Body {
    /// Plain text, or any payload whose Content-Type is not JSON.
    Text(String),
    /// Parsed JSON document.
    Json(Value),
    /// Raw bytes that were never decoded, base64 in serialized form.
    Binary(#[serde(with = "base64_bytes")] Vec<u8>),
}

/// Error raised when a body cannot be decoded according to its Content-Type.
#[derive(Debug)]
pub struct BodyReadError(String);

impl fmt::Display for BodyReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to read body: {}", self.0)
    }
}

impl std::error::Error for BodyReadError {}

impl Body {
    /// Decodes a response body the way the fetch adapter records it.
    ///
    /// A Content-Type containing `application/json` requires the payload to
    /// parse as JSON; anything else is decoded as (lossy) UTF-8 text.
    pub fn from_response(content_type: Option<&str>, bytes: &[u8]) -> Result<Body, BodyReadError> {
        if is_json_content_type(content_type) {
            return serde_json::from_slice(bytes)
                .map(Body::Json)
                .map_err(|e| BodyReadError(e.to_string()));
        }

        Ok(Body::Text(String::from_utf8_lossy(bytes).into_owned()))
    }

    /// Same as [`Body::from_response`] but substitutes [`UNREADABLE_BODY`] on failure.
    pub fn capture_response(content_type: Option<&str>, bytes: &[u8]) -> Body {
        match Body::from_response(content_type, bytes) {
            Ok(body) => body,
            Err(e) => {
                log::warn!("{}", e);
                Body::unreadable()
            }
        }
    }

    pub fn unreadable() -> Body {
        Body::Text(UNREADABLE_BODY.to_string())
    }

    /// Encodes the payload for transmission.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Body::Text(text) => text.as_bytes().to_vec(),
            Body::Json(value) => value.to_string().into_bytes(),
            Body::Binary(bytes) => bytes.clone(),
        }
    }

    /// Returns the text content when the body is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Body::Text(text) => text.is_empty(),
            Body::Json(_) => false,
            Body::Binary(bytes) => bytes.is_empty(),
        }
    }

    /// Converts the body into a JSON value for export.
    pub fn to_json_value(&self) -> Value {
        match self {
            Body::Text(text) => Value::String(text.clone()),
            Body::Json(value) => value.clone(),
            Body::Binary(bytes) => Value::String(STANDARD.encode(bytes)),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Binary(bytes)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Text(text) => write!(f, "{}", text),
            Body::Json(value) => write!(f, "{}", value),
            Body::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

/// Checks whether a Content-Type value denotes JSON.
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

/// Finds the Content-Type header in a case-insensitive manner.
pub fn find_content_type(headers: &HashMap<String, String>) -> Option<&str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .map(|(_, v)| v.as_str())
}

mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
