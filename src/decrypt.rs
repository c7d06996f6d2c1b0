//! Display-time decryption of captured bodies.
//!
//! Capture always stores bodies as they were sent. When an application
//! encrypts payloads it can hand a [`Decryptor`] to whatever renders
//! entries; the helpers here apply it consistently.

use crate::models::{Body, Entry};
use log::warn;
use serde_json::{json, Value};
use std::error::Error;
use std::sync::Arc;

/// Shown in place of a body whose decryption failed.
pub const DECRYPTION_FAILED: &str = "[Decryption failed]";

pub type DecryptError = Box<dyn Error + Send + Sync>;

/// Turns ciphertext into plaintext.
pub type Decryptor = Arc<dyn Fn(&str) -> Result<String, DecryptError> + Send + Sync>;

/// Wraps a closure as a [`Decryptor`].
pub fn decryptor<F>(decrypt: F) -> Decryptor
where
    F: Fn(&str) -> Result<String, DecryptError> + Send + Sync + 'static,
{
    Arc::new(decrypt)
}

/// Decrypts a single ciphertext string.
///
/// Plaintext starting with `{` or `[` is parsed as JSON when possible;
/// everything else stays text. A failing decryptor yields
/// [`DECRYPTION_FAILED`].
pub fn decrypt_text(ciphertext: &str, decryptor: &Decryptor) -> Body {
    match decryptor(ciphertext) {
        Ok(plaintext) => {
            if plaintext.starts_with('{') || plaintext.starts_with('[') {
                if let Ok(value) = serde_json::from_str::<Value>(&plaintext) {
                    return Body::Json(value);
                }
            }
            Body::Text(plaintext)
        }
        Err(e) => {
            warn!("Decryption failed: {}", e);
            Body::Text(DECRYPTION_FAILED.to_string())
        }
    }
}

/// Decrypts a body for display.
///
/// Only text bodies are decrypted. Without a decryptor the body is returned
/// as is.
pub fn decrypt_body(body: &Body, decryptor: Option<&Decryptor>) -> Body {
    match (body, decryptor) {
        (Body::Text(text), Some(decryptor)) => decrypt_text(text, decryptor),
        _ => body.clone(),
    }
}

/// Builds the shareable JSON summary of an entry.
///
/// ```
/// use netlog::decrypt::entry_summary;
/// use netlog::models::Entry;
///
/// let entry = Entry::pending(
///     "1".into(),
///     "https://api.example.com".into(),
///     "GET".into(),
///     Default::default(),
///     None,
///     chrono::Utc::now(),
/// );
/// let summary = entry_summary(&entry, None);
/// assert_eq!(summary["requestDetails"]["duration"], "Pending");
/// ```
pub fn entry_summary(entry: &Entry, decryptor: Option<&Decryptor>) -> Value {
    let duration = match entry.duration_ms {
        Some(ms) => format!("{}ms", ms),
        None => "Pending".to_string(),
    };
    let body_value = |body: &Option<Body>| {
        body.as_ref()
            .map(|b| decrypt_body(b, decryptor).to_json_value())
            .unwrap_or(Value::Null)
    };

    json!({
        "requestDetails": {
            "url": entry.url,
            "method": entry.method,
            "status": entry.status,
            "time": entry.started_at.to_rfc3339(),
            "duration": duration,
            "headers": entry.headers,
            "requestBody": body_value(&entry.body),
            "responseBody": body_value(&entry.response),
        }
    })
}
