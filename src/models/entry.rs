//! The unit of record: one intercepted HTTP call.
//!
//! An [`Entry`] is created pending when a call is intercepted and replaced,
//! exactly once, by a settled value when the outcome is known.

use super::body::Body;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error recorded for a call abandoned before it settled.
pub const REQUEST_CANCELLED: &str = "Request cancelled";

/// A recorded HTTP call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Process-unique identifier assigned when the call was opened.
    pub id: String,

    pub url: String,

    /// Upper-case HTTP method.
    pub method: String,

    /// Request headers exactly as captured (names are case-sensitive).
    pub headers: HashMap<String, String>,

    /// Request body, absent when not sent or when body logging is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,

    /// Wall-clock time at which the call was opened.
    pub started_at: DateTime<Utc>,

    /// Status code. `None` while pending; `Some(0)` when no response was received.
    #[serde(default)]
    pub status: Option<u16>,

    /// Response body, if one was received and body logging is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Body>,

    /// Failure description, present only when the call failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Wall-clock time at which the outcome was recorded.
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,

    /// Elapsed milliseconds between open and settle.
    #[serde(default, rename = "duration")]
    pub duration_ms: Option<u64>,

    /// Whether this entry was produced by replaying another entry.
    #[serde(default)]
    pub is_repeated: bool,
}

/// Coarse classification of an entry's status, used for display and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusClass {
    /// No response received yet, or none at all (status 0).
    Pending,
    Success,
    Redirect,
    ClientError,
    ServerError,
    /// 1xx and anything else outside the ranges above.
    Other,
}

impl StatusClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => StatusClass::Pending,
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirect,
            400..=499 => StatusClass::ClientError,
            500..=u16::MAX => StatusClass::ServerError,
            _ => StatusClass::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::Pending => "pending",
            StatusClass::Success => "success",
            StatusClass::Redirect => "redirect",
            StatusClass::ClientError => "client error",
            StatusClass::ServerError => "server error",
            StatusClass::Other => "other",
        }
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a call, handed to the correlator when it settles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Status code; 0 means no response was received.
    pub status: u16,
    pub response: Option<Body>,
    pub error: Option<String>,
}

impl Outcome {
    /// A response was received.
    pub fn response(status: u16, body: Option<Body>) -> Self {
        Self {
            status,
            response: body,
            error: None,
        }
    }

    /// The call failed before any response arrived.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: 0,
            response: None,
            error: Some(error.into()),
        }
    }

    /// The caller stopped waiting before the call settled.
    pub fn cancelled() -> Self {
        Self::failure(REQUEST_CANCELLED)
    }

    /// The call failed after a response arrived (e.g. rejected by status validation).
    pub fn rejected(status: u16, error: impl Into<String>, body: Option<Body>) -> Self {
        Self {
            status,
            response: body,
            error: Some(error.into()),
        }
    }
}

/// Description of an outgoing call as seen by an interceptor.
///
/// Every field is optional; a descriptor without a URL is never tracked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDescriptor {
    pub url: Option<String>,
    pub method: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub body: Option<Body>,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Normalizes a method name, defaulting to GET.
pub fn normalize_method(method: Option<&str>) -> String {
    match method.map(str::trim) {
        Some(m) if !m.is_empty() => m.to_ascii_uppercase(),
        _ => "GET".to_string(),
    }
}

impl Entry {
    /// Creates a pending entry.
    pub fn pending(
        id: String,
        url: String,
        method: String,
        headers: HashMap<String, String>,
        body: Option<Body>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            url,
            method,
            headers,
            body,
            started_at,
            status: None,
            response: None,
            error: None,
            ended_at: None,
            duration_ms: None,
            is_repeated: false,
        }
    }

    /// Builds the settled value of this entry from an outcome.
    ///
    /// Identity fields (id, url, method, headers, body, start time) and the
    /// replay marker carry over unchanged.
    pub fn settle(&self, outcome: Outcome, ended_at: DateTime<Utc>, duration_ms: u64) -> Entry {
        Entry {
            id: self.id.clone(),
            url: self.url.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            started_at: self.started_at,
            status: Some(outcome.status),
            response: outcome.response,
            error: outcome.error,
            ended_at: Some(ended_at),
            duration_ms: Some(duration_ms),
            is_repeated: self.is_repeated,
        }
    }

    /// True until an outcome has been recorded.
    pub fn is_pending(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Status code with "no status" folded into 0.
    pub fn status_code(&self) -> u16 {
        self.status.unwrap_or(0)
    }

    /// A response with a non-zero status has been recorded.
    pub fn is_completed(&self) -> bool {
        self.status_code() != 0
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code())
    }

    pub fn is_error(&self) -> bool {
        self.status_code() >= 400
    }

    pub fn status_class(&self) -> StatusClass {
        StatusClass::from_status(self.status_code())
    }

    /// Content-Type of the request, if captured.
    pub fn content_type(&self) -> Option<&str> {
        super::body::find_content_type(&self.headers)
    }
}
