//! Transport error types.
//!
//! This module defines the errors a [`super::Fetch`] implementation reports,
//! including network errors, timeouts, and protocol issues. Interceptors record
//! the `Display` form of these errors and hand the error itself back to the
//! caller untouched.

use std::fmt;

/// Errors that can occur while performing an HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Network error occurred during request execution.
    ///
    /// This includes connection failures, DNS resolution errors,
    /// and other network-level issues.
    NetworkError(String),

    /// Request timed out before completion.
    Timeout,

    /// The URL could not be parsed.
    InvalidUrl(String),

    /// TLS/SSL error occurred during HTTPS connection.
    TlsError(String),

    /// HTTP protocol error, such as invalid headers or a malformed response.
    ProtocolError(String),

    /// The request could not be constructed (bad method, header, ...).
    BuildError(String),

    /// The response body could not be read.
    BodyReadError(String),

    /// The response arrived with `status` but its body could not be read.
    IncompleteBody { status: u16, message: String },

    /// Only HTTP and HTTPS are supported.
    UnsupportedProtocol(String),

    /// No transport is available in this build.
    Unavailable(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            FetchError::Timeout => write!(f, "Request timed out"),
            FetchError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            FetchError::TlsError(msg) => write!(f, "TLS/SSL error: {}", msg),
            FetchError::ProtocolError(msg) => write!(f, "HTTP protocol error: {}", msg),
            FetchError::BuildError(msg) => write!(f, "Request build error: {}", msg),
            FetchError::BodyReadError(msg) => write!(f, "Failed to read response body: {}", msg),
            FetchError::IncompleteBody { status, message } => write!(
                f,
                "Failed to read body of response with status {}: {}",
                status, message
            ),
            FetchError::UnsupportedProtocol(protocol) => {
                write!(f, "Unsupported protocol: {}", protocol)
            }
            FetchError::Unavailable(reason) => write!(f, "Transport unavailable: {}", reason),
        }
    }
}

impl FetchError {
    /// Status of the response, when one arrived before the failure.
    pub fn response_status(&self) -> Option<u16> {
        match self {
            FetchError::IncompleteBody { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::error::Error for FetchError {}

/// Convert reqwest errors to FetchError.
#[cfg(feature = "native")]
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() || err.is_request() {
            FetchError::NetworkError(err.to_string())
        } else if err.is_builder() {
            FetchError::BuildError(err.to_string())
        } else if err.is_body() || err.is_decode() {
            FetchError::BodyReadError(err.to_string())
        } else if err.to_string().contains("certificate")
            || err.to_string().contains("TLS")
            || err.to_string().contains("SSL")
        {
            FetchError::TlsError(err.to_string())
        } else {
            FetchError::NetworkError(err.to_string())
        }
    }
}

/// Convert URL parsing errors to FetchError.
impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::InvalidUrl(err.to_string())
    }
}
