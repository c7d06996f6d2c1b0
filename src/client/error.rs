//! Errors produced by the pipeline client.

use super::{PipelineResponse, RequestConfig};
use crate::models::REQUEST_CANCELLED;
use std::fmt;

/// Where in the pipeline a call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineErrorKind {
    /// A request hook rejected the call before it was sent.
    Request,
    /// The transport failed; no response was received.
    Network,
    /// A response arrived but its status failed validation.
    Status,
    /// The caller dropped the call before it settled.
    Cancelled,
}

/// Error flowing through the rejected side of the hook chains.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineError {
    pub message: String,
    pub kind: PipelineErrorKind,

    /// Configuration of the failed call, when known.
    pub config: Option<RequestConfig>,

    /// The response, for status failures.
    pub response: Option<PipelineResponse>,
}

impl PipelineError {
    pub fn request(message: impl Into<String>, config: Option<RequestConfig>) -> Self {
        Self {
            message: message.into(),
            kind: PipelineErrorKind::Request,
            config,
            response: None,
        }
    }

    pub fn network(message: impl Into<String>, config: RequestConfig) -> Self {
        Self {
            message: message.into(),
            kind: PipelineErrorKind::Network,
            config: Some(config),
            response: None,
        }
    }

    pub fn cancelled(config: RequestConfig) -> Self {
        Self {
            message: REQUEST_CANCELLED.to_string(),
            kind: PipelineErrorKind::Cancelled,
            config: Some(config),
            response: None,
        }
    }

    pub fn status(response: PipelineResponse) -> Self {
        Self {
            message: format!("Request failed with status code {}", response.status),
            kind: PipelineErrorKind::Status,
            config: Some(response.config.clone()),
            response: Some(response),
        }
    }

    /// Status of the response, 0 when none was received.
    pub fn status_code(&self) -> u16 {
        self.response.as_ref().map(|r| r.status).unwrap_or(0)
    }

    /// Looks up an out-of-band value on the failed call's configuration.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.config
            .as_ref()
            .or_else(|| self.response.as_ref().map(|r| &r.config))
            .and_then(|config| config.meta.get(key))
            .map(String::as_str)
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PipelineError {}
