//! The fetch-like call boundary the recorder observes.
//!
//! A [`Fetch`] performs one buffered HTTP exchange. Interceptors wrap a
//! `Fetch`, replay issues calls through one directly, and the pipeline client
//! sits on top of one. With the `native` feature the default implementation is
//! [`ReqwestFetch`]; without it, [`default_transport`] yields a transport that
//! rejects every call.

pub mod config;
pub mod error;

#[cfg(feature = "native")]
pub mod native;

pub use config::TransportConfig;
pub use error::FetchError;

#[cfg(feature = "native")]
pub use native::ReqwestFetch;

use crate::models::{find_content_type, normalize_method, Body, RequestDescriptor};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// An outgoing HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub url: String,

    /// Method as given by the caller; transports treat it case-insensitively.
    pub method: String,

    pub headers: HashMap<String, String>,

    pub body: Option<Body>,
}

impl FetchRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Describes this call for the correlator.
    pub fn descriptor(&self) -> RequestDescriptor {
        RequestDescriptor {
            url: Some(self.url.clone()),
            method: Some(normalize_method(Some(&self.method))),
            headers: Some(self.headers.clone()),
            body: self.body.clone(),
        }
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        find_content_type(&self.headers)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body decoded as (lossy) UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Performs HTTP calls.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}

#[async_trait]
impl<T: Fetch + ?Sized> Fetch for Arc<T> {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        (**self).fetch(request).await
    }
}

/// Transport used when no real one can be built.
#[derive(Debug, Clone)]
pub struct UnavailableTransport {
    reason: String,
}

impl UnavailableTransport {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Fetch for UnavailableTransport {
    async fn fetch(&self, _request: FetchRequest) -> Result<FetchResponse, FetchError> {
        Err(FetchError::Unavailable(self.reason.clone()))
    }
}

/// Builds the default transport for this build.
pub fn default_transport(config: &TransportConfig) -> Arc<dyn Fetch> {
    #[cfg(feature = "native")]
    {
        match ReqwestFetch::new(config) {
            Ok(transport) => Arc::new(transport),
            Err(e) => {
                log::warn!("Failed to build HTTP transport: {}", e);
                Arc::new(UnavailableTransport::new(e.to_string()))
            }
        }
    }

    #[cfg(not(feature = "native"))]
    {
        let _ = config;
        Arc::new(UnavailableTransport::new(
            "built without the `native` feature",
        ))
    }
}
