//! A small HTTP client with request and response hook chains.
//!
//! [`PipelineClient`] runs every call through a chain of request hooks, the
//! transport, status validation, and a chain of response hooks. A hook may
//! handle the success value, the error, or both; the result of each hook
//! feeds the next one. This is the attachment surface the pipeline
//! interceptor works with.
//!
//! # Example
//!
//! ```no_run
//! use netlog::client::{Hook, PipelineClient, RequestConfig};
//!
//! # async fn run() -> Result<(), netlog::client::PipelineError> {
//! let client = PipelineClient::with_default_transport().base_url("https://api.example.com");
//!
//! client.interceptors().request.use_hook(Hook::fulfilled(|mut config: RequestConfig| {
//!     config.headers.insert("Authorization".into(), "Bearer token".into());
//!     Ok(config)
//! }));
//!
//! let response = client.get("/users").await?;
//! println!("{} {}", response.status, response.data);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod hooks;

pub use error::{PipelineError, PipelineErrorKind};
pub use hooks::{Hook, HookChain, HookId};

use crate::config;
use crate::models::{find_content_type, normalize_method, Body, RequestDescriptor};
use crate::transport::{default_transport, Fetch, FetchRequest};
use std::collections::HashMap;
use std::sync::Arc;

/// Configuration of a single call as it flows through the request hooks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub data: Option<Body>,

    /// Out-of-band values carried with the call. Never sent over the wire.
    pub meta: HashMap<String, String>,
}

impl RequestConfig {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn data(mut self, data: impl Into<Body>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Describes this call for the correlator.
    pub fn descriptor(&self) -> RequestDescriptor {
        RequestDescriptor {
            url: Some(self.url.clone()),
            method: Some(normalize_method(Some(&self.method))),
            headers: Some(self.headers.clone()),
            body: self.data.clone(),
        }
    }
}

/// Response delivered to response hooks and the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,

    /// Body parsed as JSON when the Content-Type says so and it parses,
    /// text otherwise.
    pub data: Body,

    /// The configuration the call was sent with.
    pub config: RequestConfig,
}

/// The hook chains of a client.
#[derive(Default)]
pub struct Interceptors {
    pub request: HookChain<RequestConfig>,
    pub response: HookChain<PipelineResponse>,
}

type StatusValidator = Arc<dyn Fn(u16) -> bool + Send + Sync>;

/// HTTP client with hook chains. Clones share hooks and transport.
#[derive(Clone)]
pub struct PipelineClient {
    transport: Arc<dyn Fetch>,
    interceptors: Arc<Interceptors>,
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
    validate_status: StatusValidator,
}

impl PipelineClient {
    pub fn new(transport: Arc<dyn Fetch>) -> Self {
        Self {
            transport,
            interceptors: Arc::new(Interceptors::default()),
            base_url: None,
            default_headers: HashMap::new(),
            validate_status: Arc::new(|status| (200..300).contains(&status)),
        }
    }

    /// Creates a client over the default transport for this build.
    pub fn with_default_transport() -> Self {
        Self::new(default_transport(&config::get_config().transport))
    }

    /// Prefix applied to relative request URLs.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Header sent with every call unless the call sets it itself.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Replaces the status check. By default only 2xx statuses succeed.
    pub fn validate_status<F>(mut self, validate: F) -> Self
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        self.validate_status = Arc::new(validate);
        self
    }

    pub fn interceptors(&self) -> &Interceptors {
        &self.interceptors
    }

    pub(crate) fn interceptors_handle(&self) -> Arc<Interceptors> {
        Arc::clone(&self.interceptors)
    }

    /// Sends a call through the hook chains.
    ///
    /// A request hook rejection that carries no configuration is given the
    /// last configuration the request hooks produced. If the returned future
    /// is dropped while the call is in flight, the response hooks still see
    /// a [`PipelineErrorKind::Cancelled`] rejection.
    pub async fn request(&self, config: RequestConfig) -> Result<PipelineResponse, PipelineError> {
        let (prepared, last_config) = self
            .interceptors
            .request
            .run_keeping_last(Ok(self.prepare(config)));

        let result = match prepared {
            Ok(config) => {
                let in_flight = InFlight {
                    hooks: &self.interceptors.response,
                    config: Some(config.clone()),
                };
                let result = self.dispatch(config).await;
                in_flight.finish();
                result
            }
            Err(mut e) => {
                if e.config.is_none() {
                    e.config = last_config;
                }
                Err(e)
            }
        };

        self.interceptors.response.run(result)
    }

    pub async fn get(&self, url: impl Into<String>) -> Result<PipelineResponse, PipelineError> {
        self.request(RequestConfig::new("GET", url)).await
    }

    pub async fn delete(&self, url: impl Into<String>) -> Result<PipelineResponse, PipelineError> {
        self.request(RequestConfig::new("DELETE", url)).await
    }

    pub async fn post(
        &self,
        url: impl Into<String>,
        data: impl Into<Body>,
    ) -> Result<PipelineResponse, PipelineError> {
        self.request(RequestConfig::new("POST", url).data(data)).await
    }

    pub async fn put(
        &self,
        url: impl Into<String>,
        data: impl Into<Body>,
    ) -> Result<PipelineResponse, PipelineError> {
        self.request(RequestConfig::new("PUT", url).data(data)).await
    }

    fn prepare(&self, mut config: RequestConfig) -> RequestConfig {
        config.method = normalize_method(Some(&config.method));
        if let Some(base) = &self.base_url {
            config.url = combine_urls(base, &config.url);
        }
        for (name, value) in &self.default_headers {
            let already_set = config
                .headers
                .keys()
                .any(|existing| existing.eq_ignore_ascii_case(name));
            if !already_set {
                config.headers.insert(name.clone(), value.clone());
            }
        }
        config
    }

    async fn dispatch(&self, config: RequestConfig) -> Result<PipelineResponse, PipelineError> {
        let request = FetchRequest {
            url: config.url.clone(),
            method: config.method.clone(),
            headers: config.headers.clone(),
            body: config.data.clone(),
        };

        let response = match self.transport.fetch(request).await {
            Ok(response) => response,
            Err(e) => return Err(PipelineError::network(e.to_string(), config)),
        };

        let data = match Body::from_response(find_content_type(&response.headers), &response.body)
        {
            Ok(body) => body,
            Err(_) => Body::Text(response.text()),
        };

        let response = PipelineResponse {
            status: response.status,
            status_text: response.status_text,
            headers: response.headers,
            data,
            config,
        };

        if (self.validate_status)(response.status) {
            Ok(response)
        } else {
            Err(PipelineError::status(response))
        }
    }
}

/// Reports a dispatched call to the response hooks as cancelled if it is
/// dropped before the transport answers.
struct InFlight<'a> {
    hooks: &'a HookChain<PipelineResponse>,
    config: Option<RequestConfig>,
}

impl InFlight<'_> {
    fn finish(mut self) {
        self.config = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(config) = self.config.take() {
            let _ = self.hooks.run(Err(PipelineError::cancelled(config)));
        }
    }
}

impl std::fmt::Debug for PipelineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .field("request_hooks", &self.interceptors.request.len())
            .field("response_hooks", &self.interceptors.response.len())
            .finish()
    }
}

/// Joins a base URL and a request URL. Absolute request URLs win.
fn combine_urls(base: &str, url: &str) -> String {
    if url.contains("://") || base.is_empty() {
        return url.to_string();
    }
    if url.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}
