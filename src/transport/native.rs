//! Native HTTP transport using reqwest.
//!
//! Only available with the `native` feature.

use super::config::TransportConfig;
use super::error::FetchError;
use super::{Fetch, FetchRequest, FetchResponse};
use async_trait::async_trait;
use std::collections::HashMap;

/// [`Fetch`] implementation backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    /// Builds a transport with the configured timeout.
    pub fn new(config: &TransportConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout_duration())
            .build()
            .map_err(|e| FetchError::BuildError(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for ReqwestFetch {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let url = url::Url::parse(&request.url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(FetchError::UnsupportedProtocol(url.scheme().to_string()));
        }

        let method = reqwest::Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|e| FetchError::BuildError(e.to_string()))?;

        let mut req_builder = self.client.request(method, url);

        for (name, value) in &request.headers {
            req_builder = req_builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.to_bytes());
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else if e.is_connect() {
                FetchError::NetworkError(format!("Connection failed: {}", e))
            } else {
                FetchError::from(e)
            }
        })?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(name.as_str().to_string(), value_str.to_string());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::IncompleteBody {
                status,
                message: e.to_string(),
            })?
            .to_vec();

        Ok(FetchResponse {
            status,
            status_text,
            headers,
            body,
        })
    }
}
