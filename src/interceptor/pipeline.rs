//! Recording for [`PipelineClient`] calls.
//!
//! A request hook opens the entry and stores its identifier in the call's
//! out-of-band metadata under [`CORRELATION_KEY`]. A response hook closes it
//! on both the success and the rejection path, then hands the value or
//! error on untouched. Calls dropped in flight arrive as a cancelled
//! rejection and are recorded as such.

use super::Detach;
use crate::client::{Hook, PipelineClient, PipelineError, PipelineResponse, RequestConfig};
use crate::models::Outcome;
use crate::recorder::NetworkRecorder;
use log::info;

/// Metadata key carrying the entry identifier of a call.
pub const CORRELATION_KEY: &str = "x-dev-console-id";

/// Starts recording calls made through `client` and its clones.
pub fn attach_pipeline(client: &PipelineClient, recorder: &NetworkRecorder) -> Detach {
    let on_request = recorder.clone();
    let request_hook = Hook::fulfilled(move |mut config: RequestConfig| {
        if let Some(id) = on_request.open(config.descriptor()) {
            config.meta.insert(CORRELATION_KEY.to_string(), id);
        }
        Ok(config)
    });

    let on_response = recorder.clone();
    let on_error = recorder.clone();
    let response_hook = Hook::fulfilled(move |response: PipelineResponse| {
        if let Some(id) = response.config.meta.get(CORRELATION_KEY) {
            let outcome = Outcome::response(response.status, Some(response.data.clone()));
            on_response.close(id, outcome);
        }
        Ok(response)
    })
    .on_rejected(move |error: PipelineError| {
        if let Some(id) = error.meta(CORRELATION_KEY) {
            let outcome = Outcome::rejected(
                error.status_code(),
                error.message.clone(),
                error.response.as_ref().map(|r| r.data.clone()),
            );
            on_error.close(id, outcome);
        }
        Err(error)
    });

    let interceptors = client.interceptors_handle();
    let request_id = interceptors.request.use_hook(request_hook);
    let response_id = interceptors.response.use_hook(response_hook);
    info!("Network logging attached to pipeline client");

    Detach::new(move || {
        interceptors.request.eject(request_id);
        interceptors.response.eject(response_id);
        info!("Network logging detached from pipeline client");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RecorderConfig, RuntimeEnvironment};
    use crate::models::Body;
    use crate::transport::{Fetch, FetchError, FetchRequest, FetchResponse, UnavailableTransport};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Status(u16);

    #[async_trait]
    impl Fetch for Status {
        async fn fetch(&self, _request: FetchRequest) -> Result<FetchResponse, FetchError> {
            Ok(FetchResponse::new(self.0, br#"{"ok":false}"#.to_vec())
                .with_header("Content-Type", "application/json"))
        }
    }

    fn recorder() -> NetworkRecorder {
        NetworkRecorder::with_transport(
            RecorderConfig::default().with_environment(RuntimeEnvironment::Development),
            Arc::new(UnavailableTransport::new("test")),
        )
    }

    #[tokio::test]
    async fn test_success_path() {
        let recorder = recorder();
        let client = PipelineClient::new(Arc::new(Status(200)));
        attach_pipeline(&client, &recorder);

        let response = client
            .post("https://api.example.com/items", serde_json::json!({"a": 1}))
            .await
            .unwrap();
        let id = response.config.meta.get(CORRELATION_KEY).cloned().unwrap();

        let entry = recorder.entry(&id).unwrap();
        assert_eq!(entry.method, "POST");
        assert_eq!(entry.status, Some(200));
        assert_eq!(entry.body, Some(Body::Json(serde_json::json!({"a": 1}))));
        assert_eq!(entry.response, Some(Body::Json(serde_json::json!({"ok": false}))));
        assert_eq!(entry.error, None);
    }

    #[tokio::test]
    async fn test_status_rejection_is_recorded_and_forwarded() {
        let recorder = recorder();
        let client = PipelineClient::new(Arc::new(Status(500)));
        attach_pipeline(&client, &recorder);

        let err = client.get("https://api.example.com/fail").await.unwrap_err();
        assert_eq!(err.message, "Request failed with status code 500");

        let entry = &recorder.entries()[0];
        assert_eq!(entry.status, Some(500));
        assert_eq!(entry.error.as_deref(), Some("Request failed with status code 500"));
        assert_eq!(entry.response, Some(Body::Json(serde_json::json!({"ok": false}))));
    }

    #[tokio::test]
    async fn test_network_rejection_records_status_zero() {
        let recorder = recorder();
        let client = PipelineClient::new(Arc::new(UnavailableTransport::new("offline")));
        attach_pipeline(&client, &recorder);

        let err = client.get("https://api.example.com").await.unwrap_err();
        assert!(err.message.contains("offline"));

        let entry = &recorder.entries()[0];
        assert_eq!(entry.status, Some(0));
        assert_eq!(entry.response, None);
        assert!(entry.error.as_deref().unwrap().contains("offline"));
    }

    #[tokio::test]
    async fn test_detach_ejects_hooks() {
        let recorder = recorder();
        let client = PipelineClient::new(Arc::new(Status(200)));
        let handle = attach_pipeline(&client, &recorder);
        assert_eq!(client.interceptors().request.len(), 1);
        assert_eq!(client.interceptors().response.len(), 1);

        handle.detach();
        handle.detach();
        assert!(client.interceptors().request.is_empty());
        assert!(client.interceptors().response.is_empty());

        client.get("https://api.example.com").await.unwrap();
        assert!(recorder.entries().is_empty());
    }

    #[tokio::test]
    async fn test_ignored_call_has_no_correlation_id() {
        let recorder = NetworkRecorder::with_transport(
            RecorderConfig::default()
                .with_environment(RuntimeEnvironment::Development)
                .with_ignored_hosts(["example.com"]),
            Arc::new(UnavailableTransport::new("test")),
        );
        let client = PipelineClient::new(Arc::new(Status(200)));
        attach_pipeline(&client, &recorder);

        let response = client.get("https://api.example.com").await.unwrap();
        assert!(!response.config.meta.contains_key(CORRELATION_KEY));
        assert!(recorder.entries().is_empty());
    }

    struct Hang;

    #[async_trait]
    impl Fetch for Hang {
        async fn fetch(&self, _request: FetchRequest) -> Result<FetchResponse, FetchError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_dropped_call_is_recorded_as_cancelled() {
        let recorder = recorder();
        let client = PipelineClient::new(Arc::new(Hang));
        attach_pipeline(&client, &recorder);

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(0),
            client.get("https://api.example.com/slow"),
        )
        .await;
        assert!(result.is_err());

        assert_eq!(recorder.pending_count(), 0);
        let entry = &recorder.entries()[0];
        assert_eq!(entry.status, Some(0));
        assert_eq!(entry.error.as_deref(), Some(crate::models::REQUEST_CANCELLED));
    }

    #[tokio::test]
    async fn test_later_request_hook_rejection_closes_entry() {
        let recorder = recorder();
        let client = PipelineClient::new(Arc::new(Status(200)));
        attach_pipeline(&client, &recorder);
        client.interceptors().request.use_hook(Hook::fulfilled(|_: RequestConfig| {
            Err(PipelineError::request("no token", None))
        }));

        let err = client.get("https://api.example.com/private").await.unwrap_err();
        assert_eq!(err.message, "no token");

        assert_eq!(recorder.pending_count(), 0);
        let entry = &recorder.entries()[0];
        assert_eq!(entry.url, "https://api.example.com/private");
        assert_eq!(entry.status, Some(0));
        assert_eq!(entry.error.as_deref(), Some("no token"));
    }
}
