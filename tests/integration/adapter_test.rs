//! Pipeline client interception over a real transport.

use super::recorder;
use netlog::client::{PipelineClient, PipelineErrorKind};
use netlog::interceptor::{auto_setup_network_logging, ClientRegistry, CORRELATION_KEY};
use netlog::transport::{ReqwestFetch, TransportConfig};
use netlog::{attach_pipeline, Body};
use serial_test::serial;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(base_url: &str) -> PipelineClient {
    let transport = ReqwestFetch::new(&TransportConfig::new(5000)).expect("transport");
    PipelineClient::new(Arc::new(transport)).base_url(base_url)
}

#[tokio::test]
async fn test_pipeline_success_and_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer t"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"name":"ada"}"#, "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let recorder = recorder();
    let client = client(&server.uri()).default_header("Authorization", "Bearer t");
    let detach = attach_pipeline(&client, &recorder);

    let response = client.get("/profile").await.unwrap();
    assert_eq!(response.data, Body::Json(serde_json::json!({"name": "ada"})));
    assert!(response.config.meta.contains_key(CORRELATION_KEY));

    let err = client.delete("/profile").await.unwrap_err();
    assert_eq!(err.kind, PipelineErrorKind::Status);
    assert_eq!(err.status_code(), 403);

    detach.detach();

    let entries = recorder.entries();
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].method, "DELETE");
    assert_eq!(entries[0].status, Some(403));
    assert_eq!(entries[0].response, Some(Body::from("forbidden")));
    assert_eq!(
        entries[0].error.as_deref(),
        Some("Request failed with status code 403")
    );

    assert_eq!(entries[1].method, "GET");
    assert_eq!(entries[1].status, Some(200));
    assert_eq!(
        entries[1].headers.get("Authorization").map(String::as_str),
        Some("Bearer t")
    );
}

#[tokio::test]
async fn test_pipeline_network_failure() {
    let recorder = recorder();
    let client = client("http://127.0.0.1:1");
    attach_pipeline(&client, &recorder);

    let err = client.get("/unreachable").await.unwrap_err();
    assert_eq!(err.kind, PipelineErrorKind::Network);

    let entry = &recorder.entries()[0];
    assert_eq!(entry.status, Some(0));
    assert_eq!(entry.error.as_deref(), Some(err.message.as_str()));
}

#[tokio::test]
#[serial]
async fn test_auto_setup_with_registry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let recorder = recorder();
    let registry = ClientRegistry::new();
    let api = client(&server.uri());
    registry.register("api", api.clone());

    let detach = auto_setup_network_logging(&recorder, &registry);
    api.get("/ping").await.unwrap();
    detach.detach();
    api.get("/ping").await.unwrap();

    let entries = recorder.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, Some(204));
}
