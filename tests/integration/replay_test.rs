//! Replaying recorded calls over the network.

use super::{recorder, recorder_with};
use netlog::{Body, Outcome, RecorderConfig, RequestDescriptor};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_repeat_reissues_the_same_call() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/items/1"))
        .and(header("x-trace", "abc"))
        .and(body_string("renamed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"updated":true}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let recorder = recorder();
    let id = recorder
        .open(
            RequestDescriptor::new(format!("{}/items/1", server.uri()))
                .method("put")
                .header("x-trace", "abc")
                .body("renamed"),
        )
        .unwrap();
    recorder.close(&id, Outcome::failure("timed out"));
    let original = recorder.entry(&id).unwrap();

    let replayed = recorder.repeat(&original).await;

    assert!(replayed.is_repeated);
    assert!(replayed.id.starts_with(&format!("repeat-{}-", id)));
    assert_eq!(replayed.status, Some(200));
    assert_eq!(
        replayed.response,
        Some(Body::Json(serde_json::json!({"updated": true})))
    );
    assert_eq!(recorder.entries().len(), 2);
    assert_eq!(recorder.entries()[0], replayed);
}

#[tokio::test]
async fn test_repeat_unreachable_url_resolves() {
    let recorder = recorder();
    let id = recorder
        .open(RequestDescriptor::new("http://127.0.0.1:1/unreachable"))
        .unwrap();
    recorder.close(&id, Outcome::failure("connection refused"));
    let original = recorder.entry(&id).unwrap();

    let replayed = recorder.repeat(&original).await;

    assert_eq!(replayed.status, Some(0));
    assert!(replayed.error.is_some());
    assert!(replayed.is_repeated);
    assert_ne!(replayed.id, original.id);

    let entries = recorder.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, replayed.id);
    assert_eq!(entries[1].id, original.id);
}

#[tokio::test]
async fn test_repeat_respects_body_logging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .mount(&server)
        .await;

    let recorder = recorder_with(RecorderConfig::default().with_body_logging(false));
    let id = recorder
        .open(RequestDescriptor::new(format!("{}/token", server.uri())))
        .unwrap();
    recorder.close(&id, Outcome::response(200, None));

    let replayed = recorder.repeat(&recorder.entry(&id).unwrap()).await;
    assert_eq!(replayed.status, Some(200));
    assert_eq!(replayed.response, None);
}
