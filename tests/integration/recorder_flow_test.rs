//! End-to-end recording through the ambient fetch slot.
//!
//! These tests drive real HTTP calls against a mock server and check what
//! observers, queries and statistics see afterwards.

use super::{recorder, recorder_with};
use netlog::history::{filter_entries, StatusBucket};
use netlog::interceptor::{fetch, set_ambient};
use netlog::transport::{FetchRequest, ReqwestFetch, TransportConfig};
use netlog::{
    setup_network_logging, Body, EntryFilter, RecorderConfig, SetupOptions, Snapshot,
};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"[{"id":1}]"#, "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .mount(&server)
        .await;
    server
}

fn install_reqwest_ambient() -> Arc<dyn netlog::transport::Fetch> {
    let transport = ReqwestFetch::new(&TransportConfig::new(5000)).expect("transport");
    set_ambient(Arc::new(transport))
}

#[tokio::test]
#[serial]
async fn test_recorded_history_stats_and_filters() {
    let server = mock_server().await;
    let previous = install_reqwest_ambient();
    let recorder = recorder();
    let detach = setup_network_logging(&recorder, SetupOptions::new());

    let users = fetch::fetch(FetchRequest::get(format!("{}/users", server.uri())))
        .await
        .unwrap();
    assert_eq!(users.status, 200);
    assert_eq!(users.text(), r#"[{"id":1}]"#);

    let missing = fetch::fetch(FetchRequest::get(format!("{}/missing", server.uri())))
        .await
        .unwrap();
    assert_eq!(missing.status, 404);

    let refused = fetch::fetch(FetchRequest::get("http://127.0.0.1:1/refused")).await;
    assert!(refused.is_err());

    detach.detach();
    set_ambient(previous);

    let entries = recorder.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].status, Some(0));
    assert!(entries[0].error.is_some());
    assert_eq!(entries[1].status, Some(404));
    assert_eq!(entries[1].response, Some(Body::from("not found")));
    assert_eq!(entries[2].status, Some(200));
    assert_eq!(
        entries[2].response,
        Some(Body::Json(serde_json::json!([{"id": 1}])))
    );

    let stats = recorder.stats().unwrap();
    assert_eq!(stats.total_requests, 3);
    assert_eq!(stats.completed_requests, 2);
    assert_eq!(stats.success_rate, "50.0");
    assert_eq!(stats.failed_requests, 1);
    assert_eq!(stats.pending_requests, 1);

    let errors = recorder.filter(&EntryFilter::new().status(StatusBucket::Error));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].url.ends_with("/missing"));

    let users_only = filter_entries(&entries, &EntryFilter::new().url("/USERS"));
    assert_eq!(users_only.len(), 1);

    let either = recorder.filter(
        &EntryFilter::new().statuses([StatusBucket::Success, StatusBucket::Pending]),
    );
    assert_eq!(either.len(), 2);
}

#[tokio::test]
#[serial]
async fn test_observer_sees_every_change() {
    let server = mock_server().await;
    let previous = install_reqwest_ambient();
    let recorder = recorder();

    let snapshots: Arc<Mutex<Vec<Snapshot>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&snapshots);
    let subscription = recorder.subscribe(move |snapshot| sink.lock().unwrap().push(snapshot));

    let detach = setup_network_logging(&recorder, SetupOptions::new());
    fetch::fetch(FetchRequest::post(format!("{}/items", server.uri())).body("widget"))
        .await
        .unwrap();
    recorder.clear();
    subscription.unsubscribe();
    fetch::fetch(FetchRequest::get(format!("{}/users", server.uri())))
        .await
        .unwrap();
    detach.detach();
    set_ambient(previous);

    let snapshots = snapshots.lock().unwrap();
    let lengths: Vec<usize> = snapshots.iter().map(|s| s.len()).collect();
    assert_eq!(lengths, vec![0, 1, 0]);
    assert_eq!(snapshots[1][0].method, "POST");
    assert_eq!(snapshots[1][0].body, Some(Body::from("widget")));
    assert_eq!(recorder.entries().len(), 1);
}

#[tokio::test]
#[serial]
async fn test_ignored_urls_are_not_recorded() {
    let server = mock_server().await;
    let previous = install_reqwest_ambient();
    let recorder = recorder_with(RecorderConfig::default().with_ignored_urls(["/missing"]));
    let detach = setup_network_logging(&recorder, SetupOptions::new());

    let response = fetch::fetch(FetchRequest::get(format!("{}/missing", server.uri())))
        .await
        .unwrap();
    assert_eq!(response.status, 404);

    detach.detach();
    set_ambient(previous);

    assert!(recorder.entries().is_empty());
    assert!(recorder.stats().is_none());
}

#[tokio::test]
#[serial]
async fn test_capacity_bound_with_real_calls() {
    let server = mock_server().await;
    let previous = install_reqwest_ambient();
    let recorder = recorder_with(RecorderConfig::default().with_max_entries(2));
    let detach = setup_network_logging(&recorder, SetupOptions::new());

    for _ in 0..5 {
        fetch::fetch(FetchRequest::get(format!("{}/users", server.uri())))
            .await
            .unwrap();
    }

    detach.detach();
    set_ambient(previous);

    assert_eq!(recorder.entries().len(), 2);
    assert_eq!(recorder.pending_count(), 0);
}
