//! Integration tests module for netlog
//!
//! Common utilities shared by the end-to-end tests. Every test here talks to
//! a local wiremock server through the reqwest transport.

pub mod adapter_test;
pub mod recorder_flow_test;
pub mod replay_test;

use netlog::transport::{ReqwestFetch, TransportConfig};
use netlog::{NetworkRecorder, RecorderConfig, RuntimeEnvironment};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Recorder in development mode backed by a real reqwest transport.
pub fn recorder_with(config: RecorderConfig) -> NetworkRecorder {
    init_test_env();
    let transport = ReqwestFetch::new(&TransportConfig::new(5000)).expect("transport");
    NetworkRecorder::with_transport(
        config.with_environment(RuntimeEnvironment::Development),
        Arc::new(transport),
    )
}

pub fn recorder() -> NetworkRecorder {
    recorder_with(RecorderConfig::default())
}
