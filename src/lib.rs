//! In-process HTTP traffic recorder
//!
//! `netlog` observes the HTTP calls an application makes at the client-library
//! boundary, correlates every request with its response or failure, keeps a
//! bounded most-recent-first history, and lets observers (a debug panel, a
//! log sink, a test) follow that history live, query it, and replay entries.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - **models**: `Entry`, `Outcome`, `RequestDescriptor` and captured `Body` payloads
//! - **history**: the bounded history store, filtering, statistics and text formatting
//! - **recorder**: the `NetworkRecorder` (correlation, pending table, observer fan-out)
//!   and the process-wide default instance
//! - **transport**: the async `Fetch` boundary and its reqwest implementation
//! - **client**: a hook-chain HTTP client that interceptors can attach to
//! - **interceptor**: adapters attaching a recorder to the ambient fetch slot and to
//!   pipeline clients
//! - **replay**: re-issuing recorded calls as new linked entries
//! - **decrypt**: display-time decryption of captured bodies and summary export
//! - **config**: recorder configuration loading and validation
//!
//! # Flow
//!
//! 1. An interceptor sees an outgoing call and calls [`NetworkRecorder::open`]
//! 2. The call runs on its transport, unmodified
//! 3. The interceptor reports the outcome with [`NetworkRecorder::close`]
//! 4. The settled entry is added to history, evicting the oldest at capacity
//! 5. Every observer receives a fresh snapshot
//!
//! # Usage
//!
//! ```no_run
//! use netlog::interceptor::{fetch, setup_network_logging, SetupOptions};
//! use netlog::transport::FetchRequest;
//! use netlog::{NetworkRecorder, RecorderConfig};
//!
//! # async fn run() {
//! let recorder = NetworkRecorder::new(RecorderConfig::default().with_ignored_urls(["/health"]));
//! let _subscription = recorder.subscribe(|entries| {
//!     println!("{} requests recorded", entries.len());
//! });
//! let detach = setup_network_logging(&recorder, SetupOptions::new());
//!
//! let _ = fetch::fetch(FetchRequest::get("https://api.example.com/users")).await;
//! println!("{:?}", recorder.stats());
//!
//! detach.detach();
//! # }
//! ```

pub mod client;
pub mod config;
pub mod decrypt;
pub mod history;
pub mod interceptor;
pub mod models;
pub mod recorder;
pub mod replay;
pub mod transport;

pub use config::{RecorderConfig, RuntimeEnvironment};
pub use history::{EntryFilter, NetworkStats, StatusBucket};
pub use interceptor::{
    attach_fetch, attach_pipeline, auto_setup_network_logging, setup_network_logging, Detach,
    SetupOptions,
};
pub use models::{Body, Entry, Outcome, RequestDescriptor};
pub use recorder::{default_recorder, NetworkRecorder, PendingCall, Snapshot, Subscription};
