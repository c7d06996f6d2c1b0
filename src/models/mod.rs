//! Data models for recorded network traffic.
//!
//! This module contains the core data structures shared by the recorder,
//! the interceptors and the query engine.

pub mod body;
pub mod entry;

pub use body::{find_content_type, is_json_content_type, Body, BodyReadError, UNREADABLE_BODY};
pub use entry::{
    normalize_method, Entry, Outcome, RequestDescriptor, StatusClass, REQUEST_CANCELLED,
};
