//! Recording for fetch-style calls.
//!
//! [`RecordingFetch`] wraps any [`Fetch`] and records each call it passes
//! through. The ambient slot holds the transport that [`fetch`] uses;
//! [`attach_fetch`] swaps a recording wrapper into it so code that never
//! sees the recorder is still observed.

use super::Detach;
use crate::config;
use crate::models::{Body, Outcome};
use crate::recorder::NetworkRecorder;
use crate::transport::{default_transport, Fetch, FetchError, FetchRequest, FetchResponse};
use async_trait::async_trait;
use log::info;
use once_cell::sync::Lazy;
use std::sync::{Arc, PoisonError, RwLock};

static AMBIENT_FETCH: Lazy<RwLock<Arc<dyn Fetch>>> =
    Lazy::new(|| RwLock::new(default_transport(&config::get_config().transport)));

/// The transport currently installed in the ambient slot.
pub fn ambient() -> Arc<dyn Fetch> {
    Arc::clone(&AMBIENT_FETCH.read().unwrap_or_else(PoisonError::into_inner))
}

/// Installs `transport` in the ambient slot and returns the previous one.
pub fn set_ambient(transport: Arc<dyn Fetch>) -> Arc<dyn Fetch> {
    let mut slot = AMBIENT_FETCH.write().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, transport)
}

/// Performs a call through the ambient slot.
pub async fn fetch(request: FetchRequest) -> Result<FetchResponse, FetchError> {
    let transport = ambient();
    transport.fetch(request).await
}

/// A [`Fetch`] that records every call made through it.
///
/// Responses and errors reach the caller exactly as the inner transport
/// produced them. A call whose future is dropped before it settles is
/// recorded as cancelled.
#[derive(Clone)]
pub struct RecordingFetch {
    inner: Arc<dyn Fetch>,
    recorder: NetworkRecorder,
}

impl RecordingFetch {
    pub fn new(inner: Arc<dyn Fetch>, recorder: NetworkRecorder) -> Self {
        Self { inner, recorder }
    }

    pub fn inner(&self) -> &Arc<dyn Fetch> {
        &self.inner
    }
}

/// Turns a transport result into the outcome recorded for it.
///
/// A body that could not be read still records the response status, with
/// the body replaced by [`Body::unreadable`].
pub(crate) fn outcome_of(
    result: &Result<FetchResponse, FetchError>,
    capture_body: bool,
) -> Outcome {
    match result {
        Ok(response) => {
            let body = capture_body
                .then(|| Body::capture_response(response.content_type(), &response.body));
            Outcome::response(response.status, body)
        }
        Err(e) => match e.response_status() {
            Some(status) => Outcome::response(status, capture_body.then(Body::unreadable)),
            None => Outcome::failure(e.to_string()),
        },
    }
}

#[async_trait]
impl Fetch for RecordingFetch {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let call = self.recorder.track(request.descriptor());
        let result = self.inner.fetch(request).await;

        if call.is_tracked() {
            call.close(outcome_of(&result, self.recorder.config().enable_body_logging));
        }

        result
    }
}

/// Starts recording calls made through the ambient slot.
///
/// The returned handle puts back whatever transport was installed before.
pub fn attach_fetch(recorder: &NetworkRecorder) -> Detach {
    let original = ambient();
    set_ambient(Arc::new(RecordingFetch::new(
        Arc::clone(&original),
        recorder.clone(),
    )));
    info!("Network logging attached to ambient fetch");

    Detach::new(move || {
        set_ambient(original);
        info!("Network logging detached from ambient fetch");
    })
}
