//! Adapters that feed intercepted calls into a [`NetworkRecorder`].
//!
//! Two attachment points are supported:
//!
//! - the ambient fetch slot ([`fetch::attach_fetch`]), for code that calls
//!   [`fetch::fetch`] without knowing about the recorder
//! - a [`PipelineClient`](crate::client::PipelineClient)'s hook chains
//!   ([`pipeline::attach_pipeline`])
//!
//! Every attachment returns a [`Detach`] handle that restores the previous
//! behaviour.
//!
//! [`NetworkRecorder`]: crate::NetworkRecorder

pub mod fetch;
pub mod pipeline;
pub mod setup;

pub use fetch::{ambient, attach_fetch, set_ambient, RecordingFetch};
pub use pipeline::{attach_pipeline, CORRELATION_KEY};
pub use setup::{
    auto_setup_network_logging, client_registry, setup_network_logging, ClientRegistry,
    SetupOptions,
};

use log::warn;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

type DetachFn = Box<dyn FnOnce() + Send>;

/// Undoes an attachment. Clones share the same underlying action, which
/// runs at most once.
#[derive(Clone)]
pub struct Detach {
    action: Arc<Mutex<Option<DetachFn>>>,
}

impl Detach {
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            action: Arc::new(Mutex::new(Some(Box::new(action)))),
        }
    }

    /// A handle with nothing to undo.
    pub fn noop() -> Self {
        Self {
            action: Arc::new(Mutex::new(None)),
        }
    }

    /// Detaches several attachments at once. A panic while detaching one
    /// does not stop the others.
    pub fn combine(handles: Vec<Detach>) -> Self {
        Self::new(move || {
            for handle in handles {
                if catch_unwind(AssertUnwindSafe(|| handle.detach())).is_err() {
                    warn!("Detaching a network interceptor panicked");
                }
            }
        })
    }

    /// Runs the detach action. Subsequent calls do nothing.
    pub fn detach(&self) {
        let action = self
            .action
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(action) = action {
            action();
        }
    }

    pub fn is_detached(&self) -> bool {
        self.action
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl std::fmt::Debug for Detach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detach")
            .field("detached", &self.is_detached())
            .finish()
    }
}
