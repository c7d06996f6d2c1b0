//! Ordered hook chains.

use super::PipelineError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

type OnFulfilled<T> = Arc<dyn Fn(T) -> Result<T, PipelineError> + Send + Sync>;
type OnRejected<T> = Arc<dyn Fn(PipelineError) -> Result<T, PipelineError> + Send + Sync>;

/// Handle used to remove a hook from its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(usize);

/// A pair of optional handlers.
///
/// The success handler sees the value produced so far; the rejection
/// handler sees the error produced so far and may recover from it.
pub struct Hook<T> {
    on_fulfilled: Option<OnFulfilled<T>>,
    on_rejected: Option<OnRejected<T>>,
}

impl<T> Hook<T> {
    /// A hook that passes everything through.
    pub fn new() -> Self {
        Self {
            on_fulfilled: None,
            on_rejected: None,
        }
    }

    pub fn fulfilled<F>(on_fulfilled: F) -> Self
    where
        F: Fn(T) -> Result<T, PipelineError> + Send + Sync + 'static,
    {
        Self {
            on_fulfilled: Some(Arc::new(on_fulfilled)),
            on_rejected: None,
        }
    }

    pub fn on_rejected<F>(mut self, on_rejected: F) -> Self
    where
        F: Fn(PipelineError) -> Result<T, PipelineError> + Send + Sync + 'static,
    {
        self.on_rejected = Some(Arc::new(on_rejected));
        self
    }

    fn apply(&self, value: Result<T, PipelineError>) -> Result<T, PipelineError> {
        match value {
            Ok(value) => match &self.on_fulfilled {
                Some(handler) => handler(value),
                None => Ok(value),
            },
            Err(error) => match &self.on_rejected {
                Some(handler) => handler(error),
                None => Err(error),
            },
        }
    }
}

impl<T> Default for Hook<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Hook<T> {
    fn clone(&self) -> Self {
        Self {
            on_fulfilled: self.on_fulfilled.clone(),
            on_rejected: self.on_rejected.clone(),
        }
    }
}

/// Hooks applied in registration order.
pub struct HookChain<T> {
    next_id: AtomicUsize,
    hooks: RwLock<Vec<(HookId, Hook<T>)>>,
}

impl<T> HookChain<T> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(0),
            hooks: RwLock::new(Vec::new()),
        }
    }

    /// Appends a hook to the chain.
    pub fn use_hook(&self, hook: Hook<T>) -> HookId {
        let id = HookId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, hook));
        id
    }

    /// Removes a hook. Returns `false` if it was already gone.
    pub fn eject(&self, id: HookId) -> bool {
        let mut hooks = self.hooks.write().unwrap_or_else(PoisonError::into_inner);
        let before = hooks.len();
        hooks.retain(|(hook_id, _)| *hook_id != id);
        hooks.len() != before
    }

    pub fn len(&self) -> usize {
        self.hooks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Threads `value` through every hook.
    pub fn run(&self, value: Result<T, PipelineError>) -> Result<T, PipelineError> {
        self.hooks()
            .iter()
            .fold(value, |value, hook| hook.apply(value))
    }

    /// Like [`run`](Self::run), but also returns the last success value any
    /// step produced, including the initial one.
    pub fn run_keeping_last(
        &self,
        value: Result<T, PipelineError>,
    ) -> (Result<T, PipelineError>, Option<T>)
    where
        T: Clone,
    {
        let mut last = value.as_ref().ok().cloned();
        let result = self.hooks().iter().fold(value, |value, hook| {
            let next = hook.apply(value);
            if let Ok(value) = &next {
                last = Some(value.clone());
            }
            next
        });
        (result, last)
    }

    fn hooks(&self) -> Vec<Hook<T>> {
        self.hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, hook)| hook.clone())
            .collect()
    }
}

impl<T> Default for HookChain<T> {
    fn default() -> Self {
        Self::new()
    }
}
