//! # Ambient Dispatch Context
//!
//! "Which message am I handling" and "which saga am I running inside of",
//! discoverable by handler code without being passed explicitly.
//!
//! The state is per dispatch, never process-wide: the orchestrator creates a
//! fresh [`AmbientState`] for every unit of work and runs the whole unit
//! inside a `tokio::task_local!` scope holding it. Concurrent dispatches on
//! other tasks (or other worker threads) each see only their own state, and
//! code running outside any dispatch sees nothing.
//!
//! Values are set through scope guards ([`MessageScope`], [`SagaScope`]) that
//! clear on drop, so every exit path of a handler invocation, including an
//! error returned through `?` or an unwinding panic, releases them.

use crate::messages::Message;
use crate::saga::Saga;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

tokio::task_local! {
    static AMBIENT: Arc<AmbientState>;
}

/// Mutable ambient fields for one dispatch.
#[derive(Default)]
pub struct AmbientState {
    current_message: Mutex<Option<Message>>,
    current_saga: Mutex<Option<Arc<dyn Saga>>>,
}

impl AmbientState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn current_message(&self) -> Option<Message> {
        self.current_message.lock().clone()
    }

    pub fn current_saga(&self) -> Option<Arc<dyn Saga>> {
        self.current_saga.lock().clone()
    }

    pub fn set_current_message(&self, message: Message) {
        *self.current_message.lock() = Some(message);
    }

    pub fn clear_current_message(&self) {
        *self.current_message.lock() = None;
    }

    pub fn set_current_saga(&self, saga: Arc<dyn Saga>) {
        *self.current_saga.lock() = Some(saga);
    }

    pub fn clear_current_saga(&self) {
        *self.current_saga.lock() = None;
    }

    /// Mark `message` current until the returned guard drops
    #[must_use = "the message is cleared as soon as the guard is dropped"]
    pub fn enter_message(self: &Arc<Self>, message: Message) -> MessageScope {
        self.set_current_message(message);
        MessageScope {
            state: Arc::clone(self),
        }
    }

    /// Mark `saga` current until the returned guard drops
    #[must_use = "the saga is cleared as soon as the guard is dropped"]
    pub fn enter_saga(self: &Arc<Self>, saga: Arc<dyn Saga>) -> SagaScope {
        self.set_current_saga(saga);
        SagaScope {
            state: Arc::clone(self),
        }
    }
}

impl fmt::Debug for AmbientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmbientState")
            .field("current_message", &self.current_message())
            .field("current_saga", &self.current_saga())
            .finish()
    }
}

/// Clears the current message on drop
#[derive(Debug)]
pub struct MessageScope {
    state: Arc<AmbientState>,
}

impl Drop for MessageScope {
    fn drop(&mut self) {
        self.state.clear_current_message();
    }
}

/// Clears the current saga on drop
#[derive(Debug)]
pub struct SagaScope {
    state: Arc<AmbientState>,
}

impl Drop for SagaScope {
    fn drop(&mut self) {
        self.state.clear_current_saga();
    }
}

/// Run `future` with `state` as the ambient state of the current task
pub async fn scope<F: Future>(state: Arc<AmbientState>, future: F) -> F::Output {
    AMBIENT.scope(state, future).await
}

/// Ambient state of the dispatch running on the current task, if any
pub fn current() -> Option<Arc<AmbientState>> {
    AMBIENT.try_with(Arc::clone).ok()
}

/// Message currently being handled on this task
pub fn current_message() -> Option<Message> {
    current().and_then(|state| state.current_message())
}

/// Saga currently being invoked on this task
pub fn current_saga() -> Option<Arc<dyn Saga>> {
    current().and_then(|state| state.current_saga())
}
