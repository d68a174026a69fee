//! # Pipeline and Handler Contexts
//!
//! [`PipelineContext`] is what the enclosing pipeline hands to this stage:
//! the unit of work, the dependency resolver, the handler directory, and the
//! chain signal. [`HandlerContext`] is the per-message view passed to each
//! handler invocation.
//!
//! [`Behavior`] and [`Continuation`] are the interface to the outer
//! behavior chain, which lives outside this crate.

use super::ambient::AmbientState;
use super::chain::ChainSignal;
use crate::error::DispatchResult;
use crate::messages::{Message, UnitOfWork};
use crate::registry::{DependencyResolver, HandlerDirectory};
use crate::saga::Saga;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// State of one incoming pipeline pass, as seen by the dispatch stage.
pub struct PipelineContext {
    messages: Option<UnitOfWork>,
    resolver: Arc<dyn DependencyResolver>,
    handlers: Arc<dyn HandlerDirectory>,
    chain: ChainSignal,
    correlation_id: Option<String>,
}

impl PipelineContext {
    /// Context without messages; an earlier stage attaches them
    pub fn new(resolver: Arc<dyn DependencyResolver>, handlers: Arc<dyn HandlerDirectory>) -> Self {
        Self {
            messages: None,
            resolver,
            handlers,
            chain: ChainSignal::new(),
            correlation_id: None,
        }
    }

    #[must_use]
    pub fn with_messages(mut self, messages: impl Into<UnitOfWork>) -> Self {
        self.messages = Some(messages.into());
        self
    }

    #[must_use]
    pub fn with_chain_signal(mut self, chain: ChainSignal) -> Self {
        self.chain = chain;
        self
    }

    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn messages(&self) -> Option<&UnitOfWork> {
        self.messages.as_ref()
    }

    pub fn resolver(&self) -> &Arc<dyn DependencyResolver> {
        &self.resolver
    }

    pub fn handlers(&self) -> &Arc<dyn HandlerDirectory> {
        &self.handlers
    }

    pub fn chain_signal(&self) -> &ChainSignal {
        &self.chain
    }

    /// True if a handler asked to stop the chain for the message in progress
    pub fn chain_aborted(&self) -> bool {
        self.chain.is_aborted()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }
}

impl fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineContext")
            .field("correlation_id", &self.correlation_id)
            .field("messages", &self.messages.as_ref().map(UnitOfWork::len))
            .field("chain_aborted", &self.chain.is_aborted())
            .finish_non_exhaustive()
    }
}

/// What a handler sees while it runs.
///
/// Cheap to clone; clones share the chain signal and ambient state.
#[derive(Clone)]
pub struct HandlerContext {
    message: Message,
    chain: ChainSignal,
    ambient: Arc<AmbientState>,
}

impl HandlerContext {
    pub fn new(message: Message, chain: ChainSignal, ambient: Arc<AmbientState>) -> Self {
        Self {
            message,
            chain,
            ambient,
        }
    }

    /// Message being dispatched
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Stop invoking the remaining handlers for the current message.
    ///
    /// Handlers already invoked and other messages in the unit are unaffected.
    pub fn do_not_continue_dispatching_current_message(&self) {
        self.chain.abort();
    }

    pub fn chain_aborted(&self) -> bool {
        self.chain.is_aborted()
    }

    /// Saga currently being invoked, if the running handler is one
    pub fn current_saga(&self) -> Option<Arc<dyn Saga>> {
        self.ambient.current_saga()
    }

    pub fn ambient(&self) -> &Arc<AmbientState> {
        &self.ambient
    }
}

impl fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("message", &self.message)
            .field("chain_aborted", &self.chain.is_aborted())
            .finish()
    }
}

/// One-shot callback that resumes the enclosing pipeline
pub type Continuation<'a> = Box<dyn FnOnce() -> BoxFuture<'a, DispatchResult<()>> + Send + 'a>;

/// Wrap an async closure as a [`Continuation`]
pub fn continuation<'a, F, Fut>(next: F) -> Continuation<'a>
where
    F: FnOnce() -> Fut + Send + 'a,
    Fut: Future<Output = DispatchResult<()>> + Send + 'a,
{
    Box::new(move || -> BoxFuture<'a, DispatchResult<()>> { Box::pin(next()) })
}

/// Continuation for the last stage of a pipeline
pub fn end_of_pipeline<'a>() -> Continuation<'a> {
    continuation(|| async { Ok(()) })
}

/// A stage of the incoming message pipeline.
#[async_trait]
pub trait Behavior: Send + Sync {
    async fn invoke<'a>(
        &'a self,
        context: &'a PipelineContext,
        next: Continuation<'a>,
    ) -> DispatchResult<()>;
}
