//! Builders for pipeline contexts used across the integration tests.

use courier_core::logging::init_structured_logging;
use courier_core::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Handlers, components and messages for one dispatch run.
pub struct PipelineBuilder {
    handlers: LoadedMessageHandlers,
    resolver: InMemoryDependencyResolver,
    messages: Vec<Message>,
    correlation_id: Option<String>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        init_structured_logging();
        Self {
            handlers: LoadedMessageHandlers::new(),
            resolver: InMemoryDependencyResolver::new(),
            messages: Vec::new(),
            correlation_id: None,
        }
    }

    pub fn handler<M, H>(self, handler: Arc<H>) -> Self
    where
        M: Send + Sync + 'static,
        H: Handle<M>,
    {
        self.handlers.register::<M, H>(handler);
        self
    }

    pub fn component<C: Component>(self, component: C) -> Self {
        self.resolver.register_singleton(component);
        self
    }

    pub fn message<T: Send + Sync + 'static>(mut self, body: T) -> Self {
        self.messages.push(Message::new(body));
        self
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.correlation_id = Some(id.to_string());
        self
    }

    pub fn handlers(&self) -> &LoadedMessageHandlers {
        &self.handlers
    }

    pub fn build(self) -> PipelineContext {
        let context = PipelineContext::new(Arc::new(self.resolver), Arc::new(self.handlers))
            .with_messages(self.messages);
        match self.correlation_id {
            Some(id) => context.with_correlation_id(id),
            None => context,
        }
    }

    /// Context without any unit of work attached
    pub fn build_without_messages(self) -> PipelineContext {
        PipelineContext::new(Arc::new(self.resolver), Arc::new(self.handlers))
    }

    /// Resolver for builder-time validation, sharing nothing with the context
    pub fn resolver_for_validation<C: Component>(component: C) -> Arc<dyn DependencyResolver> {
        let resolver = InMemoryDependencyResolver::new();
        resolver.register_singleton(component);
        Arc::new(resolver)
    }
}

/// Counts how many times the pipeline continued past the dispatch stage.
#[derive(Clone, Default)]
pub struct ContinuationProbe {
    calls: Arc<AtomicUsize>,
}

impl ContinuationProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next<'a>(&self) -> Continuation<'a> {
        let calls = Arc::clone(&self.calls);
        continuation(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
