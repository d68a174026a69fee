//! # Dispatch Overrides
//!
//! A dispatcher factory replaces the direct "call the handler" path for one
//! handler type with a sequence of custom [`DispatchAction`]s, e.g. to wrap
//! the call in a retry loop or route it through an adapter.
//!
//! Which handler types are overridden is bus configuration
//! ([`DispatcherMappings`]); the factory instance itself is built through the
//! [`DependencyResolver`]. [`DispatchOverrideResolver`] ties the two together
//! and enforces that the mapped component actually is a factory.

use super::context::HandlerContext;
use crate::error::{BoxError, DispatchError, DispatchResult};
use crate::messages::{Message, TypeKey};
use crate::registry::{DependencyResolver, DispatcherMappings, Handler};
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// One deferred unit of custom dispatch work.
pub struct DispatchAction {
    action: Box<dyn FnOnce() -> BoxFuture<'static, Result<(), BoxError>> + Send>,
}

impl DispatchAction {
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self {
            action: Box::new(move || -> BoxFuture<'static, Result<(), BoxError>> {
                Box::pin(action())
            }),
        }
    }

    pub async fn run(self) -> Result<(), BoxError> {
        (self.action)().await
    }
}

impl fmt::Debug for DispatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchAction").finish_non_exhaustive()
    }
}

/// Everything a factory may need to build its actions.
#[derive(Clone, Copy)]
pub struct DispatchRequest<'a> {
    /// Concrete type of the handler being dispatched to
    pub handler_type: TypeKey,
    /// Handler instance resolved by the directory
    pub handler: &'a Arc<dyn Handler>,
    pub message: &'a Message,
    pub resolver: &'a dyn DependencyResolver,
    pub context: &'a HandlerContext,
}

/// Produces the custom dispatch actions for a handler type.
pub trait DispatcherFactory: Send + Sync {
    /// Actions to run, in order, instead of invoking the handler directly
    fn get_dispatcher(&self, request: DispatchRequest<'_>) -> Result<Vec<DispatchAction>, BoxError>;
}

/// Finds the dispatcher factory overriding a handler type, if any.
#[derive(Clone)]
pub struct DispatchOverrideResolver {
    mappings: Arc<DispatcherMappings>,
    resolver: Arc<dyn DependencyResolver>,
}

impl DispatchOverrideResolver {
    pub fn new(mappings: Arc<DispatcherMappings>, resolver: Arc<dyn DependencyResolver>) -> Self {
        Self { mappings, resolver }
    }

    pub fn resolver(&self) -> &Arc<dyn DependencyResolver> {
        &self.resolver
    }

    /// `Ok(None)` means the handler is invoked directly.
    ///
    /// A mapping to a component without the factory capability is a
    /// configuration error naming both types.
    pub fn resolve(&self, handler_type: &TypeKey) -> DispatchResult<Option<Arc<dyn DispatcherFactory>>> {
        let Some(factory_type) = self.mappings.lookup(handler_type) else {
            return Ok(None);
        };

        let component = self.resolver.build(&factory_type).ok_or_else(|| {
            DispatchError::dispatcher_factory_not_registered(&factory_type, handler_type)
        })?;

        component
            .as_dispatcher_factory()
            .map(Some)
            .ok_or_else(|| DispatchError::invalid_dispatcher_factory(&factory_type, handler_type))
    }

    /// Check every mapping up front.
    ///
    /// Returns the number of mappings validated.
    pub fn validate(&self) -> DispatchResult<usize> {
        let mut validated = 0;
        for (handler_type, factory_type) in self.mappings.iter() {
            self.resolve(handler_type)?;
            debug!(
                handler_type = %handler_type.short_name(),
                factory_type = %factory_type.short_name(),
                "Validated dispatcher factory mapping"
            );
            validated += 1;
        }

        if validated > 0 {
            info!(mappings = validated, "Dispatcher factory mappings validated");
        }
        Ok(validated)
    }
}

impl fmt::Debug for DispatchOverrideResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchOverrideResolver")
            .field("mappings", &self.mappings.len())
            .finish_non_exhaustive()
    }
}
