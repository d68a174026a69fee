//! # Handler Invoker
//!
//! Runs one handler's turn for one message, either through its dispatcher
//! factory or through the binding's pre-bound delegate.
//!
//! ## Error Handling
//!
//! The two paths report failures differently:
//! - factory path: the failing action's error is logged at warn level and
//!   wrapped in [`DispatchError::HandlerInvocationFailed`]; remaining actions
//!   for the handler do not run
//! - direct path: the handler's error is passed through untouched as
//!   [`DispatchError::Handler`]
//!
//! A saga handler is the ambient current saga for the whole turn, on both
//! paths and on every exit.

use super::context::HandlerContext;
use super::factory::{DispatchOverrideResolver, DispatchRequest, DispatcherFactory};
use crate::error::{DispatchError, DispatchResult};
use crate::messages::{Message, TypeKey};
use crate::registry::HandlerBinding;
use std::sync::Arc;
use tracing::{debug, warn};

/// Invokes handler bindings, honouring dispatch overrides.
#[derive(Debug, Clone)]
pub struct HandlerInvoker {
    overrides: DispatchOverrideResolver,
    log_dispatch_actions: bool,
}

impl HandlerInvoker {
    pub fn new(overrides: DispatchOverrideResolver) -> Self {
        Self {
            overrides,
            log_dispatch_actions: true,
        }
    }

    #[must_use]
    pub fn with_action_logging(mut self, enabled: bool) -> Self {
        self.log_dispatch_actions = enabled;
        self
    }

    /// Invoke `binding` with `message`
    pub async fn invoke(
        &self,
        binding: &HandlerBinding,
        message: &Message,
        context: &HandlerContext,
    ) -> DispatchResult<()> {
        let handler_type = binding.handler_type();

        let _saga_scope = Arc::clone(binding.instance())
            .as_saga()
            .map(|saga| context.ambient().enter_saga(saga));

        match self.overrides.resolve(&handler_type)? {
            Some(factory) => {
                self.dispatch_through_factory(factory.as_ref(), binding, handler_type, message, context)
                    .await
            }
            None => binding
                .invoke(message.clone(), context.clone())
                .await
                .map_err(DispatchError::Handler),
        }
    }

    async fn dispatch_through_factory(
        &self,
        factory: &dyn DispatcherFactory,
        binding: &HandlerBinding,
        handler_type: TypeKey,
        message: &Message,
        context: &HandlerContext,
    ) -> DispatchResult<()> {
        let request = DispatchRequest {
            handler_type,
            handler: binding.instance(),
            message,
            resolver: self.overrides.resolver().as_ref(),
            context,
        };
        let message_type = message.message_type();

        let actions = factory.get_dispatcher(request).map_err(|e| {
            warn!(
                handler_type = %handler_type.short_name(),
                error = %e,
                "{} failed handling message.",
                handler_type.short_name()
            );
            DispatchError::handler_invocation_failed(&handler_type, e)
        })?;

        for action in actions {
            if self.log_dispatch_actions {
                debug!(
                    "Dispatching message '{}' to handler '{}'",
                    message_type.short_name(),
                    handler_type.short_name()
                );
            }

            if let Err(e) = action.run().await {
                warn!(
                    handler_type = %handler_type.short_name(),
                    message_type = %message_type.short_name(),
                    error = %e,
                    "{} failed handling message.",
                    handler_type.short_name()
                );
                return Err(DispatchError::handler_invocation_failed(&handler_type, e));
            }
        }

        Ok(())
    }
}
