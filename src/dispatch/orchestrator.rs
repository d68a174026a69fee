//! # Invoke Handlers Behavior
//!
//! The pipeline stage that dispatches every message of a unit of work to its
//! handlers.
//!
//! ## Dispatch Flow
//!
//! ```text
//! PipelineContext ──► messages present? ──no──► MessagesNotAvailable
//!                          │ yes
//!                          ▼
//!                ┌── for each message ◄──────────────┐
//!                │   mark current                    │
//!                │   handlers_for(message type)      │
//!                │     ├─ disabled → skip            │
//!                │     ├─ HandlerInvoker::invoke ?   │
//!                │     └─ chain aborted → next msg ──┘
//!                └── done ──► continuation()
//! ```
//!
//! Any error ends the unit immediately and the continuation is never called.

use super::ambient::{self, AmbientState};
use super::chain::ChainResetPolicy;
use super::context::{Behavior, Continuation, HandlerContext, PipelineContext};
use super::factory::DispatchOverrideResolver;
use super::invoker::HandlerInvoker;
use crate::config::DispatchConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::messages::{Message, TypeKey, UnitOfWork};
use crate::registry::{DependencyResolver, DispatcherMappings};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// What happened to one message of a unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDispatchOutcome {
    pub message_type: TypeKey,
    /// Handlers invoked, in invocation order
    pub invoked: Vec<TypeKey>,
    /// Disabled bindings that were passed over
    pub skipped_disabled: usize,
    /// Handler that stopped the chain, if one did
    pub aborted_by: Option<TypeKey>,
}

impl MessageDispatchOutcome {
    fn new(message_type: TypeKey) -> Self {
        Self {
            message_type,
            invoked: Vec::new(),
            skipped_disabled: 0,
            aborted_by: None,
        }
    }

    pub fn chain_aborted(&self) -> bool {
        self.aborted_by.is_some()
    }
}

/// Per-message outcomes of one unit of work, in message order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitDispatchReport {
    pub messages: Vec<MessageDispatchOutcome>,
}

impl UnitDispatchReport {
    pub fn handlers_invoked(&self) -> usize {
        self.messages.iter().map(|m| m.invoked.len()).sum()
    }

    pub fn chains_aborted(&self) -> usize {
        self.messages.iter().filter(|m| m.chain_aborted()).count()
    }

    pub fn skipped_disabled(&self) -> usize {
        self.messages.iter().map(|m| m.skipped_disabled).sum()
    }
}

/// Dispatch stage of the incoming pipeline.
#[derive(Debug, Clone, Default)]
pub struct InvokeHandlersBehavior {
    mappings: Arc<DispatcherMappings>,
    config: DispatchConfig,
}

impl InvokeHandlersBehavior {
    /// Behavior with no dispatch overrides and default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InvokeHandlersBehaviorBuilder {
        InvokeHandlersBehaviorBuilder::default()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn dispatcher_mappings(&self) -> &Arc<DispatcherMappings> {
        &self.mappings
    }

    /// Dispatch the unit of work on `context` without continuing the pipeline
    pub async fn dispatch_unit(&self, context: &PipelineContext) -> DispatchResult<UnitDispatchReport> {
        let unit = context
            .messages()
            .ok_or_else(|| DispatchError::messages_not_available(format!("{context:?}")))?;

        let state = AmbientState::new();
        ambient::scope(Arc::clone(&state), self.dispatch_messages(context, unit, &state)).await
    }

    async fn dispatch_messages(
        &self,
        context: &PipelineContext,
        unit: &UnitOfWork,
        state: &Arc<AmbientState>,
    ) -> DispatchResult<UnitDispatchReport> {
        let invoker = HandlerInvoker::new(DispatchOverrideResolver::new(
            Arc::clone(&self.mappings),
            Arc::clone(context.resolver()),
        ))
        .with_action_logging(self.config.log_dispatch_actions);

        let mut report = UnitDispatchReport::default();
        for (index, message) in unit.iter().enumerate() {
            if index > 0 && self.config.chain_reset == ChainResetPolicy::PerMessage {
                context.chain_signal().reset();
            }

            let _current = state.enter_message(message.clone());
            let outcome = self
                .dispatch_to_handlers(&invoker, context, message, state)
                .await?;
            report.messages.push(outcome);
        }

        Ok(report)
    }

    async fn dispatch_to_handlers(
        &self,
        invoker: &HandlerInvoker,
        context: &PipelineContext,
        message: &Message,
        state: &Arc<AmbientState>,
    ) -> DispatchResult<MessageDispatchOutcome> {
        let message_type = message.message_type();
        let handler_context =
            HandlerContext::new(message.clone(), context.chain_signal().clone(), Arc::clone(state));
        let mut outcome = MessageDispatchOutcome::new(message_type);

        for binding in context.handlers().handlers_for(&message_type) {
            if binding.is_invocation_disabled() {
                outcome.skipped_disabled += 1;
                continue;
            }

            let handler_type = binding.handler_type();
            invoker.invoke(&binding, message, &handler_context).await?;
            outcome.invoked.push(handler_type);

            if context.chain_aborted() {
                debug!(
                    "Handler {} requested downstream handlers of message {} to not be invoked",
                    handler_type.short_name(),
                    message_type.short_name()
                );
                outcome.aborted_by = Some(handler_type);
                break;
            }
        }

        Ok(outcome)
    }
}

#[async_trait]
impl Behavior for InvokeHandlersBehavior {
    async fn invoke<'a>(
        &'a self,
        context: &'a PipelineContext,
        next: Continuation<'a>,
    ) -> DispatchResult<()> {
        let report = self.dispatch_unit(context).await?;
        crate::logging::log_unit_dispatch(context.correlation_id(), &report);
        next().await
    }
}

/// Builder for [`InvokeHandlersBehavior`]
#[derive(Default)]
pub struct InvokeHandlersBehaviorBuilder {
    mappings: DispatcherMappings,
    config: DispatchConfig,
    validation_resolver: Option<Arc<dyn DependencyResolver>>,
}

impl InvokeHandlersBehaviorBuilder {
    #[must_use]
    pub fn dispatcher_mappings(mut self, mappings: DispatcherMappings) -> Self {
        self.mappings = mappings;
        self
    }

    #[must_use]
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolver used to validate the dispatcher mappings when building
    #[must_use]
    pub fn validate_against(mut self, resolver: Arc<dyn DependencyResolver>) -> Self {
        self.validation_resolver = Some(resolver);
        self
    }

    /// Build the behavior.
    ///
    /// With `validate_factories_on_startup` set and a validation resolver
    /// given, every dispatcher mapping must resolve to a factory.
    pub fn build(self) -> DispatchResult<InvokeHandlersBehavior> {
        let mappings = Arc::new(self.mappings);

        if self.config.validate_factories_on_startup {
            if let Some(resolver) = self.validation_resolver {
                DispatchOverrideResolver::new(Arc::clone(&mappings), resolver).validate()?;
            }
        }

        Ok(InvokeHandlersBehavior {
            mappings,
            config: self.config,
        })
    }
}
