//! Error types for the dispatch stage.
//!
//! Two broad categories reach the enclosing pipeline:
//! - configuration errors, which indicate a deployment/setup defect
//! - message processing failures, which are attributable to a handler

use crate::messages::TypeKey;
use thiserror::Error;

/// Boxed error returned by application handler code
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The unit of work was never attached to the pipeline context
    #[error("Messages not available at this pipeline stage: {context} - handler dispatch must run after the messages have been extracted")]
    MessagesNotAvailable { context: String },

    /// A dispatcher factory mapping resolved to a component without the factory capability
    #[error("Registered dispatcher factory {factory_type} for type {handler_type} does not implement DispatcherFactory")]
    InvalidDispatcherFactory {
        factory_type: String,
        handler_type: String,
    },

    /// A dispatcher factory mapping names a type the dependency resolver cannot build
    #[error("Dispatcher factory {factory_type} registered for type {handler_type} could not be built by the dependency resolver")]
    DispatcherFactoryNotRegistered {
        factory_type: String,
        handler_type: String,
    },

    /// A custom dispatch action failed; wraps the original cause
    #[error("{handler_type} failed handling message")]
    HandlerInvocationFailed {
        handler_type: String,
        #[source]
        source: BoxError,
    },

    /// A directly invoked handler failed; the original error, untouched
    #[error(transparent)]
    Handler(BoxError),
}

/// Routing hint for the enclosing pipeline's error handling stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// Deployment/setup defect; retrying the message will not help
    Configuration,
    /// Message processing defect attributable to a handler
    MessageProcessing,
}

impl DispatchError {
    pub fn messages_not_available(context: impl Into<String>) -> Self {
        Self::MessagesNotAvailable {
            context: context.into(),
        }
    }

    pub fn invalid_dispatcher_factory(factory_type: &TypeKey, handler_type: &TypeKey) -> Self {
        Self::InvalidDispatcherFactory {
            factory_type: factory_type.short_name(),
            handler_type: handler_type.short_name(),
        }
    }

    pub fn dispatcher_factory_not_registered(
        factory_type: &TypeKey,
        handler_type: &TypeKey,
    ) -> Self {
        Self::DispatcherFactoryNotRegistered {
            factory_type: factory_type.short_name(),
            handler_type: handler_type.short_name(),
        }
    }

    pub fn handler_invocation_failed(handler_type: &TypeKey, source: BoxError) -> Self {
        Self::HandlerInvocationFailed {
            handler_type: handler_type.short_name(),
            source,
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            Self::MessagesNotAvailable { .. }
            | Self::InvalidDispatcherFactory { .. }
            | Self::DispatcherFactoryNotRegistered { .. } => FailureCategory::Configuration,
            Self::HandlerInvocationFailed { .. } | Self::Handler(_) => {
                FailureCategory::MessageProcessing
            }
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == FailureCategory::Configuration
    }

    /// Handler blamed for the failure, when the error carries one
    pub fn handler_type(&self) -> Option<&str> {
        match self {
            Self::HandlerInvocationFailed { handler_type, .. } => Some(handler_type),
            Self::InvalidDispatcherFactory { handler_type, .. }
            | Self::DispatcherFactoryNotRegistered { handler_type, .. } => Some(handler_type),
            _ => None,
        }
    }

    /// Downcast the underlying handler error, for either failure path
    pub fn downcast_handler_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Handler(inner) | Self::HandlerInvocationFailed { source: inner, .. } => {
                inner.downcast_ref::<E>()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error)]
    #[error("card declined")]
    struct CardDeclined;

    struct PaymentHandler;
    struct RetryingFactory;

    #[test]
    fn test_configuration_errors_name_both_types() {
        let error = DispatchError::invalid_dispatcher_factory(
            &TypeKey::of::<RetryingFactory>(),
            &TypeKey::of::<PaymentHandler>(),
        );

        assert_eq!(
            error.to_string(),
            "Registered dispatcher factory RetryingFactory for type PaymentHandler does not implement DispatcherFactory"
        );
        assert_eq!(error.handler_type(), Some("PaymentHandler"));
        assert!(error.is_configuration_error());
        assert_eq!(error.category(), FailureCategory::Configuration);
    }

    #[test]
    fn test_wrapped_failure_keeps_cause() {
        let error = DispatchError::handler_invocation_failed(
            &TypeKey::of::<PaymentHandler>(),
            Box::new(CardDeclined),
        );

        assert_eq!(error.to_string(), "PaymentHandler failed handling message");
        assert_eq!(error.handler_type(), Some("PaymentHandler"));
        assert_eq!(error.category(), FailureCategory::MessageProcessing);
        assert_eq!(error.source().map(ToString::to_string), Some("card declined".to_string()));
        assert!(error.downcast_handler_error::<CardDeclined>().is_some());
    }

    #[test]
    fn test_unwrapped_failure_is_transparent() {
        let error = DispatchError::Handler(Box::new(CardDeclined));

        assert_eq!(error.to_string(), "card declined");
        assert!(error.handler_type().is_none());
        assert!(error.downcast_handler_error::<CardDeclined>().is_some());
        assert!(!error.is_configuration_error());
    }
}
