//! # Handler Directory
//!
//! Handler instances, their pre-bound invocation delegates, and the directory
//! that yields them per message type.
//!
//! The dispatch stage never decides which handlers apply to a message; it
//! asks a [`HandlerDirectory`] and invokes what comes back, in the order it
//! comes back. [`LoadedMessageHandlers`] is the in-memory directory used when
//! the host has already resolved its handler set.
//!
//! ## Usage
//!
//! ```rust
//! use courier_core::prelude::*;
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct OrderPlaced;
//! struct BillingHandler;
//!
//! impl Handler for BillingHandler {}
//!
//! #[async_trait]
//! impl Handle<OrderPlaced> for BillingHandler {
//!     async fn handle(&self, _message: &OrderPlaced, _context: &HandlerContext) -> Result<(), BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! let handlers = LoadedMessageHandlers::new();
//! handlers.register::<OrderPlaced, _>(Arc::new(BillingHandler));
//! assert_eq!(handlers.handlers_for(&TypeKey::of::<OrderPlaced>()).len(), 1);
//! ```

use crate::dispatch::context::HandlerContext;
use crate::error::BoxError;
use crate::messages::{Message, TypeKey};
use crate::saga::Saga;
use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A registered unit of application logic.
///
/// The trait carries identity and capabilities only; message handling lives
/// in [`Handle`].
pub trait Handler: Send + Sync + 'static {
    /// Concrete type of the handler, used for dispatch override lookup
    fn handler_type(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    /// Saga capability. Sagas return themselves so the dispatcher can expose
    /// them as the ambient current saga while they run.
    fn as_saga(self: Arc<Self>) -> Option<Arc<dyn Saga>> {
        None
    }
}

/// Message handling for one message type.
#[async_trait]
pub trait Handle<M: Send + Sync + 'static>: Handler {
    async fn handle(&self, message: &M, context: &HandlerContext) -> Result<(), BoxError>;
}

pub type InvocationFuture = BoxFuture<'static, Result<(), BoxError>>;

/// Pre-bound delegate that calls a handler with a message
pub type Invocation = Arc<dyn Fn(Message, HandlerContext) -> InvocationFuture + Send + Sync>;

/// One resolved (handler instance, invocation delegate) pair for a message type.
#[derive(Clone)]
pub struct HandlerBinding {
    instance: Arc<dyn Handler>,
    invocation: Invocation,
    invocation_disabled: bool,
}

impl HandlerBinding {
    /// Bind a typed handler for messages of type `M`
    pub fn for_handler<M, H>(handler: Arc<H>) -> Self
    where
        M: Send + Sync + 'static,
        H: Handle<M>,
    {
        let typed = Arc::clone(&handler);
        let invocation: Invocation = Arc::new(move |message: Message, context: HandlerContext| -> InvocationFuture {
            let handler = Arc::clone(&typed);
            Box::pin(async move {
                let body = message.downcast_ref::<M>().ok_or_else(|| -> BoxError {
                    format!(
                        "handler {} bound for {} received {}",
                        TypeKey::of::<H>().short_name(),
                        TypeKey::of::<M>().short_name(),
                        message.message_type().short_name()
                    )
                    .into()
                })?;
                handler.handle(body, &context).await
            })
        });

        Self {
            instance: handler,
            invocation,
            invocation_disabled: false,
        }
    }

    /// Bind an arbitrary delegate to a handler instance
    pub fn from_invocation(instance: Arc<dyn Handler>, invocation: Invocation) -> Self {
        Self {
            instance,
            invocation,
            invocation_disabled: false,
        }
    }

    #[must_use]
    pub fn with_invocation_disabled(mut self, disabled: bool) -> Self {
        self.invocation_disabled = disabled;
        self
    }

    pub fn instance(&self) -> &Arc<dyn Handler> {
        &self.instance
    }

    pub fn handler_type(&self) -> TypeKey {
        self.instance.handler_type()
    }

    pub fn is_invocation_disabled(&self) -> bool {
        self.invocation_disabled
    }

    /// Call the pre-bound delegate
    pub fn invoke(&self, message: Message, context: HandlerContext) -> InvocationFuture {
        (self.invocation)(message, context)
    }
}

impl fmt::Debug for HandlerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("handler_type", &self.handler_type().short_name())
            .field("invocation_disabled", &self.invocation_disabled)
            .finish()
    }
}

/// Source of handler bindings per message type.
///
/// Implementations must be idempotent and side-effect free: the dispatcher
/// may ask for the same type several times within one unit of work.
pub trait HandlerDirectory: Send + Sync {
    /// Bindings for `message_type`, in invocation order
    fn handlers_for(&self, message_type: &TypeKey) -> Vec<HandlerBinding>;
}

/// In-memory handler directory keyed by exact message type.
///
/// Registration order is invocation order.
#[derive(Default)]
pub struct LoadedMessageHandlers {
    bindings: DashMap<TypeKey, Vec<HandlerBinding>>,
}

impl LoadedMessageHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed handler for messages of type `M`
    pub fn register<M, H>(&self, handler: Arc<H>)
    where
        M: Send + Sync + 'static,
        H: Handle<M>,
    {
        self.register_binding(TypeKey::of::<M>(), HandlerBinding::for_handler::<M, H>(handler));
    }

    /// Register a pre-built binding, appended after existing bindings for the type
    pub fn register_binding(&self, message_type: TypeKey, binding: HandlerBinding) {
        debug!(
            message_type = %message_type.short_name(),
            handler_type = %binding.handler_type().short_name(),
            "Registered message handler"
        );
        self.bindings.entry(message_type).or_default().push(binding);
    }

    /// Toggle invocation of every binding of `handler_type`.
    ///
    /// Returns the number of bindings changed.
    pub fn set_invocation_disabled(&self, handler_type: &TypeKey, disabled: bool) -> usize {
        let mut changed = 0;
        for mut entry in self.bindings.iter_mut() {
            for binding in entry.value_mut().iter_mut() {
                if binding.handler_type() == *handler_type
                    && binding.invocation_disabled != disabled
                {
                    binding.invocation_disabled = disabled;
                    changed += 1;
                }
            }
        }

        if changed == 0 {
            warn!(
                handler_type = %handler_type.short_name(),
                "No handler bindings changed invocation state"
            );
        } else {
            info!(
                handler_type = %handler_type.short_name(),
                disabled = disabled,
                bindings = changed,
                "Toggled handler invocation"
            );
        }
        changed
    }

    pub fn has_handlers_for(&self, message_type: &TypeKey) -> bool {
        self.bindings
            .get(message_type)
            .map(|bindings| !bindings.is_empty())
            .unwrap_or(false)
    }

    pub fn stats(&self) -> HandlerDirectoryStats {
        let mut stats = HandlerDirectoryStats::default();
        for entry in self.bindings.iter() {
            stats.message_types += 1;
            for binding in entry.value() {
                stats.total_bindings += 1;
                if binding.invocation_disabled {
                    stats.disabled_bindings += 1;
                }
            }
        }
        stats
    }
}

impl HandlerDirectory for LoadedMessageHandlers {
    fn handlers_for(&self, message_type: &TypeKey) -> Vec<HandlerBinding> {
        self.bindings
            .get(message_type)
            .map(|bindings| bindings.value().clone())
            .unwrap_or_default()
    }
}

impl fmt::Debug for LoadedMessageHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedMessageHandlers")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Statistics about a handler directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerDirectoryStats {
    pub message_types: usize,
    pub total_bindings: usize,
    pub disabled_bindings: usize,
}
