#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Courier Core Rust
//!
//! In-process handler dispatch for a message bus incoming pipeline.
//!
//! ## Overview
//!
//! Once a transport has received a unit of work and earlier pipeline stages
//! have deserialized its messages, [`InvokeHandlersBehavior`] delivers every
//! message to each handler registered for its type, in order, and then
//! continues the pipeline.
//!
//! ## Key Features
//!
//! - **Chain abort**: a handler can stop the remaining handlers of the current
//!   message without affecting the next message
//! - **Dispatcher factories**: a handler type can be mapped to a factory that
//!   produces the actions run in its place, validated when the behavior is built
//! - **Saga context**: saga handlers are visible as the ambient current saga
//!   for exactly the duration of their turn
//! - **Task-local ambient state**: concurrent units of work never observe each
//!   other's current message or saga
//!
//! ## Module Organization
//!
//! - [`dispatch`] - Orchestrator, invoker, factory overrides and ambient context
//! - [`registry`] - Handler directory, dependency resolver and dispatcher mappings
//! - [`messages`] - Messages, units of work and type keys
//! - [`saga`] - Saga capability
//! - [`config`] - Dispatch configuration loading
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging initialization
//!
//! ## Quick Start
//!
//! ```rust
//! use courier_core::prelude::*;
//! use std::sync::Arc;
//!
//! struct OrderPlaced;
//!
//! struct SendConfirmation;
//! impl Handler for SendConfirmation {}
//!
//! #[async_trait::async_trait]
//! impl Handle<OrderPlaced> for SendConfirmation {
//!     async fn handle(&self, _message: &OrderPlaced, _context: &HandlerContext) -> Result<(), BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), DispatchError> {
//! let handlers = LoadedMessageHandlers::new();
//! handlers.register::<OrderPlaced, _>(Arc::new(SendConfirmation));
//!
//! let context = PipelineContext::new(
//!     Arc::new(InMemoryDependencyResolver::new()),
//!     Arc::new(handlers),
//! )
//! .with_messages(vec![Message::new(OrderPlaced)]);
//!
//! InvokeHandlersBehavior::new()
//!     .invoke(&context, end_of_pipeline())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod messages;
pub mod registry;
pub mod saga;

pub use config::{ConfigLoader, DispatchConfig};
pub use dispatch::{
    Behavior, ChainResetPolicy, ChainSignal, DispatchAction, DispatchRequest, DispatcherFactory,
    HandlerContext, InvokeHandlersBehavior, PipelineContext, UnitDispatchReport,
};
pub use error::{BoxError, DispatchError, DispatchResult, FailureCategory};
pub use messages::{Message, TypeKey, UnitOfWork};
pub use registry::{
    Component, DependencyResolver, DispatcherMappings, Handle, Handler, HandlerBinding,
    HandlerDirectory, InMemoryDependencyResolver, LoadedMessageHandlers,
};
pub use saga::Saga;

/// Common imports for handler and host code
pub mod prelude {
    pub use crate::dispatch::{
        continuation, end_of_pipeline, Behavior, ChainResetPolicy, Continuation, DispatchAction,
        DispatchRequest, DispatcherFactory, HandlerContext, InvokeHandlersBehavior,
        PipelineContext,
    };
    pub use crate::error::{BoxError, DispatchError, DispatchResult};
    pub use crate::messages::{Message, TypeKey, UnitOfWork};
    pub use crate::registry::{
        Component, DependencyResolver, DispatcherMappings, Handle, Handler, HandlerDirectory,
        InMemoryDependencyResolver, LoadedMessageHandlers,
    };
    pub use crate::saga::Saga;
}
