//! # Registry Infrastructure
//!
//! Collaborators the dispatch stage consumes at its interface.
//!
//! ## Available Registries
//!
//! - **HandlerDirectory**: ordered handler bindings per message type
//! - **DependencyResolver**: builds components, including dispatcher factories
//! - **DispatcherMappings**: handler type to dispatcher factory type
//!
//! ## Architecture
//!
//! ```text
//! Registry Infrastructure
//! ├── LoadedMessageHandlers       (HandlerDirectory, per message type)
//! ├── InMemoryDependencyResolver  (DependencyResolver, per component type)
//! └── DispatcherMappings          (bus configuration, per handler type)
//! ```

pub mod dependency_resolver;
pub mod dispatcher_mappings;
pub mod handler_directory;

pub use dependency_resolver::{Component, DependencyResolver, InMemoryDependencyResolver};
pub use dispatcher_mappings::DispatcherMappings;
pub use handler_directory::{
    Handle, Handler, HandlerBinding, HandlerDirectory, HandlerDirectoryStats, Invocation,
    InvocationFuture, LoadedMessageHandlers,
};
