//! # Dispatch
//!
//! The handler invocation stage of the incoming message pipeline.
//!
//! - [`orchestrator`] walks a unit of work and drives each message's handler chain
//! - [`invoker`] runs one handler, directly or through a dispatcher factory
//! - [`factory`] resolves dispatcher factory overrides
//! - [`ambient`] holds the task-local current message and current saga
//! - [`chain`] is the per-message "stop dispatching" signal
//! - [`context`] carries the pipeline and handler contexts

pub mod ambient;
pub mod chain;
pub mod context;
pub mod factory;
pub mod invoker;
pub mod orchestrator;

pub use ambient::{AmbientState, MessageScope, SagaScope};
pub use chain::{ChainResetPolicy, ChainSignal};
pub use context::{continuation, end_of_pipeline, Behavior, Continuation, HandlerContext, PipelineContext};
pub use factory::{DispatchAction, DispatchOverrideResolver, DispatchRequest, DispatcherFactory};
pub use invoker::HandlerInvoker;
pub use orchestrator::{
    InvokeHandlersBehavior, InvokeHandlersBehaviorBuilder, MessageDispatchOutcome,
    UnitDispatchReport,
};
