//! Cooperative handler chain abort.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// "Stop invoking further handlers for the message in progress."
///
/// Owned by the pipeline context and shared with every handler through its
/// [`HandlerContext`](super::context::HandlerContext). Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct ChainSignal {
    aborted: Arc<AtomicBool>,
}

impl ChainSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.aborted.store(false, Ordering::Release);
    }
}

/// When the dispatcher clears the [`ChainSignal`] within one unit of work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainResetPolicy {
    /// Cleared between messages; an abort never leaks into the next message.
    /// A signal already set when the unit starts applies to the first message.
    #[default]
    PerMessage,
    /// Never cleared by the dispatcher. A signal still set when the next
    /// message starts stops that message's chain after its first handler.
    Inherited,
}
