//! Proptest strategies for dispatch plans.

use proptest::prelude::*;

/// Shape of one generated unit of work.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    /// Per handler position, whether its binding is disabled
    pub disabled: Vec<bool>,
    /// Per message, the handler position that stops the chain
    pub aborts: Vec<Option<usize>>,
}

impl DispatchPlan {
    pub fn handler_count(&self) -> usize {
        self.disabled.len()
    }
}

pub fn dispatch_plan_strategy() -> impl Strategy<Value = DispatchPlan> {
    (1usize..6).prop_flat_map(|handlers| {
        (
            prop::collection::vec(prop::bool::weighted(0.2), handlers),
            prop::collection::vec(prop::option::of(0..handlers), 0..8),
        )
            .prop_map(|(disabled, aborts)| DispatchPlan { disabled, aborts })
    })
}
