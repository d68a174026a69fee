//! # Saga Capability
//!
//! A saga is a long-lived, stateful handler tied to one conversation or
//! business process. While a saga instance is being invoked it is exposed as
//! the ambient "current saga" so code running inside the invocation can find
//! it without being handed a reference.
//!
//! Persistence of saga state is the host's concern; this crate only needs a
//! stable identity to expose.

use std::fmt;
use uuid::Uuid;

/// A handler instance associated with a long-running process.
pub trait Saga: Send + Sync + 'static {
    /// Identifier of the saga instance (the correlated process)
    fn saga_id(&self) -> Uuid;

    /// Name used in logs
    fn saga_name(&self) -> String {
        crate::messages::TypeKey::of::<Self>().short_name()
    }
}

impl fmt::Debug for dyn Saga {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Saga")
            .field("saga_id", &self.saga_id())
            .field("saga_name", &self.saga_name())
            .finish()
    }
}
