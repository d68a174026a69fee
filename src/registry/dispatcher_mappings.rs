//! # Dispatcher Mappings
//!
//! Bus configuration that maps a handler type to the dispatcher factory
//! component that overrides its direct invocation.

use crate::messages::TypeKey;
use std::collections::HashMap;

/// Handler type to dispatcher factory type mapping.
#[derive(Debug, Clone, Default)]
pub struct DispatcherMappings {
    mappings: HashMap<TypeKey, TypeKey>,
}

impl DispatcherMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch handler `H` through factory component `F`
    #[must_use]
    pub fn with_mapping<H: ?Sized + 'static, F: ?Sized + 'static>(mut self) -> Self {
        self.insert(TypeKey::of::<H>(), TypeKey::of::<F>());
        self
    }

    /// Insert or replace the factory for `handler_type`, returning the previous one
    pub fn insert(&mut self, handler_type: TypeKey, factory_type: TypeKey) -> Option<TypeKey> {
        self.mappings.insert(handler_type, factory_type)
    }

    pub fn lookup(&self, handler_type: &TypeKey) -> Option<TypeKey> {
        self.mappings.get(handler_type).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeKey, &TypeKey)> {
        self.mappings.iter()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
