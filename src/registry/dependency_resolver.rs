//! # Dependency Resolver
//!
//! Builds components (dispatcher factories and anything else the host wires
//! through the container) by type.
//!
//! Capabilities are queried explicitly: a built component states whether it
//! can act as a [`DispatcherFactory`] through
//! [`Component::as_dispatcher_factory`], so a mapping that points at the wrong
//! type is detected as a configuration error instead of a failed cast.

use crate::dispatch::factory::DispatcherFactory;
use crate::messages::TypeKey;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Anything the dependency resolver can build.
pub trait Component: Send + Sync + 'static {
    fn component_type(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    /// Factory capability; factories return themselves
    fn as_dispatcher_factory(self: Arc<Self>) -> Option<Arc<dyn DispatcherFactory>> {
        None
    }
}

/// Constructs component instances by type.
pub trait DependencyResolver: Send + Sync {
    /// Build an instance of `component_type`, or `None` if the type is unknown
    fn build(&self, component_type: &TypeKey) -> Option<Arc<dyn Component>>;
}

type ComponentConstructor = Arc<dyn Fn() -> Arc<dyn Component> + Send + Sync>;

#[derive(Clone)]
enum Registration {
    Singleton(Arc<dyn Component>),
    Transient(ComponentConstructor),
}

/// Container of singleton and transient component registrations.
#[derive(Default)]
pub struct InMemoryDependencyResolver {
    registrations: DashMap<TypeKey, Registration>,
}

impl InMemoryDependencyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one shared instance, returned on every build
    pub fn register_singleton<C: Component>(&self, component: C) {
        self.insert(TypeKey::of::<C>(), Registration::Singleton(Arc::new(component)));
    }

    /// Register a constructor, called on every build
    pub fn register_transient<C, F>(&self, constructor: F)
    where
        C: Component,
        F: Fn() -> C + Send + Sync + 'static,
    {
        let constructor: ComponentConstructor =
            Arc::new(move || -> Arc<dyn Component> { Arc::new(constructor()) });
        self.insert(TypeKey::of::<C>(), Registration::Transient(constructor));
    }

    fn insert(&self, component_type: TypeKey, registration: Registration) {
        if self
            .registrations
            .insert(component_type, registration)
            .is_some()
        {
            warn!(
                component_type = %component_type.short_name(),
                "Replacing existing component registration"
            );
        } else {
            debug!(
                component_type = %component_type.short_name(),
                "Registered component"
            );
        }
    }

    pub fn is_registered(&self, component_type: &TypeKey) -> bool {
        self.registrations.contains_key(component_type)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl DependencyResolver for InMemoryDependencyResolver {
    fn build(&self, component_type: &TypeKey) -> Option<Arc<dyn Component>> {
        let registration = self.registrations.get(component_type)?.value().clone();
        Some(match registration {
            Registration::Singleton(component) => component,
            Registration::Transient(constructor) => constructor(),
        })
    }
}

impl fmt::Debug for InMemoryDependencyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryDependencyResolver")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}
