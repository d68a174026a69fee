//! # Messages and Runtime Type Identity
//!
//! Type-erased message values and the `TypeKey` used to route them.
//!
//! Handlers are registered per message type, and dispatch overrides are
//! registered per handler type. Both lookups need a runtime type identifier
//! that is cheap to hash and readable in logs, which is what `TypeKey`
//! provides on top of `std::any::TypeId`.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Runtime identity of a Rust type.
///
/// Equality and hashing use the `TypeId` only. The name is carried along
/// for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Identity of `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name with module paths stripped, e.g. `OrderPlaced` or
    /// `Envelope<OrderPlaced>`.
    pub fn short_name(&self) -> String {
        let mut short = String::with_capacity(self.name.len());
        let mut segment = String::new();
        for c in self.name.chars() {
            match c {
                ':' => segment.clear(),
                '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' => {
                    short.push_str(&segment);
                    segment.clear();
                    short.push(c);
                }
                _ => segment.push(c),
            }
        }
        short.push_str(&segment);
        short
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An immutable, type-erased message.
///
/// Cloning is cheap and shares the underlying body.
#[derive(Clone)]
pub struct Message {
    message_type: TypeKey,
    body: Arc<dyn Any + Send + Sync>,
}

impl Message {
    pub fn new<T: Any + Send + Sync>(body: T) -> Self {
        Self {
            message_type: TypeKey::of::<T>(),
            body: Arc::new(body),
        }
    }

    /// Runtime type of the message body
    pub fn message_type(&self) -> TypeKey {
        self.message_type
    }

    pub fn is<T: Any>(&self) -> bool {
        self.message_type.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.body.downcast_ref::<T>()
    }

    /// True if both handles share the same body allocation
    pub fn ptr_eq(&self, other: &Message) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("message_type", &self.message_type.short_name())
            .finish_non_exhaustive()
    }
}

/// Ordered messages delivered and processed together in one pipeline pass.
#[derive(Debug, Clone, Default)]
pub struct UnitOfWork {
    messages: Vec<Message>,
}

impl UnitOfWork {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Unit holding a single message
    pub fn single(message: Message) -> Self {
        Self {
            messages: vec![message],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl From<Vec<Message>> for UnitOfWork {
    fn from(messages: Vec<Message>) -> Self {
        Self::new(messages)
    }
}

impl FromIterator<Message> for UnitOfWork {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a UnitOfWork {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
