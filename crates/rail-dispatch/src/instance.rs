//! The capability every dispatch target implements.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Runtime identity of a concrete type.
///
/// Equality and hashing consider only the [`TypeId`]; the name is carried for
/// diagnostics when a type has no catalog entry.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Identity of `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The underlying [`TypeId`].
    #[must_use]
    pub const fn id(self) -> TypeId {
        self.id
    }

    /// The compiler-provided type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
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
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

/// A live object that commands can target.
///
/// Plain types opt in with an empty implementation:
///
/// ```
/// use rail_dispatch::Invocable;
///
/// struct OrderManager;
/// impl Invocable for OrderManager {}
/// ```
///
/// Methods are invoked on whichever thread calls the dispatcher, typically a
/// transport callback thread rather than the application's main thread.
/// Implementors must be safe to call from an arbitrary thread, or redirect
/// the work onto the owning thread themselves.
pub trait Invocable: std::any::Any + Send + Sync {
    /// Identity used to look the object's methods up in the catalog.
    ///
    /// The default reports the implementing type and should not be
    /// overridden.
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    /// For wrapper types, the wrapped object. Dispatch unwraps exactly one
    /// level before resolving methods.
    fn unwrap_once(&self) -> Option<&dyn Invocable> {
        None
    }
}

impl<T: Invocable> Invocable for Box<T> {
    fn unwrap_once(&self) -> Option<&dyn Invocable> {
        Some(&**self)
    }
}

impl<T: Invocable> Invocable for Arc<T> {
    fn unwrap_once(&self) -> Option<&dyn Invocable> {
        Some(&**self)
    }
}

impl fmt::Debug for dyn Invocable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Invocable").field(&self.type_key()).finish()
    }
}

/// Shared handle stored by the registry. The application keeps its own
/// clones; the registry never extends an object's useful lifetime beyond
/// what the application intends.
pub type Instance = Arc<dyn Invocable>;
