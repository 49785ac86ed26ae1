//! Type-keyed shared state.
//!
//! [`Resources`] maps each Rust type to at most one value. Every value has
//! its own `RwLock`, so a reader of one resource never waits on a writer of
//! another, and access is handed out as parking_lot mapped guards.
//!
//! | Marker | Where it lives | Access |
//! |--------|----------------|--------|
//! | [`Resource`] | Build phase | Mutable via [`Server::get_resource_mut`](crate::server::Server::get_resource_mut) |
//! | [`GlobalResource`] | For the life of the server | Read-only via [`Server::get_global`](crate::server::Server::get_global) |

use core::any::{Any, TypeId};
use hashbrown::HashMap;
use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

/// Anything that may be stored in [`Resources`].
///
/// Implemented for every `Send + Sync + 'static` type.
pub trait Resource: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Resource for T {}

/// Opt-in marker for values published read-only to node executions.
///
/// Registries and settings are the usual candidates.
///
/// ```
/// use lumen_system::resource::GlobalResource;
/// use lumen_system::server::Server;
///
/// struct Limits { max_items: usize }
/// impl GlobalResource for Limits {}
///
/// let mut server = Server::new();
/// server.insert_global(Limits { max_items: 100 });
/// assert_eq!(server.get_global::<Limits>().unwrap().max_items, 100);
/// ```
pub trait GlobalResource: Resource {}

/// Shared read access to a stored value.
pub type ResourceRef<'a, T> = MappedRwLockReadGuard<'a, T>;

/// Exclusive write access to a stored value.
pub type ResourceRefMut<'a, T> = MappedRwLockWriteGuard<'a, T>;

/// Why a resource could not be borrowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    /// Nothing of this type is stored.
    #[error("resource not found: {0}")]
    NotFound(&'static str),

    /// The value is locked in a way that conflicts with the request.
    #[error("resource {0} is already borrowed")]
    BorrowConflict(&'static str),
}

type Slot = RwLock<Box<dyn Any + Send + Sync>>;

/// A set of values keyed by their type.
///
/// ```
/// use lumen_system::resource::Resources;
///
/// struct Counter { value: i32 }
///
/// let mut resources = Resources::new();
/// resources.insert(Counter { value: 0 });
/// resources.get_mut::<Counter>().unwrap().value += 1;
///
/// assert_eq!(resources.get::<Counter>().unwrap().value, 1);
/// ```
#[derive(Default)]
pub struct Resources {
    slots: HashMap<TypeId, (&'static str, Slot)>,
}

impl core::fmt::Debug for Resources {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set()
            .entries(self.slots.values().map(|(name, _)| name))
            .finish()
    }
}

impl Resources {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, handing back whatever was stored for `T` before.
    pub fn insert<T: Resource>(&mut self, value: T) -> Option<T> {
        let slot: Slot = RwLock::new(Box::new(value));
        self.slots
            .insert(TypeId::of::<T>(), (core::any::type_name::<T>(), slot))
            .and_then(|(_, previous)| unbox(previous))
    }

    /// Returns `true` if a value of type `T` is stored.
    #[must_use]
    pub fn contains<T: Resource>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<T>())
    }

    /// Borrows the `T` value for reading.
    ///
    /// # Errors
    ///
    /// [`ResourceError::NotFound`] when absent, [`ResourceError::BorrowConflict`]
    /// while a writer holds it.
    pub fn get<T: Resource>(&self) -> Result<ResourceRef<'_, T>, ResourceError> {
        let name = core::any::type_name::<T>();
        let (_, slot) = self
            .slots
            .get(&TypeId::of::<T>())
            .ok_or(ResourceError::NotFound(name))?;
        let guard = slot
            .try_read()
            .ok_or(ResourceError::BorrowConflict(name))?;
        RwLockReadGuard::try_map(guard, |value| (**value).downcast_ref::<T>())
            .map_err(|_| ResourceError::NotFound(name))
    }

    /// Borrows the `T` value for writing.
    ///
    /// # Errors
    ///
    /// [`ResourceError::NotFound`] when absent, [`ResourceError::BorrowConflict`]
    /// while any other guard is alive.
    pub fn get_mut<T: Resource>(&self) -> Result<ResourceRefMut<'_, T>, ResourceError> {
        let name = core::any::type_name::<T>();
        let (_, slot) = self
            .slots
            .get(&TypeId::of::<T>())
            .ok_or(ResourceError::NotFound(name))?;
        let guard = slot
            .try_write()
            .ok_or(ResourceError::BorrowConflict(name))?;
        RwLockWriteGuard::try_map(guard, |value| (**value).downcast_mut::<T>())
            .map_err(|_| ResourceError::NotFound(name))
    }

    /// Takes the `T` value out of the set.
    pub fn remove<T: Resource>(&mut self) -> Option<T> {
        self.slots
            .remove(&TypeId::of::<T>())
            .and_then(|(_, slot)| unbox(slot))
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn unbox<T: Resource>(slot: Slot) -> Option<T> {
    slot.into_inner().downcast::<T>().ok().map(|value| *value)
}
