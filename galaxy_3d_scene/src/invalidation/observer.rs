//! Observer registry: the set of objects to notify when a transform changes.
//!
//! Holds non-owning handles only: a transform is never the reason an observer
//! stays alive. Dead external handles are dropped by [`ObserverRegistry::prune`].

use std::fmt;
use std::rc::{Rc, Weak};
use crate::scene::TransformKey;
use super::invalidatable::Invalidatable;

/// A single registered observer.
#[derive(Clone)]
pub enum Observer {
    /// Another transform in the same scene
    Transform(TransformKey),
    /// An external object (camera, light, bounding volume, ...)
    External(Weak<dyn Invalidatable>),
}

impl Observer {
    /// Register an external object without taking ownership of it.
    pub fn external<T: Invalidatable + 'static>(target: &Rc<T>) -> Self {
        let target: Rc<dyn Invalidatable> = target.clone();
        Observer::External(Rc::downgrade(&target))
    }

    /// Same as [`Observer::external`] for an already type-erased handle.
    pub fn from_dyn(target: &Rc<dyn Invalidatable>) -> Self {
        Observer::External(Rc::downgrade(target))
    }

    /// Identity of an external observer (its data address).
    ///
    /// Two handles to the same object share this address, even when one was
    /// created through a different trait object.
    pub(crate) fn external_address(weak: &Weak<dyn Invalidatable>) -> *const () {
        weak.as_ptr() as *const ()
    }

    /// Whether the observed object still exists (always true for transforms;
    /// the scene resolves transform keys itself).
    pub fn is_alive(&self) -> bool {
        match self {
            Observer::Transform(_) => true,
            Observer::External(weak) => weak.strong_count() > 0,
        }
    }
}

impl PartialEq for Observer {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Observer::Transform(a), Observer::Transform(b)) => a == b,
            (Observer::External(a), Observer::External(b)) => {
                Observer::external_address(a) == Observer::external_address(b)
            }
            _ => false,
        }
    }
}

impl Eq for Observer {}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observer::Transform(key) => f.debug_tuple("Transform").field(key).finish(),
            Observer::External(weak) => f
                .debug_tuple("External")
                .field(&Observer::external_address(weak))
                .finish(),
        }
    }
}

/// Ordered, duplicate-free set of observers.
///
/// Registration order is notification order.
#[derive(Debug, Clone, Default)]
pub struct ObserverRegistry {
    observers: Vec<Observer>,
}

impl ObserverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { observers: Vec::new() }
    }

    /// Add an observer. Returns false if it was already registered.
    pub fn add(&mut self, observer: Observer) -> bool {
        if self.contains(&observer) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn remove(&mut self, observer: &Observer) -> bool {
        match self.observers.iter().position(|o| o == observer) {
            Some(index) => {
                self.observers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether an observer is registered
    pub fn contains(&self, observer: &Observer) -> bool {
        self.observers.iter().any(|o| o == observer)
    }

    /// Remove the transform observer with this key
    pub fn remove_transform(&mut self, key: TransformKey) -> bool {
        self.remove(&Observer::Transform(key))
    }

    /// Drop external observers whose target no longer exists.
    ///
    /// Returns the number of handles removed.
    pub fn prune(&mut self) -> usize {
        let before = self.observers.len();
        self.observers.retain(Observer::is_alive);
        before - self.observers.len()
    }

    /// Iterate over registered observers
    pub fn iter(&self) -> impl Iterator<Item = &Observer> {
        self.observers.iter()
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observer is registered
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Remove every observer
    pub fn clear(&mut self) {
        self.observers.clear();
    }
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
