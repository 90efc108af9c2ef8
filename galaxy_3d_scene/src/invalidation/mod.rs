//! Invalidation module: the staleness contract and observer bookkeeping.
//!
//! A transform that changes tells every registered observer that whatever it
//! cached from the transform's pose may now be stale. Observers are either
//! other transforms in the same scene or external objects (cameras, lights,
//! bounding volumes) held through non-owning handles.

mod invalidatable;
mod observer;

pub use invalidatable::Invalidatable;
pub use observer::{Observer, ObserverRegistry};
