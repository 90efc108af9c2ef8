//! Invalidatable: the "your cached data may now be stale" capability.

/// Implemented by anything that caches data derived from a transform's pose.
///
/// The scene calls [`invalidate`](Invalidatable::invalidate) during a fan-out
/// pass; implementors only flag themselves stale and recompute lazily on their
/// next read. The receiver is `&self`: the scene holds observers through
/// `Weak` handles, so implementors keep their flags in `Cell`s.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use galaxy_3d_scene::galaxy3d::invalidation::Invalidatable;
///
/// struct ShadowCaster {
///     stale: Cell<bool>,
/// }
///
/// impl Invalidatable for ShadowCaster {
///     fn invalidate(&self) {
///         self.stale.set(true);
///     }
/// }
/// ```
pub trait Invalidatable {
    /// Mark this object's derived data as stale
    fn invalidate(&self);
}
