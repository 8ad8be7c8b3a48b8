//! Effect records.
//!
//! `use_effect` compares its dependency value against the one stored on the
//! previous render and, when they differ, queues the body for execution
//! after the pass's patch has been applied. The body may return a cleanup
//! that runs before the next body, when the owning path is evicted, or on
//! unmount, whichever comes first.

use std::any::Any;

/// Teardown returned by an effect body.
pub type Cleanup = Box<dyn FnOnce() + 'static>;

/// Convenience for effect bodies that want a teardown:
///
/// ```
/// # use coffer_core::effect::on_cleanup;
/// # let _ =
/// on_cleanup(|| log::debug!("gone"))
/// # ;
/// ```
pub fn on_cleanup(f: impl FnOnce() + 'static) -> Option<Cleanup> {
    Some(Box::new(f))
}

/// Per-hook storage inside a path bucket.
#[derive(Default)]
pub(crate) struct EffectRecord {
    /// Dependency value of the last body that ran. `None` until the first
    /// body has been committed.
    pub(crate) deps: Option<Box<dyn Any>>,
    pub(crate) cleanup: Option<Cleanup>,
}

/// An effect whose body must run once the current pass's patch lands.
pub(crate) struct PendingEffect {
    pub(crate) path: String,
    pub(crate) index: usize,
    pub(crate) deps: Box<dyn Any>,
    pub(crate) body: Box<dyn FnOnce() -> Option<Cleanup>>,
}
