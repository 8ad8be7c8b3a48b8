use crate::error::CofferError;
use crate::frame::Patch;
use crate::geometry::Extent;

/// Opaque identifier for a display surface allocated by a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// The platform side of the engine.
///
/// A renderer owns concrete display surfaces (an inventory window, a
/// terminal grid) and applies the patches the reconciler produces. `apply`
/// must be idempotent and preserve diff order; it runs on the thread the
/// session was mounted on.
pub trait Renderer<R, V> {
    fn create_surface(&mut self, title: &str, extent: Extent) -> Result<SurfaceId, CofferError>;
    fn apply(&mut self, surface: SurfaceId, patch: &Patch<R, V>) -> Result<(), CofferError>;
    fn dispose(&mut self, surface: SurfaceId);
}
