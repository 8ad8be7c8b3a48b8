use thiserror::Error;

/// Errors surfaced by the engine. Hook misuse aborts the running render
/// pass; the previously applied frame stays on the surface.
#[derive(Debug, Error)]
pub enum CofferError {
    /// The Nth hook call on a path found a cell of a different shape than
    /// it allocated on an earlier render. Almost always a hook placed
    /// under a data-dependent branch.
    #[error("hook order violated at {path} (hook {index}): slot does not hold a {expected}")]
    HookMismatch {
        path: String,
        index: usize,
        expected: &'static str,
    },

    /// The root view's `init` never declared a surface size.
    #[error("view declared no surface size")]
    NoSurfaceSize,

    /// The platform renderer rejected a surface or a patch.
    #[error("renderer: {0}")]
    Renderer(String),

    /// The session was already unmounted.
    #[error("session is closed")]
    Closed,
}
