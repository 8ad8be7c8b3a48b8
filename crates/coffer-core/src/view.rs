//! Author contracts.
//!
//! A [`View`] is the root of a session: it configures its surface once in
//! `init`, describes a frame every time `render` runs, and tears down in
//! `close`. A [`Component`] is a nestable piece of a view with a declared
//! extent; parents place components with
//! [`RenderContext::child`](crate::context::RenderContext::child).
//!
//! `render` must be a pure function of hook state and props: read cells,
//! emit cells into slots, and nothing else. The engine calls it as often
//! as it likes.

use crate::context::RenderContext;
use crate::error::CofferError;
use crate::geometry::Extent;

pub trait View<R, V> {
    type Props;

    /// One-shot surface configuration. Must declare the surface size via
    /// [`InitContext::rows`].
    fn init(&self, ctx: &mut InitContext);

    fn render(
        &self,
        ctx: &mut RenderContext<'_, '_, R, V, Self::Props>,
    ) -> Result<(), CofferError>;

    fn close(&self, _ctx: &mut CloseContext<'_, V>) {}
}

pub trait Component<R, V> {
    type Props;

    /// The component's declared width and height in cells. Writes outside
    /// this extent are dropped.
    fn extent(&self) -> Extent;

    /// Stable identity among siblings. Required when siblings may reorder
    /// or when several components share one parent cell; without a key the
    /// engine falls back to a per-render overlay counter and identity
    /// follows render order.
    fn key(&self) -> Option<&str> {
        None
    }

    fn render(
        &self,
        ctx: &mut RenderContext<'_, '_, R, V, Self::Props>,
    ) -> Result<(), CofferError>;
}

/// Handed to [`View::init`] exactly once, before the surface exists.
/// Calling `rows` or `title` again within `init` overwrites the earlier
/// value; there is no way to call them afterwards.
pub struct InitContext {
    rows: u32,
    title: String,
}

impl InitContext {
    pub(crate) fn new() -> Self {
        Self {
            rows: 0,
            title: String::new(),
        }
    }

    pub fn rows(&mut self, rows: u32) {
        self.rows = rows;
    }

    pub fn title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub(crate) fn title_str(&self) -> &str {
        &self.title
    }

    pub(crate) fn extent(&self) -> Result<Extent, CofferError> {
        if self.rows == 0 {
            return Err(CofferError::NoSurfaceSize);
        }
        Ok(Extent::rows(self.rows))
    }
}

/// Handed to [`View::close`] while the session unmounts.
pub struct CloseContext<'a, V> {
    viewer: &'a V,
}

impl<'a, V> CloseContext<'a, V> {
    pub(crate) fn new(viewer: &'a V) -> Self {
        Self { viewer }
    }

    pub fn viewer(&self) -> &V {
        self.viewer
    }
}
