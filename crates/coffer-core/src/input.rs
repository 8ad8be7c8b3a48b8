use std::rc::Rc;

use bitflags::bitflags;

use crate::geometry::Slot;
use crate::reconciler::{BatchGate, BatchGuard};

bitflags! {
    /// Modifier keys held while clicking.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ClickModifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT = 1 << 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickKind {
    Left,
    Right,
    Middle,
    Double,
    /// The viewer pressed the drop key over the slot.
    Drop,
}

/// One click on a surface slot, as reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Click {
    pub slot: Slot,
    pub kind: ClickKind,
    pub modifiers: ClickModifiers,
}

impl Click {
    pub fn new(slot: Slot, kind: ClickKind, modifiers: ClickModifiers) -> Self {
        Self {
            slot,
            kind,
            modifiers,
        }
    }

    pub fn left(slot: Slot) -> Self {
        Self::new(slot, ClickKind::Left, ClickModifiers::empty())
    }

    pub fn right(slot: Slot) -> Self {
        Self::new(slot, ClickKind::Right, ClickModifiers::empty())
    }

    pub fn shift_left(slot: Slot) -> Self {
        Self::new(slot, ClickKind::Left, ClickModifiers::SHIFT)
    }
}

/// Handler recorded next to a renderable for the duration of one frame.
///
/// Handlers are opaque to the differ: a slot whose renderable is unchanged
/// keeps whatever handler the current frame recorded without emitting a
/// diff for it.
pub type ClickHandler<V> = Rc<dyn Fn(&mut ClickContext<'_, V>)>;

/// Passed to a click handler when the session dispatches a click.
pub struct ClickContext<'a, V> {
    viewer: &'a V,
    click: Click,
    gate: &'a dyn BatchGate,
}

impl<'a, V> ClickContext<'a, V> {
    pub(crate) fn new(viewer: &'a V, click: Click, gate: &'a dyn BatchGate) -> Self {
        Self {
            viewer,
            click,
            gate,
        }
    }

    pub fn viewer(&self) -> &V {
        self.viewer
    }

    pub fn click(&self) -> Click {
        self.click
    }

    /// Coalesces every state mutation made inside `work` into a single
    /// re-render, posted once the outermost batch ends.
    pub fn batch(&mut self, work: impl FnOnce()) {
        let _scope = BatchGuard::enter(self.gate);
        work();
    }
}
