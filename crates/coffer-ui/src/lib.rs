//! Prefab components for Coffer views.
//!
//! Everything here is an ordinary [`Component`](coffer_core::view::Component)
//! built on the public author surface: hooks, slot writes, and child
//! descent. Use them directly or read them as worked examples.
//!
//! - [`Mask`]: chrome layout from rows of characters, the usual way grid
//!   GUIs describe borders and fillers.
//! - [`Pager`]: a paginated window over a list, with previous/next
//!   controls backed by a state cell.
//! - [`VirtualGrid`]: a scrollable, filterable window over a larger list;
//!   filter changes take effect on the pass that delivers the new props.

pub mod mask;
pub mod pager;
pub mod virtual_grid;

pub use mask::Mask;
pub use pager::{Pager, PagerProps, PickHandler};
pub use virtual_grid::{VirtualGrid, VirtualGridProps};
