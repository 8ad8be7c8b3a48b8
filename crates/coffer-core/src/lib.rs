//! # Views, Hooks, and Patches
//!
//! Coffer renders grid GUIs the retained-mode way: a view describes every
//! frame from scratch, the engine keeps the state and figures out the
//! smallest set of slot changes to apply. Three pieces matter to authors:
//!
//! - [`View`] / [`Component`]: `render` procedures that read hook state
//!   and emit cells into slots.
//! - Hooks: [`use_state`](RenderContext::use_state) and friends,
//!   persistent storage keyed by where in the tree the call happens.
//! - The session: binds a view to a viewer and a surface, re-renders on
//!   state change, and hands the renderer minimal patches.
//!
//! ## A counter
//!
//! ```rust
//! use std::rc::Rc;
//! use coffer_core::prelude::*;
//!
//! struct Counter;
//!
//! impl View<String, ()> for Counter {
//!     type Props = ();
//!
//!     fn init(&self, ctx: &mut InitContext) {
//!         ctx.rows(1);
//!         ctx.title("Counter");
//!     }
//!
//!     fn render(
//!         &self,
//!         ctx: &mut RenderContext<'_, '_, String, (), ()>,
//!     ) -> Result<(), CofferError> {
//!         let count = ctx.use_state(|| 0u32)?;
//!         let label = format!("clicked {} times", count.get());
//!         let bump = count.clone();
//!         ctx.set_click(0, 0, label, Rc::new(move |_| bump.update(|n| *n += 1)));
//!         Ok(())
//!     }
//! }
//! ```
//!
//! Every click writes the cell, the engine re-runs `render`, diffs the new
//! frame against the applied one, and emits a single `Set` for slot 0.
//! Rendering the same state twice emits nothing.
//!
//! ## Identity
//!
//! Hook state lives in buckets keyed by component paths like
//! `root/slot[4,1]#tabs`. A child keeps its bucket for as long as its path
//! stays stable, so give components a key when siblings reorder or stack
//! on one cell; keyless children fall back to a per-render counter and
//! their identity follows render order.
//!
//! ## Batching and async
//!
//! Mutating several cells in one logical action goes through
//! [`batch`](RenderContext::batch) (or [`Session::batch`]) and costs one
//! re-render. [`use_async_state`](RenderContext::use_async_state) runs a
//! supplier on a worker pool and re-renders once the value lands; the
//! assignment always happens back on the UI thread via the session's
//! [`Scheduler`].

pub mod cell;
pub mod context;
pub mod effect;
pub mod error;
pub mod executor;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod path;
pub mod prelude;
pub mod render_api;
pub mod schedule;
pub mod session;
pub mod view;

mod reconciler;
mod store;


pub use cell::*;
pub use context::*;
pub use effect::*;
pub use error::*;
pub use executor::*;
pub use frame::*;
pub use geometry::*;
pub use input::*;
pub use path::ROOT;
pub use render_api::*;
pub use schedule::*;
pub use session::*;
pub use view::*;
