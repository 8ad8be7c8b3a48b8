//! The render context.
//!
//! Every `render` receives a `RenderContext` scoped to one component for
//! one pass: it resolves hook calls against the component's path bucket,
//! translates local coordinates into absolute surface slots, and descends
//! into children under freshly keyed paths. The root view's context spans
//! the whole surface; a child's context spans the child's declared extent
//! at its placement origin. Nesting composes by translation only.
//!
//! Hook calls must keep a stable order across renders of one component
//! instance; see [`use_state`](RenderContext::use_state).

use std::sync::Arc;

use crate::cell::{MutCell, StateCell};
use crate::effect::{Cleanup, PendingEffect};
use crate::error::CofferError;
use crate::executor::{Executor, WorkerPool};
use crate::geometry::{Extent, Slot};
use crate::input::ClickHandler;
use crate::path;
use crate::reconciler::{BatchGuard, PassState};
use crate::schedule::Scheduler;
use crate::view::Component;

/// Boxed error an async supplier may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub struct RenderContext<'c, 'e, R, V, P> {
    pass: &'c mut PassState<'e, R, V>,
    path: String,
    origin: (u32, u32),
    extent: Extent,
    props: &'c P,
}

impl<'c, 'e, R, V, P> RenderContext<'c, 'e, R, V, P>
where
    R: Clone + PartialEq + 'static,
    V: 'static,
{
    pub(crate) fn root(pass: &'c mut PassState<'e, R, V>, props: &'c P) -> Self {
        let extent = pass.surface;
        Self {
            pass,
            path: path::ROOT.to_string(),
            origin: (0, 0),
            extent,
            props,
        }
    }

    pub fn viewer(&self) -> &V {
        self.pass.viewer
    }

    pub fn props(&self) -> &P {
        self.props
    }

    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        self.pass.scheduler
    }

    /// Absolute x of this component's top-left cell on the surface.
    pub fn origin_x(&self) -> u32 {
        self.origin.0
    }

    pub fn origin_y(&self) -> u32 {
        self.origin.1
    }

    pub fn width(&self) -> u32 {
        self.extent.w
    }

    pub fn height(&self) -> u32 {
        self.extent.h
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// The path identifying this component instance. Useful in logs.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Allocates or retrieves this component's next state cell.
    ///
    /// The Nth `use_state` call during a render always resolves to the Nth
    /// state cell of this path, so hooks must not move between renders:
    /// never call them under branches whose outcome changes from one render
    /// of the same instance to the next. A cell of the wrong type at the
    /// cursor fails the render.
    pub fn use_state<T, F>(&mut self, init: F) -> Result<StateCell<T>, CofferError>
    where
        T: 'static,
        F: FnOnce() -> T,
    {
        let on_change = self.pass.updates.change_fn();
        let (cell, _) = self.pass.store.next_state(&self.path, init, on_change)?;
        Ok(cell)
    }

    /// Like [`use_state`](Self::use_state) but writes never trigger a
    /// render. For timers, handles, and other escape-hatch data.
    pub fn use_ref<T, F>(&mut self, init: F) -> Result<MutCell<T>, CofferError>
    where
        T: 'static,
        F: FnOnce() -> T,
    {
        let (cell, _) = self.pass.store.next_ref(&self.path, init)?;
        Ok(cell)
    }

    /// State cell fed by a background supplier.
    ///
    /// Returns immediately holding `None`. On the first render of this
    /// path the supplier is queued on the shared worker pool; its result
    /// is marshalled back through the session's scheduler and assigned on
    /// the UI thread, triggering one re-render. A failed supplier is
    /// logged and the cell keeps holding `None`.
    pub fn use_async_state<T, F>(
        &mut self,
        supplier: F,
    ) -> Result<StateCell<Option<T>>, CofferError>
    where
        T: Clone + PartialEq + Send + 'static,
        F: FnOnce() -> Result<T, BoxError> + Send + 'static,
    {
        self.use_async_state_on(WorkerPool::shared(), supplier)
    }

    pub fn use_async_state_on<T, F>(
        &mut self,
        executor: &dyn Executor,
        supplier: F,
    ) -> Result<StateCell<Option<T>>, CofferError>
    where
        T: Clone + PartialEq + Send + 'static,
        F: FnOnce() -> Result<T, BoxError> + Send + 'static,
    {
        let on_change = self.pass.updates.change_fn();
        let (cell, created) = self
            .pass
            .store
            .next_state(&self.path, || None::<T>, on_change)?;
        if created {
            let scheduler = self.pass.scheduler.clone();
            let target = cell.clone();
            let origin = self.path.clone();
            executor.execute(Box::new(move || match supplier() {
                Ok(value) => {
                    scheduler.run(Box::new(move || target.set(Some(value))));
                }
                Err(err) => log::warn!("async supplier for {origin} failed: {err}"),
            }));
        }
        Ok(cell)
    }

    /// Ref cell fed by a background supplier; assignment happens on the UI
    /// thread but does not trigger a render.
    pub fn use_async_ref<T, F>(&mut self, supplier: F) -> Result<MutCell<Option<T>>, CofferError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, BoxError> + Send + 'static,
    {
        self.use_async_ref_on(WorkerPool::shared(), supplier)
    }

    pub fn use_async_ref_on<T, F>(
        &mut self,
        executor: &dyn Executor,
        supplier: F,
    ) -> Result<MutCell<Option<T>>, CofferError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, BoxError> + Send + 'static,
    {
        let (cell, created) = self.pass.store.next_ref(&self.path, || None::<T>)?;
        if created {
            let scheduler = self.pass.scheduler.clone();
            let target = cell.clone();
            let origin = self.path.clone();
            executor.execute(Box::new(move || match supplier() {
                Ok(value) => {
                    scheduler.run(Box::new(move || target.set(Some(value))));
                }
                Err(err) => log::warn!("async supplier for {origin} failed: {err}"),
            }));
        }
        Ok(cell)
    }

    /// Queues `body` to run after this pass's patch is applied, whenever
    /// `deps` differs from the previous render. The returned cleanup runs
    /// before the next body, on eviction of this path, and on unmount.
    pub fn use_effect<D, F>(&mut self, deps: D, body: F) -> Result<(), CofferError>
    where
        D: PartialEq + 'static,
        F: FnOnce() -> Option<Cleanup> + 'static,
    {
        let decision = self.pass.store.next_effect(&self.path, &deps)?;
        if decision.run {
            self.pass.pending.push(PendingEffect {
                path: self.path.clone(),
                index: decision.index,
                deps: Box::new(deps),
                body: Box::new(body),
            });
        }
        Ok(())
    }

    /// Records a renderable at component-local `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, renderable: R) {
        self.put(x, y, renderable, None);
    }

    /// Records a renderable and a click handler at component-local `(x, y)`.
    pub fn set_click(&mut self, x: u32, y: u32, renderable: R, on_click: ClickHandler<V>) {
        self.put(x, y, renderable, Some(on_click));
    }

    /// Linear variant of [`set`](Self::set) over this component's extent.
    pub fn set_slot(&mut self, slot: Slot, renderable: R) {
        if let Some((x, y)) = self.local_coords(slot) {
            self.put(x, y, renderable, None);
        }
    }

    pub fn set_slot_click(&mut self, slot: Slot, renderable: R, on_click: ClickHandler<V>) {
        if let Some((x, y)) = self.local_coords(slot) {
            self.put(x, y, renderable, Some(on_click));
        }
    }

    /// Renders `component` with its top-left at component-local `(x, y)`.
    ///
    /// The child renders under its own path, derived from the placement
    /// cell plus the component's key or, keyless, a counter over identical
    /// placements this render. Placements outside this component's extent
    /// are dropped like any other out-of-bounds write.
    pub fn child<C>(&mut self, x: u32, y: u32, component: &C, props: C::Props) -> Result<(), CofferError>
    where
        C: Component<R, V>,
    {
        if !self.extent.contains(x, y) {
            log::warn!(
                "dropping child at ({x},{y}) outside {}x{} under {}",
                self.extent.w,
                self.extent.h,
                self.path
            );
            return Ok(());
        }
        let base = path::slot_base(&self.path, x, y);
        let overlay = {
            let counter = self.pass.overlay.entry(base.clone()).or_insert(0);
            let current = *counter;
            *counter += 1;
            current
        };
        let child_path = match component.key() {
            Some(key) => path::with_key(&base, key),
            None => path::with_key(&base, &overlay.to_string()),
        };
        if !self.pass.visited.insert(child_path.clone()) {
            log::warn!("duplicate component path {child_path}; give siblings distinct keys");
        }
        self.pass.store.begin(&child_path);

        let extent = component.extent();
        let origin = (self.origin.0 + x, self.origin.1 + y);
        let mut ctx = RenderContext {
            pass: &mut *self.pass,
            path: child_path,
            origin,
            extent,
            props: &props,
        };
        component.render(&mut ctx)
    }

    /// Linear variant of [`child`](Self::child) over this component's
    /// extent.
    pub fn child_slot<C>(
        &mut self,
        slot: Slot,
        component: &C,
        props: C::Props,
    ) -> Result<(), CofferError>
    where
        C: Component<R, V>,
    {
        match self.local_coords(slot) {
            Some((x, y)) => self.child(x, y, component, props),
            None => Ok(()),
        }
    }

    /// Coalesces every state mutation made inside `work` into a single
    /// re-render, posted once the outermost batch ends.
    pub fn batch(&mut self, work: impl FnOnce()) {
        let _scope = BatchGuard::enter(self.pass.gate);
        work();
    }

    fn local_coords(&self, slot: Slot) -> Option<(u32, u32)> {
        if slot >= self.extent.slots() {
            log::warn!(
                "dropping slot {slot} outside {}x{} under {}",
                self.extent.w,
                self.extent.h,
                self.path
            );
            return None;
        }
        Some(self.extent.coords_of(slot))
    }

    fn put(&mut self, x: u32, y: u32, renderable: R, on_click: Option<ClickHandler<V>>) {
        if !self.extent.contains(x, y) {
            log::warn!(
                "dropping cell ({x},{y}) outside {}x{} under {}",
                self.extent.w,
                self.extent.h,
                self.path
            );
            return;
        }
        let (ax, ay) = (self.origin.0 + x, self.origin.1 + y);
        if !self.pass.next.extent().contains(ax, ay) {
            log::warn!(
                "dropping cell ({ax},{ay}) outside the surface, written under {}",
                self.path
            );
            return;
        }
        match on_click {
            Some(handler) => self.pass.next.set_click(ax, ay, renderable, handler),
            None => self.pass.next.set(ax, ay, renderable),
        }
    }
}
