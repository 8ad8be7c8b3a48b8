//! Sessions.
//!
//! [`mount`] binds a root view to a viewer on a renderer-backed surface
//! and runs the first render pass. The returned [`Session`] is the host's
//! handle: dispatch clicks into it, batch host-side mutations, attach
//! scheduled work for auto-cancel, and unmount it when the viewer leaves.
//!
//! A session is single-threaded: every render runs on the thread `mount`
//! was called on, and so must `dispatch_click` and `unmount`. State cells
//! may be written from anywhere; the engine marshals the resulting update
//! requests back through the scheduler.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;

use crate::context::RenderContext;
use crate::error::CofferError;
use crate::frame::Frame;
use crate::input::{Click, ClickContext};
use crate::reconciler::{
    AnyEngine, BatchGuard, Engine, UpdateSignal, next_session_id, register_engine,
};
use crate::render_api::Renderer;
use crate::schedule::{Scheduler, TaskHandle};
use crate::store::Store;
use crate::view::{CloseContext, InitContext, View};

/// Mounts `root` for `viewer`: runs `init`, allocates the display surface,
/// and applies the first frame before returning.
pub fn mount<R, V, W>(
    mut renderer: Box<dyn Renderer<R, V>>,
    scheduler: Arc<dyn Scheduler>,
    root: W,
    props: W::Props,
    viewer: V,
) -> Result<Session<R, V>, CofferError>
where
    R: Clone + PartialEq + 'static,
    V: 'static,
    W: View<R, V> + 'static,
    W::Props: 'static,
{
    let mut init = InitContext::new();
    root.init(&mut init);
    let extent = init.extent()?;
    let surface = renderer.create_surface(init.title_str(), extent)?;

    let id = next_session_id();
    let updates = UpdateSignal::new(id, thread::current().id(), scheduler.clone());
    let root = Rc::new(root);

    let render_root = {
        let root = root.clone();
        Box::new(
            move |pass: &mut crate::reconciler::PassState<'_, R, V>| -> Result<(), CofferError> {
                let mut ctx = RenderContext::root(pass, &props);
                root.render(&mut ctx)
            },
        )
    };
    let close_root = {
        let root = root.clone();
        Box::new(move |ctx: &mut CloseContext<'_, V>| {
            root.close(ctx);
        })
    };

    let engine = Rc::new(Engine {
        id,
        extent,
        viewer: Rc::new(viewer),
        scheduler,
        updates,
        renderer: RefCell::new(renderer),
        surface,
        store: RefCell::new(Store::new()),
        prev: RefCell::new(Frame::new(extent)),
        rendering: Cell::new(false),
        batch_depth: Cell::new(0),
        batch_dirty: Cell::new(false),
        close_deferred: Cell::new(false),
        closed: Cell::new(false),
        tasks: RefCell::new(HashSet::new()),
        render_root,
        close_root: RefCell::new(Some(close_root)),
    });

    let as_any: Rc<dyn AnyEngine> = engine.clone();
    register_engine(id, Rc::downgrade(&as_any));

    if let Err(err) = engine.render() {
        engine.request_close();
        return Err(err);
    }
    log::debug!("session {id} mounted ({}x{})", extent.w, extent.h);
    Ok(Session { engine })
}

/// A mounted view bound to a viewer and a surface.
pub struct Session<R, V> {
    pub(crate) engine: Rc<Engine<R, V>>,
}

impl<R, V> Session<R, V>
where
    R: Clone + PartialEq + 'static,
    V: 'static,
{
    /// Runs a render pass now, on the mounting thread. Hosts rarely need
    /// this; state writes schedule their own.
    pub fn render_now(&self) -> Result<(), CofferError> {
        self.engine.render()
    }

    /// Routes a click to the handler the current frame recorded for its
    /// slot. Returns whether a handler ran, so platforms can decide to
    /// swallow the raw event.
    pub fn dispatch_click(&self, click: Click) -> bool {
        if self.engine.closed.get() {
            log::debug!("click on closed session {}", self.engine.id);
            return false;
        }
        let handler = self.engine.prev.borrow().click_at(click.slot).cloned();
        match handler {
            Some(handler) => {
                let mut ctx = ClickContext::new(&*self.engine.viewer, click, &*self.engine);
                handler(&mut ctx);
                true
            }
            None => false,
        }
    }

    /// Coalesces every state mutation made inside `work` into a single
    /// re-render. Command handlers touching several cells go through here.
    pub fn batch(&self, work: impl FnOnce()) {
        let _scope = BatchGuard::enter(&*self.engine);
        work();
    }

    pub fn viewer(&self) -> &V {
        &self.engine.viewer
    }

    /// Registers scheduled work for cancellation on unmount.
    pub fn attach_task(&self, handle: TaskHandle) {
        self.engine.attach_task(handle);
    }

    pub fn detach_task(&self, handle: &TaskHandle) {
        self.engine.detach_task(handle);
    }

    /// Snapshot of the currently attached task handles.
    pub fn tasks(&self) -> Vec<TaskHandle> {
        self.engine.task_snapshot()
    }

    pub fn is_open(&self) -> bool {
        !self.engine.closed.get()
    }

    /// Cancels attached tasks, runs every remaining effect cleanup, calls
    /// the root view's `close`, and releases the surface. If a render pass
    /// is underway the teardown runs when it completes.
    pub fn unmount(self) {
        self.engine.request_close();
    }
}
