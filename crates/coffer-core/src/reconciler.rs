//! The reconciler.
//!
//! One `Engine` sits behind every mounted session. It drives render
//! passes: walk the view tree into a fresh frame, sweep hook buckets whose
//! paths went unvisited, diff against the applied frame, hand the patch to
//! the renderer, then flush queued effects. State cells ask it for
//! re-renders through an [`UpdateSignal`]; requests arriving off the UI
//! thread marshal back through the session's scheduler, carrying only the
//! session id so the posted job stays `Send`.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use crate::cell::UpdateFn;
use crate::effect::PendingEffect;
use crate::error::CofferError;
use crate::frame::Frame;
use crate::geometry::Extent;
use crate::path;
use crate::render_api::{Renderer, SurfaceId};
use crate::schedule::{Scheduler, TaskHandle};
use crate::store::Store;
use crate::view::CloseContext;

pub(crate) type SessionId = u64;

pub(crate) fn next_session_id() -> SessionId {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// What a marshalled update request can reach without knowing the
/// session's renderable or viewer types.
pub(crate) trait AnyEngine {
    fn process_update(&self);
}

thread_local! {
    static REGISTRY: RefCell<HashMap<SessionId, Weak<dyn AnyEngine>>> =
        RefCell::new(HashMap::new());
}

pub(crate) fn register_engine(id: SessionId, engine: Weak<dyn AnyEngine>) {
    REGISTRY.with(|registry| {
        registry.borrow_mut().insert(id, engine);
    });
}

pub(crate) fn unregister_engine(id: SessionId) {
    REGISTRY.with(|registry| {
        registry.borrow_mut().remove(&id);
    });
}

pub(crate) fn with_engine(id: SessionId, f: impl FnOnce(&dyn AnyEngine)) {
    // Upgrade outside the registry borrow: the engine may look sessions up
    // again while processing.
    let engine = REGISTRY.with(|registry| {
        registry.borrow().get(&id).and_then(|weak| weak.upgrade())
    });
    match engine {
        Some(engine) => f(&*engine),
        None => log::debug!("dropping update for closed session {id}"),
    }
}

/// Re-render request plumbing handed to every state cell.
#[derive(Clone)]
pub(crate) struct UpdateSignal {
    session: SessionId,
    ui_thread: ThreadId,
    scheduler: Arc<dyn Scheduler>,
}

impl UpdateSignal {
    pub(crate) fn new(
        session: SessionId,
        ui_thread: ThreadId,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            session,
            ui_thread,
            scheduler,
        }
    }

    pub(crate) fn request(&self) {
        if thread::current().id() == self.ui_thread {
            with_engine(self.session, |engine| engine.process_update());
        } else {
            let session = self.session;
            self.scheduler.run(Box::new(move || {
                with_engine(session, |engine| engine.process_update());
            }));
        }
    }

    pub(crate) fn change_fn(&self) -> UpdateFn {
        let signal = self.clone();
        Arc::new(move || signal.request())
    }
}

/// Batch depth bookkeeping, object-safe so click contexts can hold it
/// without the session's type parameters.
pub(crate) trait BatchGate {
    fn enter_batch(&self);
    fn exit_batch(&self);
}

/// Holds a batch open for a scope; the depth drops even on unwind.
pub(crate) struct BatchGuard<'a> {
    gate: &'a dyn BatchGate,
}

impl<'a> BatchGuard<'a> {
    pub(crate) fn enter(gate: &'a dyn BatchGate) -> Self {
        gate.enter_batch();
        Self { gate }
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.gate.exit_batch();
    }
}

/// Clears the re-entrancy flag when a render pass ends, however it ends.
struct Rendering<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> Rendering<'a> {
    fn raise(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for Rendering<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Everything one render pass accumulates.
pub(crate) struct PassState<'e, R, V> {
    pub(crate) store: &'e mut Store,
    pub(crate) next: Frame<R, V>,
    pub(crate) surface: Extent,
    pub(crate) visited: HashSet<String>,
    pub(crate) overlay: HashMap<String, u32>,
    pub(crate) pending: Vec<PendingEffect>,
    pub(crate) viewer: &'e V,
    pub(crate) scheduler: &'e Arc<dyn Scheduler>,
    pub(crate) updates: &'e UpdateSignal,
    pub(crate) gate: &'e dyn BatchGate,
}

pub(crate) type RootRenderFn<R, V> =
    Box<dyn Fn(&mut PassState<'_, R, V>) -> Result<(), CofferError>>;

pub(crate) type CloseFn<V> = Box<dyn FnOnce(&mut CloseContext<'_, V>)>;

pub(crate) struct Engine<R, V> {
    pub(crate) id: SessionId,
    pub(crate) extent: Extent,
    pub(crate) viewer: Rc<V>,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) updates: UpdateSignal,
    pub(crate) renderer: RefCell<Box<dyn Renderer<R, V>>>,
    pub(crate) surface: SurfaceId,
    pub(crate) store: RefCell<Store>,
    pub(crate) prev: RefCell<Frame<R, V>>,
    pub(crate) rendering: Cell<bool>,
    pub(crate) batch_depth: Cell<u32>,
    pub(crate) batch_dirty: Cell<bool>,
    pub(crate) close_deferred: Cell<bool>,
    pub(crate) closed: Cell<bool>,
    pub(crate) tasks: RefCell<HashSet<TaskHandle>>,
    pub(crate) render_root: RootRenderFn<R, V>,
    pub(crate) close_root: RefCell<Option<CloseFn<V>>>,
}

impl<R, V> Engine<R, V>
where
    R: Clone + PartialEq + 'static,
    V: 'static,
{
    /// Runs a render pass. Nested invocations (a state write from inside a
    /// render or an effect body) are dropped; the write itself stays in the
    /// cell and the next pass observes it.
    pub(crate) fn render(&self) -> Result<(), CofferError> {
        if self.closed.get() {
            return Err(CofferError::Closed);
        }
        if self.rendering.get() {
            return Ok(());
        }
        let result = {
            let _pass = Rendering::raise(&self.rendering);
            self.do_render()
        };
        if self.close_deferred.replace(false) {
            self.finish_close();
        }
        result
    }

    fn do_render(&self) -> Result<(), CofferError> {
        let mut store = self.store.borrow_mut();
        let mut pass = PassState {
            store: &mut store,
            next: Frame::new(self.extent),
            surface: self.extent,
            visited: HashSet::new(),
            overlay: HashMap::new(),
            pending: Vec::new(),
            viewer: &*self.viewer,
            scheduler: &self.scheduler,
            updates: &self.updates,
            gate: self,
        };
        pass.visited.insert(path::ROOT.to_string());
        pass.store.begin(path::ROOT);
        (self.render_root)(&mut pass)?;

        let PassState {
            store,
            next,
            visited,
            pending,
            ..
        } = pass;

        for cleanup in store.sweep(&visited) {
            cleanup();
        }

        let patch = Frame::diff(&self.prev.borrow(), &next);
        log::debug!(
            "session {}: {} diffs, {} paths visited",
            self.id,
            patch.len(),
            visited.len()
        );
        self.renderer.borrow_mut().apply(self.surface, &patch)?;
        *self.prev.borrow_mut() = next;

        for effect in pending {
            if let Some(cleanup) = store.take_cleanup(&effect.path, effect.index) {
                cleanup();
            }
            let cleanup = (effect.body)();
            store.commit_effect(&effect.path, effect.index, effect.deps, cleanup);
        }
        Ok(())
    }

    /// Entry point for update requests already on the UI thread.
    pub(crate) fn handle_update(&self) {
        if self.closed.get() {
            return;
        }
        if self.batch_depth.get() > 0 {
            self.batch_dirty.set(true);
            return;
        }
        if let Err(err) = self.render() {
            log::error!("session {}: render failed: {err}", self.id);
        }
    }

    /// Unmounts now, or once the in-flight render pass finishes.
    pub(crate) fn request_close(&self) {
        if self.rendering.get() {
            self.close_deferred.set(true);
        } else {
            self.finish_close();
        }
    }

    fn finish_close(&self) {
        if self.closed.replace(true) {
            return;
        }
        for task in self.tasks.borrow_mut().drain() {
            task.cancel();
        }
        for cleanup in self.store.borrow_mut().drain_cleanups() {
            cleanup();
        }
        if let Some(close) = self.close_root.borrow_mut().take() {
            let mut ctx = CloseContext::new(&*self.viewer);
            close(&mut ctx);
        }
        self.renderer.borrow_mut().dispose(self.surface);
        unregister_engine(self.id);
        log::debug!("session {} closed", self.id);
    }

    pub(crate) fn attach_task(&self, handle: TaskHandle) {
        self.tasks.borrow_mut().insert(handle);
    }

    pub(crate) fn detach_task(&self, handle: &TaskHandle) {
        self.tasks.borrow_mut().remove(handle);
    }

    pub(crate) fn task_snapshot(&self) -> Vec<TaskHandle> {
        self.tasks.borrow().iter().cloned().collect()
    }
}

impl<R, V> BatchGate for Engine<R, V>
where
    R: Clone + PartialEq + 'static,
    V: 'static,
{
    fn enter_batch(&self) {
        self.batch_depth.set(self.batch_depth.get() + 1);
    }

    fn exit_batch(&self) {
        let depth = self.batch_depth.get().saturating_sub(1);
        self.batch_depth.set(depth);
        if depth == 0 && self.batch_dirty.replace(false) {
            let session = self.id;
            self.scheduler.run(Box::new(move || {
                with_engine(session, |engine| engine.process_update());
            }));
        }
    }
}

impl<R, V> AnyEngine for Engine<R, V>
where
    R: Clone + PartialEq + 'static,
    V: 'static,
{
    fn process_update(&self) {
        self.handle_update();
    }
}
