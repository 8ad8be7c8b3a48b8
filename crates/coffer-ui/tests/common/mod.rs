use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use coffer_core::prelude::*;

pub struct Viewer {
    pub name: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Applied {
    Set(Slot, String, bool),
    Clear(Slot),
}

/// Applied patches plus the grid they add up to.
#[derive(Default)]
pub struct RendererLog {
    pub patches: RefCell<Vec<Vec<Applied>>>,
    pub grid: RefCell<HashMap<Slot, (String, bool)>>,
    pub disposed: Cell<bool>,
}

impl RendererLog {
    pub fn count(&self) -> usize {
        self.patches.borrow().len()
    }

    pub fn last(&self) -> Vec<Applied> {
        self.patches.borrow().last().cloned().unwrap_or_default()
    }

    pub fn cell(&self, slot: Slot) -> Option<String> {
        self.grid.borrow().get(&slot).map(|(r, _)| r.clone())
    }

    pub fn clickable(&self, slot: Slot) -> bool {
        self.grid
            .borrow()
            .get(&slot)
            .map(|(_, clickable)| *clickable)
            .unwrap_or(false)
    }
}

pub struct TestRenderer {
    pub log: Rc<RendererLog>,
}

impl Renderer<String, Viewer> for TestRenderer {
    fn create_surface(&mut self, _title: &str, _extent: Extent) -> Result<SurfaceId, CofferError> {
        Ok(SurfaceId(1))
    }

    fn apply(
        &mut self,
        _surface: SurfaceId,
        patch: &Patch<String, Viewer>,
    ) -> Result<(), CofferError> {
        let mut summary = Vec::new();
        let mut grid = self.log.grid.borrow_mut();
        for diff in patch.iter() {
            match diff {
                Diff::Set {
                    slot,
                    renderable,
                    on_click,
                } => {
                    grid.insert(*slot, (renderable.clone(), on_click.is_some()));
                    summary.push(Applied::Set(*slot, renderable.clone(), on_click.is_some()));
                }
                Diff::Clear { slot } => {
                    grid.remove(slot);
                    summary.push(Applied::Clear(*slot));
                }
            }
        }
        self.log.patches.borrow_mut().push(summary);
        Ok(())
    }

    fn dispose(&mut self, _surface: SurfaceId) {
        self.log.disposed.set(true);
    }
}

pub type ExportedCell<T> = Rc<RefCell<Option<StateCell<T>>>>;

pub fn mount_with<W>(
    root: W,
    props: W::Props,
) -> (Session<String, Viewer>, Rc<RendererLog>, Arc<StepScheduler>)
where
    W: View<String, Viewer> + 'static,
    W::Props: 'static,
{
    let log = Rc::new(RendererLog::default());
    let scheduler = Arc::new(StepScheduler::new());
    let session = mount(
        Box::new(TestRenderer { log: log.clone() }),
        scheduler.clone(),
        root,
        props,
        Viewer { name: "alex" },
    )
    .expect("mount");
    (session, log, scheduler)
}
