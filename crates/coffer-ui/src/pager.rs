use std::rc::Rc;

use coffer_core::prelude::*;

/// Invoked when the viewer clicks an entry; receives the entry's index
/// into the full list.
pub type PickHandler<V> = Rc<dyn Fn(&mut ClickContext<'_, V>, usize)>;

/// A paginated window over a list.
///
/// All rows but the last show the current page's entries; the last row
/// carries the previous control in its first cell and the next control in
/// its last, each only while there is somewhere to go. The page index
/// lives in a state cell, so flipping pages is one re-render and the
/// position survives unrelated updates.
pub struct Pager<R, V, T> {
    extent: Extent,
    key: Option<String>,
    prev_control: R,
    next_control: R,
    present: Rc<dyn Fn(&T) -> R>,
    on_pick: Option<PickHandler<V>>,
}

pub struct PagerProps<T> {
    pub entries: Rc<Vec<T>>,
}

impl<T> PagerProps<T> {
    pub fn new(entries: Rc<Vec<T>>) -> Self {
        Self { entries }
    }
}

impl<R, V, T> Pager<R, V, T> {
    pub fn new(
        extent: Extent,
        prev_control: R,
        next_control: R,
        present: impl Fn(&T) -> R + 'static,
    ) -> Self {
        Self {
            extent,
            key: None,
            prev_control,
            next_control,
            present: Rc::new(present),
            on_pick: None,
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn on_pick(mut self, handler: impl Fn(&mut ClickContext<'_, V>, usize) + 'static) -> Self {
        self.on_pick = Some(Rc::new(handler));
        self
    }

    fn per_page(&self) -> usize {
        (self.extent.w * (self.extent.h - 1)) as usize
    }
}

impl<R, V, T> Component<R, V> for Pager<R, V, T>
where
    R: Clone + PartialEq + 'static,
    V: 'static,
    T: 'static,
{
    type Props = PagerProps<T>;

    fn extent(&self) -> Extent {
        self.extent
    }

    fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn render(
        &self,
        ctx: &mut RenderContext<'_, '_, R, V, PagerProps<T>>,
    ) -> Result<(), CofferError> {
        if self.extent.h < 2 || self.extent.w == 0 {
            log::warn!("pager at {} needs a control row; not rendering", ctx.path());
            return Ok(());
        }
        let page = ctx.use_state(|| 0usize)?;
        let entries = ctx.props().entries.clone();

        let per_page = self.per_page();
        let pages = entries.len().div_ceil(per_page).max(1);
        // The list may have shrunk under us since the page was set.
        let current = page.get().min(pages - 1);

        for (slot, index) in (current * per_page..entries.len().min((current + 1) * per_page))
            .enumerate()
        {
            let renderable = (self.present)(&entries[index]);
            match &self.on_pick {
                Some(pick) => {
                    let pick = pick.clone();
                    ctx.set_slot_click(
                        slot as Slot,
                        renderable,
                        Rc::new(move |cctx| pick(cctx, index)),
                    );
                }
                None => ctx.set_slot(slot as Slot, renderable),
            }
        }

        let controls_y = self.extent.h - 1;
        if current > 0 {
            let back = page.clone();
            ctx.set_click(
                0,
                controls_y,
                self.prev_control.clone(),
                Rc::new(move |_| back.set(current - 1)),
            );
        }
        if current + 1 < pages {
            let forward = page.clone();
            ctx.set_click(
                self.extent.w - 1,
                controls_y,
                self.next_control.clone(),
                Rc::new(move |_| forward.set(current + 1)),
            );
        }
        Ok(())
    }
}
