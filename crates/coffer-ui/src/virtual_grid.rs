use std::rc::Rc;

use coffer_core::prelude::*;

use crate::pager::PickHandler;

/// A scrollable, filterable window over a list too large for the surface.
///
/// The rightmost column carries the scroll controls; the remaining cells
/// show a row-aligned window of the entries that pass the filter. Both the
/// entries and the filter arrive as props, so changing either is an
/// ordinary re-render: the stored frames are never touched in place, the
/// next pass simply lays out the new subset, clamping the scroll offset
/// into the shrunken range when it has to.
pub struct VirtualGrid<R, V, T> {
    extent: Extent,
    key: Option<String>,
    up_control: R,
    down_control: R,
    present: Rc<dyn Fn(&T) -> R>,
    on_pick: Option<PickHandler<V>>,
}

pub struct VirtualGridProps<T> {
    pub entries: Rc<Vec<T>>,
    pub filter: Option<Rc<dyn Fn(&T) -> bool>>,
}

impl<T> VirtualGridProps<T> {
    pub fn new(entries: Rc<Vec<T>>) -> Self {
        Self {
            entries,
            filter: None,
        }
    }

    pub fn filter(mut self, filter: Rc<dyn Fn(&T) -> bool>) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl<R, V, T> VirtualGrid<R, V, T> {
    pub fn new(
        extent: Extent,
        up_control: R,
        down_control: R,
        present: impl Fn(&T) -> R + 'static,
    ) -> Self {
        Self {
            extent,
            key: None,
            up_control,
            down_control,
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
}

impl<R, V, T> Component<R, V> for VirtualGrid<R, V, T>
where
    R: Clone + PartialEq + 'static,
    V: 'static,
    T: 'static,
{
    type Props = VirtualGridProps<T>;

    fn extent(&self) -> Extent {
        self.extent
    }

    fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn render(
        &self,
        ctx: &mut RenderContext<'_, '_, R, V, VirtualGridProps<T>>,
    ) -> Result<(), CofferError> {
        if self.extent.w < 2 {
            log::warn!(
                "virtual grid at {} needs a scroll column; not rendering",
                ctx.path()
            );
            return Ok(());
        }
        let offset = ctx.use_state(|| 0u32)?;
        let entries = ctx.props().entries.clone();
        let filter = ctx.props().filter.clone();

        let shown: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| filter.as_ref().is_none_or(|keep| keep(entry)))
            .map(|(index, _)| index)
            .collect();

        let content_w = self.extent.w - 1;
        let rows = self.extent.h;
        let total_rows = (shown.len() as u32).div_ceil(content_w);
        let max_offset = total_rows.saturating_sub(rows);
        let row0 = offset.get().min(max_offset);

        let first = (row0 * content_w) as usize;
        let window = shown
            .iter()
            .skip(first)
            .take((rows * content_w) as usize)
            .copied();
        for (cell, index) in window.enumerate() {
            let x = cell as u32 % content_w;
            let y = cell as u32 / content_w;
            let renderable = (self.present)(&entries[index]);
            match &self.on_pick {
                Some(pick) => {
                    let pick = pick.clone();
                    ctx.set_click(x, y, renderable, Rc::new(move |cctx| pick(cctx, index)));
                }
                None => ctx.set(x, y, renderable),
            }
        }

        let controls_x = self.extent.w - 1;
        if row0 > 0 {
            let up = offset.clone();
            ctx.set_click(
                controls_x,
                0,
                self.up_control.clone(),
                Rc::new(move |_| up.set(row0 - 1)),
            );
        }
        if row0 < max_offset {
            let down = offset.clone();
            ctx.set_click(
                controls_x,
                rows - 1,
                self.down_control.clone(),
                Rc::new(move |_| down.set(row0 + 1)),
            );
        }
        Ok(())
    }
}
