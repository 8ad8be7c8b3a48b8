use std::collections::HashMap;

use coffer_core::prelude::*;

struct MaskCell<R, V> {
    renderable: R,
    on_click: Option<ClickHandler<V>>,
}

/// Chrome layout described by rows of characters.
///
/// Each row is one grid row; every character mapped through
/// [`assign`](Mask::assign) places its renderable at that cell, unmapped
/// characters leave the cell empty. The extent is the row count by the
/// longest row.
///
/// ```
/// # use coffer_ui::Mask;
/// let frame: Mask<&'static str, ()> = Mask::new([
///     "#########",
///     "#.......#",
///     "#########",
/// ])
/// .assign('#', "border");
/// ```
pub struct Mask<R, V> {
    rows: Vec<String>,
    extent: Extent,
    key: Option<String>,
    legend: HashMap<char, MaskCell<R, V>>,
}

impl<R, V> Mask<R, V> {
    pub fn new<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows: Vec<String> = rows.into_iter().map(Into::into).collect();
        let w = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let h = rows.len() as u32;
        Self {
            rows,
            extent: Extent::new(w, h),
            key: None,
            legend: HashMap::new(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn assign(mut self, ch: char, renderable: R) -> Self {
        self.legend.insert(
            ch,
            MaskCell {
                renderable,
                on_click: None,
            },
        );
        self
    }

    pub fn assign_click(mut self, ch: char, renderable: R, on_click: ClickHandler<V>) -> Self {
        self.legend.insert(
            ch,
            MaskCell {
                renderable,
                on_click: Some(on_click),
            },
        );
        self
    }
}

impl<R, V> Component<R, V> for Mask<R, V>
where
    R: Clone + PartialEq + 'static,
    V: 'static,
{
    type Props = ();

    fn extent(&self) -> Extent {
        self.extent
    }

    fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn render(
        &self,
        ctx: &mut RenderContext<'_, '_, R, V, ()>,
    ) -> Result<(), CofferError> {
        for (y, row) in self.rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if let Some(cell) = self.legend.get(&ch) {
                    match &cell.on_click {
                        Some(handler) => ctx.set_click(
                            x as u32,
                            y as u32,
                            cell.renderable.clone(),
                            handler.clone(),
                        ),
                        None => ctx.set(x as u32, y as u32, cell.renderable.clone()),
                    }
                }
            }
        }
        Ok(())
    }
}
