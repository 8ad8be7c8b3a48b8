//! Headless chest demo: a bordered three-row window with a click counter,
//! rendered to stdout. Run with `RUST_LOG=debug` to watch the reconciler.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use coffer_core::prelude::*;
use coffer_ui::Mask;

#[derive(Clone, Debug, PartialEq)]
struct Tile {
    glyph: char,
    label: String,
}

impl Tile {
    fn new(glyph: char, label: impl Into<String>) -> Self {
        Self {
            glyph,
            label: label.into(),
        }
    }
}

struct Player {
    name: String,
}

struct TextRenderer {
    extent: Option<Extent>,
    grid: HashMap<Slot, Tile>,
}

impl TextRenderer {
    fn new() -> Self {
        Self {
            extent: None,
            grid: HashMap::new(),
        }
    }

    fn print(&self) {
        let Some(extent) = self.extent else { return };
        for y in 0..extent.h {
            let row: String = (0..extent.w)
                .map(|x| {
                    self.grid
                        .get(&extent.slot_at(x, y))
                        .map(|tile| tile.glyph)
                        .unwrap_or('.')
                })
                .collect();
            println!("  {row}");
        }
        println!();
    }
}

impl Renderer<Tile, Player> for TextRenderer {
    fn create_surface(&mut self, title: &str, extent: Extent) -> Result<SurfaceId, CofferError> {
        println!("== {title} ==");
        self.extent = Some(extent);
        Ok(SurfaceId(1))
    }

    fn apply(&mut self, _surface: SurfaceId, patch: &Patch<Tile, Player>) -> Result<(), CofferError> {
        for diff in patch.iter() {
            match diff {
                Diff::Set {
                    slot, renderable, ..
                } => {
                    self.grid.insert(*slot, renderable.clone());
                }
                Diff::Clear { slot } => {
                    self.grid.remove(slot);
                }
            }
        }
        log::info!("applied {} diffs", patch.len());
        self.print();
        Ok(())
    }

    fn dispose(&mut self, _surface: SurfaceId) {
        println!("== closed ==");
    }
}

struct ChestView;

impl View<Tile, Player> for ChestView {
    type Props = ();

    fn init(&self, ctx: &mut InitContext) {
        ctx.rows(3);
        ctx.title("Chest");
    }

    fn render(
        &self,
        ctx: &mut RenderContext<'_, '_, Tile, Player, ()>,
    ) -> Result<(), CofferError> {
        let border = Mask::new(["#########", "#       #", "#########"])
            .assign('#', Tile::new('#', "border"));
        ctx.child(0, 0, &border, ())?;

        let count = ctx.use_state(|| 0u32)?;
        let clicks = count.get();
        let glyph = char::from_digit(clicks.min(9), 10).unwrap_or('9');
        let bump = count.clone();
        ctx.set_click(
            4,
            1,
            Tile::new(glyph, format!("clicked {clicks} times")),
            Rc::new(move |cctx| {
                log::info!("{} clicked the counter", cctx.viewer().name);
                bump.update(|n| *n += 1);
            }),
        );
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let scheduler = Arc::new(StepScheduler::new());
    let session = mount(
        Box::new(TextRenderer::new()),
        scheduler.clone(),
        ChestView,
        (),
        Player {
            name: String::from("alex"),
        },
    )?;

    for _ in 0..3 {
        session.dispatch_click(Click::left(13));
    }
    session.batch(|| {
        // Coalesced: these land as one render once the batch closes.
        session.dispatch_click(Click::left(13));
        session.dispatch_click(Click::left(13));
    });
    scheduler.step();

    session.unmount();
    Ok(())
}
