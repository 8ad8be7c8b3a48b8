mod common;

use std::cell::Cell;
use std::rc::Rc;

use coffer_core::prelude::*;
use coffer_ui::{Pager, PagerProps};
use common::{Viewer, mount_with};

struct PagerHost {
    entries: Rc<Vec<String>>,
    picked: Rc<Cell<usize>>,
}

impl View<String, Viewer> for PagerHost {
    type Props = ();

    fn init(&self, ctx: &mut InitContext) {
        ctx.rows(2);
        ctx.title("pager");
    }

    fn render(
        &self,
        ctx: &mut RenderContext<'_, '_, String, Viewer, ()>,
    ) -> Result<(), CofferError> {
        let picked = self.picked.clone();
        let pager = Pager::new(
            Extent::new(9, 2),
            String::from("prev"),
            String::from("next"),
            |entry: &String| entry.clone(),
        )
        .on_pick(move |_, index| picked.set(index));
        ctx.child(0, 0, &pager, PagerProps::new(self.entries.clone()))
    }
}

fn host() -> PagerHost {
    PagerHost {
        entries: Rc::new((0..20).map(|i| format!("e{i}")).collect()),
        picked: Rc::new(Cell::new(usize::MAX)),
    }
}

#[test]
fn first_page_shows_the_head_and_only_a_next_control() {
    let (_session, log, _scheduler) = mount_with(host(), ());
    for slot in 0..9 {
        assert_eq!(log.cell(slot), Some(format!("e{slot}")));
    }
    assert_eq!(log.cell(9), None);
    assert_eq!(log.cell(17), Some(String::from("next")));
}

#[test]
fn flipping_pages_rewrites_the_window_and_controls() {
    let view = host();
    let picked = view.picked.clone();
    let (session, log, _scheduler) = mount_with(view, ());

    assert!(session.dispatch_click(Click::left(17)));
    for slot in 0..9 {
        assert_eq!(log.cell(slot), Some(format!("e{}", slot + 9)));
    }
    assert_eq!(log.cell(9), Some(String::from("prev")));
    assert_eq!(log.cell(17), Some(String::from("next")));

    assert!(session.dispatch_click(Click::left(17)));
    assert_eq!(log.cell(0), Some(String::from("e18")));
    assert_eq!(log.cell(1), Some(String::from("e19")));
    // The tail of the previous page is cleared, and there is no third page.
    assert_eq!(log.cell(2), None);
    assert_eq!(log.cell(17), None);
    assert_eq!(log.cell(9), Some(String::from("prev")));

    // Page position is hook state: an unrelated re-render keeps it.
    session.render_now().expect("idle render");
    assert!(log.last().is_empty());
    assert_eq!(log.cell(0), Some(String::from("e18")));

    assert!(session.dispatch_click(Click::left(9)));
    assert_eq!(log.cell(0), Some(String::from("e9")));

    assert!(session.dispatch_click(Click::left(3)));
    assert_eq!(picked.get(), 12);
}
