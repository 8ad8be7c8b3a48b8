pub use crate::cell::{MutCell, StateCell};
pub use crate::context::{BoxError, RenderContext};
pub use crate::effect::{Cleanup, on_cleanup};
pub use crate::error::CofferError;
pub use crate::executor::{Executor, InlineExecutor, WorkerPool};
pub use crate::frame::{Diff, Patch};
pub use crate::geometry::{Extent, SURFACE_WIDTH, Slot};
pub use crate::input::{Click, ClickContext, ClickHandler, ClickKind, ClickModifiers};
pub use crate::path::ROOT;
pub use crate::render_api::{Renderer, SurfaceId};
pub use crate::schedule::{Job, RepeatingJob, Scheduler, StepScheduler, TaskHandle};
pub use crate::session::{Session, mount};
pub use crate::view::{CloseContext, Component, InitContext, View};
