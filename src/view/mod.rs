mod bounds;
mod quadtree;
mod selection;
mod session;
mod visible;

pub use bounds::Bound;
pub use selection::{EdgePartition, MarkerState};
pub use session::{EdgeView, MapSession, MarkerView, RenderFrame};
pub use visible::{DEFAULT_RESULT_CAP, ViewportIndex, VisibleSet, visible_set};
