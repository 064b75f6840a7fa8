//! Scene ordering: what draws on top of what, and what the pointer is over

pub mod bound;
pub mod ordered_list;
pub mod render_list;

pub use bound::Bound;
pub use hit_test::{HitEntry, HitTarget, HitTestList, PointerEvent};
pub use ordered_list::{EntryId, OrderedList, OrderedListError, TempHandle};
pub use render_list::{DrawCommand, Drawable, Painter, RenderList, RenderSurface, Sprite};
