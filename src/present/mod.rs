//! Presentation helpers: grouping transforms, request sequencing and list view state.

mod group;
mod sequence;
mod view_state;

pub use group::{Grouped, Nested, group_by, group_sorted_by_time, group_nested, filter_by_route, group_timetable, group_bus, group_canteen};
pub use sequence::{RequestSequencer, Ticket};
pub use view_state::{ListView, EmptyNotice, ViewCell};
