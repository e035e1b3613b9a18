//! Page view models. Each one fetches through a resource service, runs the list
//! transform and exposes a `ListView` for rendering.

pub mod admin;
pub mod bus;
pub mod canteen;
pub mod home;
pub mod timetable;

pub use admin::{AdminListing, AdminTab, AdminView};
pub use bus::{BusGroups, BusView};
pub use canteen::{CanteenGroups, CanteenView};
pub use home::{nav_items, NavItem, FEATURES};
pub use timetable::{TimetableGroups, TimetableView};
