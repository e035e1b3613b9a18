//! Resource services: thin request/response wrappers over the REST endpoints.

mod resource;
mod auth;
mod timetable;
mod bus;
mod canteen;

pub use resource::{Resource, ResourceClient};
pub use auth::AuthService;
pub use timetable::{Timetable, TimetableService};
pub use bus::{Bus, BusService};
pub use canteen::{Canteen, CanteenFilter, CanteenService};
