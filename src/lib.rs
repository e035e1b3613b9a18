pub mod error;
pub mod model;
pub mod config;
pub mod api;
pub mod session;
pub mod services;
pub mod present;
pub mod views;
pub mod cli;
pub mod portal;

pub use error::{PortalError, PortalResult};
pub use portal::Portal;
