//! Terminal front end: command parsing/execution and table rendering.

pub mod commands;
pub mod outputformatter;

pub use commands::{parse_command, Command, Shell};
