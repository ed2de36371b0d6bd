//! Line-oriented terminal front end.
pub mod commands;
pub mod render;

pub use commands::{parse_command, Command, HELP};
pub use render::{render, summary, RenderCursor};
