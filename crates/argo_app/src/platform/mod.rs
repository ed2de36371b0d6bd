mod app;
pub mod config;
mod console;
mod effects;
pub mod logging;
mod overlay;

pub use app::run_app;
