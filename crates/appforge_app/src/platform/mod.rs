mod app;
pub(crate) mod config;
mod effects;
pub(crate) mod history;
pub(crate) mod logging;
mod render;

pub use app::run_app;
