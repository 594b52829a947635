//! Ratatui front-end split into state, forms, drawing helpers and the terminal loop.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
