//! Ratatui front-end: a paged grid of clip buttons plus an editor page for
//! adding, renaming, deleting and reordering entries.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
