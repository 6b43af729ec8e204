//! Core library surface for the soundboard TUI.
//!
//! The record store is the heart of the crate: an ordered catalog of clip
//! titles and audio file names persisted in a flat `title,filename` file that
//! is only ever replaced atomically. The TUI and playback modules are thin
//! layers on top of it.
pub mod config;
pub mod models;
pub mod playback;
pub mod store;
pub mod ui;

/// The catalog entry type the store and UI pass around.
pub use models::Record;

/// Persistence entry points.
pub use store::{RecordStore, StoreError, StorePaths};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
