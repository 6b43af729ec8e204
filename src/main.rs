//! Binary entry point: resolve the data directory, start logging into it,
//! load the catalog and hand control to the Ratatui event loop.
use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use soundboard::{config, playback, run_app, App, RecordStore};

/// Initialize persistence, load the catalog, and launch the event loop.
///
/// A malformed content file aborts here with the offending line printed to
/// the terminal, since the board cannot be trusted with a partial table.
fn main() -> Result<()> {
    let data_dir = config::data_dir()?;
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    init_logging(&config::log_path(&data_dir))?;
    log::info!("soundboard starting, data in {}", data_dir.display());

    let settings = config::load_settings(&config::settings_path(&data_dir));
    let store = RecordStore::open(config::store_paths(&data_dir))
        .context("failed to load the soundboard catalog")?;
    log::info!("catalog holds {} clip(s)", store.len());

    let player = playback::from_settings(&settings);
    let mut app = App::new(store, player, settings);
    run_app(&mut app)
}

/// The TUI owns the terminal, so log records go to a file instead. Set
/// `RUST_LOG=debug` for codec and paging detail.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
