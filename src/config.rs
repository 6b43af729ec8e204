//! Location of the soundboard's data and the optional `settings.yaml` that
//! tunes the player command and page layout.
//!
//! Everything lives in one folder, `~/.soundboard` by default:
//!
//! ```text
//! ~/.soundboard/
//! ├── content.csv      # title,filename rows
//! ├── audio/           # imported clips
//! ├── settings.yaml    # optional
//! └── soundboard.log
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::store::StorePaths;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".soundboard";
/// Overrides the data directory when set, mainly for running against a
/// scratch catalog.
pub const DATA_DIR_ENV: &str = "SOUNDBOARD_HOME";
const SETTINGS_FILE_NAME: &str = "settings.yaml";
const LOG_FILE_NAME: &str = "soundboard.log";
/// Largest number of board rows or columns that still fits a terminal.
const MAX_GRID_SIDE: usize = 32;

/// User-tunable settings. Every field has a default, so a partial file only
/// overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Program plus leading arguments used to play a clip; the clip path is
    /// appended. `None` picks a platform default.
    pub player: Option<Vec<String>>,
    /// Rows of buttons on the board page.
    pub board_rows: usize,
    /// Columns of buttons on the board page.
    pub board_columns: usize,
    /// Entries listed per page in the editor.
    pub editor_page_size: usize,
    /// Longest title shown on a board button before it is shortened.
    pub label_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player: None,
            board_rows: 5,
            board_columns: 5,
            editor_page_size: 13,
            label_width: 19,
        }
    }
}

impl Settings {
    /// Titles shown on one board page.
    pub fn board_page_size(&self) -> usize {
        self.board_rows.saturating_mul(self.board_columns)
    }

    /// Force every layout dimension to at least one so paging arithmetic
    /// never divides by zero, and keep the board grid drawable.
    fn clamped(mut self) -> Self {
        self.board_rows = self.board_rows.clamp(1, MAX_GRID_SIDE);
        self.board_columns = self.board_columns.clamp(1, MAX_GRID_SIDE);
        self.editor_page_size = self.editor_page_size.max(1);
        self.label_width = self.label_width.max(4);
        self
    }
}

/// Resolve the data directory, honouring [`DATA_DIR_ENV`] first.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

pub fn store_paths(data_dir: &Path) -> StorePaths {
    StorePaths::under(data_dir)
}

pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SETTINGS_FILE_NAME)
}

pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE_NAME)
}

/// Load settings from a YAML file.
///
/// A missing file yields the defaults. A file that cannot be read or parsed
/// is logged and also yields the defaults, so a typo never keeps the board
/// from starting.
pub fn load_settings(path: &Path) -> Settings {
    if !path.exists() {
        info!("no settings at {}, using defaults", path.display());
        return Settings::default();
    }

    let settings = match fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<Settings>(&contents) {
            Ok(settings) => {
                info!("loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                warn!("failed to parse {}: {err}; using defaults", path.display());
                Settings::default()
            }
        },
        Err(err) => {
            warn!("failed to read {}: {err}; using defaults", path.display());
            Settings::default()
        }
    };
    settings.clamped()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let settings = load_settings(Path::new("/nonexistent/soundboard/settings.yaml"));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.board_page_size(), 25);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "board_columns: 4\nplayer: [mpv, --no-video]\n").unwrap();

        let settings = load_settings(&path);
        assert_eq!(settings.board_rows, 5);
        assert_eq!(settings.board_columns, 4);
        assert_eq!(
            settings.player,
            Some(vec!["mpv".to_string(), "--no-video".to_string()])
        );
        assert_eq!(settings.editor_page_size, 13);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "board_rows: [not, a, number\n").unwrap();

        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn zero_dimensions_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "board_rows: 0\neditor_page_size: 0\nlabel_width: 0\n").unwrap();

        let settings = load_settings(&path);
        assert_eq!(settings.board_rows, 1);
        assert_eq!(settings.editor_page_size, 1);
        assert_eq!(settings.label_width, 4);
    }

    #[test]
    fn huge_dimensions_are_capped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(
            &path,
            format!("board_rows: {max}\nboard_columns: {max}\n", max = usize::MAX),
        )
        .unwrap();

        let settings = load_settings(&path);
        assert_eq!(settings.board_rows, MAX_GRID_SIDE);
        assert_eq!(settings.board_page_size(), MAX_GRID_SIDE * MAX_GRID_SIDE);

        let unclamped = Settings {
            board_rows: usize::MAX,
            board_columns: 2,
            ..Settings::default()
        };
        assert_eq!(unclamped.board_page_size(), usize::MAX);
    }

    #[test]
    fn store_lives_under_data_dir() {
        let paths = store_paths(Path::new("/data/sb"));
        assert_eq!(paths.content_file, Path::new("/data/sb/content.csv"));
        assert_eq!(paths.asset_dir, Path::new("/data/sb/audio"));
    }
}
