use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use super::error::StoreError;

/// Name of the content file inside the data directory.
const CONTENT_FILE_NAME: &str = "content.csv";
/// Folder holding the audio assets inside the data directory.
const ASSET_DIR_NAME: &str = "audio";

/// Where a store keeps its content file and audio assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub content_file: PathBuf,
    pub asset_dir: PathBuf,
}

impl StorePaths {
    pub fn new(content_file: impl Into<PathBuf>, asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_file: content_file.into(),
            asset_dir: asset_dir.into(),
        }
    }

    /// Standard layout beneath a data directory: `content.csv` next to an
    /// `audio/` folder.
    pub fn under(root: &Path) -> Self {
        Self::new(root.join(CONTENT_FILE_NAME), root.join(ASSET_DIR_NAME))
    }

    /// Create the asset directory and an empty content file when they do not
    /// exist yet. Existing files are left untouched.
    pub fn ensure_layout(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.asset_dir)
            .map_err(StoreError::io("create asset directory", &self.asset_dir))?;

        if let Some(parent) = self.content_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(StoreError::io("create data directory", parent))?;
            }
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.content_file)
            .map_err(StoreError::io("create content file", &self.content_file))?;

        Ok(())
    }

    /// Directory the content file lives in; temporary files for atomic
    /// rewrites are created here so the final rename stays on one volume.
    pub(crate) fn content_dir(&self) -> &Path {
        match self.content_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}
