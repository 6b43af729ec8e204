//! Domain model for a soundboard entry. The type stays a plain data holder so
//! the store can focus on persistence and the TUI on presentation.

use std::fmt;
use std::path::Path;

/// One catalog entry: the title shown on the board and the audio file it
/// plays. Records are compared field by field, which is what the store relies
/// on when checking that a reload reproduced the same table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// User-facing identifier. Unique within a store.
    pub title: String,
    /// File name relative to the asset directory.
    pub filename: String,
}

impl Record {
    pub fn new(title: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            filename: filename.into(),
        }
    }

    /// Derive a record from a source path the way an import does: the file
    /// name becomes `filename` and its stem (extension stripped) the title.
    /// Returns `None` when the path has no usable UTF-8 file name.
    pub fn from_source_path(path: &Path) -> Option<Self> {
        let filename = path.file_name()?.to_str()?;
        let title = Path::new(filename)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(filename);
        Some(Self::new(title, filename))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
