use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the record store. The TUI turns these into footer
/// messages; `main` aborts on anything raised while loading at startup.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Lookup on a title that is not in the table.
    #[error("no entry titled \"{0}\"")]
    NotFound(String),

    /// A content file row could not be decoded. `line` is 1-based.
    #[error("content file line {line} is malformed: {reason}")]
    Format { line: usize, reason: String },

    /// The OS error is kept as the source, not repeated in the message.
    #[error("failed to {action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Input rejected before anything was written.
    #[error("{0}")]
    Validation(String),

    #[error("an entry titled \"{0}\" already exists")]
    DuplicateTitle(String),
}

impl StoreError {
    /// Build a closure for `map_err` that tags an `io::Error` with what the
    /// store was doing and to which path.
    pub(crate) fn io(
        action: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| StoreError::Io {
            action,
            path,
            source,
        }
    }
}
