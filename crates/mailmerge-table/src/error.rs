//! Error types for table extraction.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while extracting a table.
///
/// Malformed body rows are not represented here: they are dropped during
/// extraction rather than reported.
#[derive(Debug, Error)]
pub enum TableError {
    /// No header row was found, so the column count cannot be established.
    ///
    /// Raised both when the input has no table line at all and when its first
    /// block holds nothing but rule lines.
    #[error("no table header found: the first '{delimiter}' block has no header row")]
    MissingHeader { delimiter: char },

    /// The table file could not be read.
    #[error("failed to read table '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TableError {
    /// Create an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
