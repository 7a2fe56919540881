//! Error types for a merge run.
//!
//! Every variant is terminal: a run stops at the first error and leaves any
//! files it already wrote in place.

use std::io;
use std::path::PathBuf;

use mailmerge_table::TableError;
use thiserror::Error;

/// Errors that can occur while merging a table into a template.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The table could not be read or has no header row.
    #[error(transparent)]
    Table(#[from] TableError),

    /// The filename field selector names a field the record does not have.
    #[error("unknown filename field '{0}'")]
    UnknownField(String),

    /// The filename field selector points past the record's last field.
    #[error("filename field index {index} is out of range: record has {len} fields")]
    FieldIndexOutOfRange { index: usize, len: usize },

    /// A derived file name is not a single plain path component, so writing it
    /// would leave the output directory.
    #[error("invalid output file name '{0}': must not contain path separators or be '.' or '..'")]
    InvalidFileName(String),

    /// Template syntax error, undefined variable, or failing helper.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// The template file could not be read.
    #[error("failed to read template '{}': {source}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An output file could not be written.
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;
