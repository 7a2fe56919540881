//! # mailmerge - Batch File Generation from Plain-Text Tables
//!
//! `mailmerge` renders one template per row of a plain-text table and writes
//! each result to its own file, named after one of the row's fields.
//!
//! The table lives inside an ordinary text file, in Emacs org-mode style:
//!
//! ```text
//! Guest list for the spring party.
//!
//! | name   | email           |
//! |--------+-----------------|
//! | Anna   | anna@example.org |
//! | Müller | mm@example.org   |
//! ```
//!
//! ## Core Concepts
//!
//! - [`Record`]: One table body row, keyed by the header row's field names
//! - [`FieldSelector`]: Which field names each output file (by name or position)
//! - [`Transliteration`]: Optional folding of file names to ASCII
//! - [`MergeTemplate`]: A Jinja template compiled once, rendered per record
//! - [`MailMerge`]: Runs the whole merge and reports the files written
//!
//! ## Quick Start
//!
//! ```rust
//! use mailmerge::{extract_records, MailMerge, MergeOptions, MergeTemplate};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let records = extract_records(["|name|file|", "|---|", "|Anna|out1|"]).unwrap();
//! let template = MergeTemplate::from_source("letter.txt", "Dear {{ name }},").unwrap();
//!
//! let report = MailMerge::new(MergeOptions::new().with_output_dir(dir.path()))
//!     .merge(&records, &template)
//!     .unwrap();
//!
//! let written = std::fs::read_to_string(&report.files[0]).unwrap();
//! assert_eq!(written, "Dear Anna,");
//! ```
//!
//! ## Template Context
//!
//! Every record field is a template variable. Two helpers are always present:
//!
//! | Name | Value |
//! |------|-------|
//! | `now` | Start of the run in UTC, e.g. `2024-03-01T09:30:00Z` |
//! | `listdir(path)` | Sorted entry names of a directory |
//!
//! Record fields shadow helpers of the same name. Undefined variables are
//! errors.
//!
//! ## Errors
//!
//! Every failure ends the run with a [`MergeError`]. Rows with the wrong number
//! of cells are not errors: they are dropped while the table is extracted.

pub mod cli;
pub mod context;
mod error;
pub mod filename;
mod merge;
pub mod template;

// Error type
pub use error::{MergeError, Result};

// Table extraction
pub use mailmerge_table::{
    extract_records, load_table, parse_table, Record, TableError, TableFormat,
};

// File naming
pub use filename::{template_extension, FieldSelector, FileNamer, Transliteration};

// Rendering
pub use context::{ContextProvider, ContextRegistry, RenderContext};
pub use template::MergeTemplate;

// Merge run
pub use merge::{MailMerge, MergeOptions, MergeReport};
