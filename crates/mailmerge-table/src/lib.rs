//! Table extraction for mail-merge style batch rendering.
//!
//! This crate pulls a rectangular table out of a larger plain-text file, in the
//! style of Emacs org-mode tables:
//!
//! ```text
//! Some notes that are ignored.
//!
//! | name  | file |
//! |-------+------|
//! | Anna  | out1 |
//! | Bert  | out2 |
//!
//! Trailing text, also ignored.
//! ```
//!
//! The first row becomes the header; every following row becomes a [`Record`]
//! mapping header names to that row's values.
//!
//! # Quick Start
//!
//! ```rust
//! use mailmerge_table::extract_records;
//!
//! let lines = ["x", "|name|file|", "|--|--|", "|Anna|out1|", "|Bert|out2|"];
//! let records = extract_records(lines).unwrap();
//!
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].get("name"), Some("Anna"));
//! assert_eq!(records[1].get("file"), Some("out2"));
//! ```
//!
//! # Extraction Rules
//!
//! | Step | Behavior |
//! |------|----------|
//! | Block | Only the first contiguous run of lines starting with `\|` is used |
//! | Rules | Lines like `\|---\|` or `\|--+--\|` are discarded; `\|-\|-\|` is a data row |
//! | Width | Rows whose delimiter count differs from the header are dropped |
//! | Fields | Outer delimiters stripped, fields split and trimmed |
//!
//! Dropped rows are not errors. The only fatal input condition is a table with
//! no header row, since the column count cannot be established.
//!
//! # Entry Points
//!
//! - [`extract_records`]: any iterator of lines (in-memory sources)
//! - [`parse_table`]: a whole document as one string
//! - [`load_table`]: a file path
//!
//! Use [`TableFormat`] directly to change the delimiter or rule characters.

mod error;
mod extract;
mod record;

pub use error::{Result, TableError};
pub use extract::{extract_records, load_table, parse_table, TableFormat};
pub use record::Record;
