//! Table block extraction.
//!
//! Extraction runs in a fixed sequence of passes over the input:
//!
//! 1. Block: skip lines until the first table line, then collect table lines
//!    until the first non-table line. Later blocks are ignored.
//! 2. Normalize: trim surrounding whitespace.
//! 3. Rules: discard separator lines (`|---|`, `|--|--|`, `|--+--|`).
//! 4. Width: drop rows whose delimiter count differs from the header's.
//! 5. Split: strip one outer delimiter on each side, split, trim fields.
//! 6. Zip: pair each body row with the header into a [`Record`].

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, TableError};
use crate::record::Record;

/// Characters that describe a plain-text table.
///
/// The default matches org-mode tables: `|` separates cells and rule lines
/// are made of `-` with optional `+` junctions.
///
/// ```rust
/// use mailmerge_table::TableFormat;
///
/// let format = TableFormat::new(';').with_separators(['=']);
/// let records = format.extract([";a;b;", ";===;", ";1;2;"]).unwrap();
/// assert_eq!(records[0].get("b"), Some("2"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFormat {
    delimiter: char,
    separators: Vec<char>,
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            delimiter: '|',
            separators: vec!['-', '+'],
        }
    }
}

impl TableFormat {
    /// Creates a format with the given cell delimiter and the default `-`/`+` rule characters.
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    /// Replaces the characters allowed between the delimiters of a rule line.
    pub fn with_separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.separators = separators.into_iter().collect();
        self
    }

    /// The cell delimiter.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Returns true if the line's first non-whitespace character is the delimiter.
    pub fn is_table_line(&self, line: &str) -> bool {
        line.trim_start().starts_with(self.delimiter)
    }

    /// Returns true for an already-trimmed rule line: it opens and closes with
    /// the delimiter, holds nothing but separator and delimiter characters, and
    /// at least one cell is two or more separators wide (`|---|`, `|--|--|`,
    /// `|---+---|`).
    ///
    /// Rows of single-character cells such as `|-|-|` or `|||` are data.
    pub fn is_rule_line(&self, line: &str) -> bool {
        let Some(inner) = line
            .strip_prefix(self.delimiter)
            .and_then(|rest| rest.strip_suffix(self.delimiter))
        else {
            return false;
        };
        let mut cells = inner.split(self.delimiter);
        cells
            .clone()
            .all(|cell| cell.chars().all(|c| self.separators.contains(&c)))
            && cells.any(|cell| cell.chars().count() >= 2)
    }

    fn delimiter_count(&self, line: &str) -> usize {
        line.matches(self.delimiter).count()
    }

    fn split_row(&self, line: &str) -> Vec<String> {
        let inner = line.strip_prefix(self.delimiter).unwrap_or(line);
        let inner = inner.strip_suffix(self.delimiter).unwrap_or(inner);
        inner
            .split(self.delimiter)
            .map(|field| field.trim().to_string())
            .collect()
    }

    /// Extracts records from a sequence of lines.
    ///
    /// Returns [`TableError::MissingHeader`] when no header row survives the
    /// block and rule passes. A header with no body yields an empty list.
    pub fn extract<I, S>(&self, lines: I) -> Result<Vec<Record>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = self.table_block(lines);

        let mut rows = rows.into_iter().filter(|(lineno, row)| {
            let rule = self.is_rule_line(row);
            if rule {
                debug!(line = lineno, "skipping rule line");
            }
            !rule
        });

        let (_, header) = rows.next().ok_or(TableError::MissingHeader {
            delimiter: self.delimiter,
        })?;
        let expected = self.delimiter_count(&header);
        let header = self.split_row(&header);

        let records: Vec<Record> = rows
            .filter(|(lineno, row)| {
                let count = self.delimiter_count(row);
                if count != expected {
                    debug!(
                        line = lineno,
                        expected,
                        found = count,
                        "dropping row with mismatched column count"
                    );
                }
                count == expected
            })
            .map(|(_, row)| {
                header
                    .iter()
                    .cloned()
                    .zip(self.split_row(&row))
                    .collect::<Record>()
            })
            .collect();

        debug!(columns = header.len(), records = records.len(), "extracted table");
        Ok(records)
    }

    /// Extracts records from a whole document held in memory.
    pub fn parse(&self, text: &str) -> Result<Vec<Record>> {
        self.extract(text.lines())
    }

    /// Reads a file and extracts its records.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Vec<Record>> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| TableError::io(path, e))?;
        self.parse(&text)
    }

    /// First contiguous run of table lines, trimmed, with 1-based line numbers.
    fn table_block<I, S>(&self, lines: I) -> Vec<(usize, String)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines = lines.into_iter().enumerate();
        let mut block = Vec::new();

        // Phase 1: skip up to the first table line.
        for (idx, line) in lines.by_ref() {
            let line = line.as_ref();
            if self.is_table_line(line) {
                block.push((idx + 1, line.trim().to_string()));
                break;
            }
        }
        if block.is_empty() {
            return block;
        }

        // Phase 2: collect until the block ends.
        for (idx, line) in lines {
            let line = line.as_ref();
            if !self.is_table_line(line) {
                break;
            }
            block.push((idx + 1, line.trim().to_string()));
        }

        block
    }
}

/// Extracts records from lines using the default `|` table format.
pub fn extract_records<I, S>(lines: I) -> Result<Vec<Record>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    TableFormat::default().extract(lines)
}

/// Extracts records from an in-memory document using the default table format.
pub fn parse_table(text: &str) -> Result<Vec<Record>> {
    TableFormat::default().parse(text)
}

/// Reads a table file and extracts its records using the default table format.
pub fn load_table(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    TableFormat::default().load(path)
}
