//! Output file naming.
//!
//! Each record names its own output file. A [`FieldSelector`] picks the field
//! that supplies the base name, [`Transliteration`] optionally folds it to
//! ASCII, and the extension comes from an explicit override or from the
//! template's own file name.
//!
//! ```rust
//! use mailmerge::filename::{FieldSelector, FileNamer, Transliteration};
//! use mailmerge_table::Record;
//!
//! let record = Record::from_pairs([("name", "Müller"), ("file", "out1")]);
//!
//! let namer = FileNamer::new(FieldSelector::Index(0))
//!     .with_transliteration(Transliteration::Ascii)
//!     .with_extension(Some("txt"));
//! assert_eq!(namer.file_name(&record).unwrap(), "Muller.txt");
//! ```

use std::convert::Infallible;
use std::fmt;
use std::path::{is_separator, Component, Path};
use std::str::FromStr;

use deunicode::deunicode;
use mailmerge_table::Record;

use crate::error::{MergeError, Result};

/// Umlaut spellings used by [`Transliteration::German`].
pub const GERMAN_SUBSTITUTIONS: &[(char, &str)] = &[
    ('Ä', "Ae"),
    ('Ö', "Oe"),
    ('Ü', "Ue"),
    ('ß', "ss"),
    ('ä', "ae"),
    ('ö', "oe"),
    ('ü', "ue"),
];

/// Chooses the record field that supplies an output file's base name.
///
/// Parsing from a string treats an all-digit value as a position and anything
/// else as a field name:
///
/// ```rust
/// use mailmerge::filename::FieldSelector;
///
/// assert_eq!("2".parse::<FieldSelector>().unwrap(), FieldSelector::Index(2));
/// assert_eq!("email".parse::<FieldSelector>().unwrap(), FieldSelector::Name("email".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelector {
    /// Zero-based position in the record's field order.
    Index(usize),
    /// Exact field name.
    Name(String),
}

impl Default for FieldSelector {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl FromStr for FieldSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = s.parse() {
                return Ok(Self::Index(index));
            }
        }
        Ok(Self::Name(s.to_string()))
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSelector::Index(index) => write!(f, "{}", index),
            FieldSelector::Name(name) => write!(f, "{}", name),
        }
    }
}

impl FieldSelector {
    /// Returns the selected field's value.
    pub fn select<'r>(&self, record: &'r Record) -> Result<&'r str> {
        match self {
            FieldSelector::Index(index) => {
                record
                    .value_at(*index)
                    .ok_or(MergeError::FieldIndexOutOfRange {
                        index: *index,
                        len: record.len(),
                    })
            }
            FieldSelector::Name(name) => record
                .get(name)
                .ok_or_else(|| MergeError::UnknownField(name.clone())),
        }
    }
}

/// How non-ASCII characters in a base name are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transliteration {
    /// Keep the base name as-is.
    #[default]
    Off,
    /// Replace each non-ASCII character with its closest ASCII spelling.
    Ascii,
    /// Spell umlauts and `ß` the German way, then fold the rest to ASCII.
    German,
}

impl Transliteration {
    /// Applies this mode to a base name.
    pub fn apply(self, base: &str) -> String {
        match self {
            Transliteration::Off => base.to_string(),
            Transliteration::Ascii => deunicode(base),
            Transliteration::German => deunicode(&german_substitute(base)),
        }
    }
}

fn german_substitute(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match GERMAN_SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}

/// Extension of a template file: the text after the last `.` of its file name.
///
/// Returns `None` when the name has no `.` or ends with one.
pub fn template_extension(template: impl AsRef<Path>) -> Option<String> {
    let name = template.as_ref().file_name()?.to_str()?;
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_string())
}

/// Derives output file names from records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileNamer {
    selector: FieldSelector,
    transliteration: Transliteration,
    extension: Option<String>,
}

impl FileNamer {
    /// Creates a namer with no transliteration and no extension.
    pub fn new(selector: FieldSelector) -> Self {
        Self {
            selector,
            ..Self::default()
        }
    }

    /// Sets the transliteration mode.
    pub fn with_transliteration(mut self, transliteration: Transliteration) -> Self {
        self.transliteration = transliteration;
        self
    }

    /// Sets the extension. A leading `.` is ignored; an empty value means none.
    pub fn with_extension<S: AsRef<str>>(mut self, extension: Option<S>) -> Self {
        self.extension = extension
            .map(|e| e.as_ref().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty());
        self
    }

    /// The extension appended to every name, if any.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Base name for a record, after transliteration.
    pub fn base_name(&self, record: &Record) -> Result<String> {
        let base = self.selector.select(record)?;
        Ok(self.transliteration.apply(base))
    }

    /// Full file name for a record: `{base}.{extension}`, or `{base}` without one.
    ///
    /// Fails with [`MergeError::InvalidFileName`] unless the name is a single
    /// plain path component.
    pub fn file_name(&self, record: &Record) -> Result<String> {
        let base = self.base_name(record)?;
        let name = match &self.extension {
            Some(ext) => format!("{}.{}", base, ext),
            None => base,
        };
        check_file_name(name)
    }
}

fn check_file_name(name: String) -> Result<String> {
    let mut components = Path::new(&name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if single && !name.chars().any(is_separator) {
        Ok(name)
    } else {
        Err(MergeError::InvalidFileName(name))
    }
}
