//! The merge run: table in, one rendered file per record out.
//!
//! A run is strictly sequential. For every record, in table order:
//!
//! 1. derive the output file name ([`FileNamer`]);
//! 2. render the template with the record's fields and the helper values;
//! 3. write the rendered text as the complete contents of that file.
//!
//! Any error stops the run. Files written before the error are left in place.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use mailmerge_table::{Record, TableFormat};
use minijinja::Value;
use tracing::{debug, info};

use crate::context::{ContextProvider, ContextRegistry, RecordContext, RenderContext};
use crate::error::{MergeError, Result};
use crate::filename::{template_extension, FieldSelector, FileNamer, Transliteration};
use crate::template::MergeTemplate;

/// Settings for a merge run.
///
/// ```rust
/// use mailmerge::{FieldSelector, MergeOptions, Transliteration};
///
/// let options = MergeOptions::new()
///     .with_selector(FieldSelector::Name("email".into()))
///     .with_transliteration(Transliteration::Ascii)
///     .with_extension("eml")
///     .with_output_dir("out");
/// assert!(!options.dry_run);
/// ```
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Field that names each output file.
    pub selector: FieldSelector,
    /// Transliteration applied to file base names.
    pub transliteration: Transliteration,
    /// Extension override. `None` uses the template's extension.
    pub extension: Option<String>,
    /// Directory output files are written to. Must already exist.
    pub output_dir: PathBuf,
    /// Render every record but write nothing.
    pub dry_run: bool,
    /// Delimiter and rule characters of the table source.
    pub format: TableFormat,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            selector: FieldSelector::default(),
            transliteration: Transliteration::default(),
            extension: None,
            output_dir: PathBuf::from("."),
            dry_run: false,
            format: TableFormat::default(),
        }
    }
}

impl MergeOptions {
    /// Creates options with the defaults: first field, no transliteration,
    /// template extension, current directory.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selector(mut self, selector: FieldSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_transliteration(mut self, transliteration: Transliteration) -> Self {
        self.transliteration = transliteration;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_format(mut self, format: TableFormat) -> Self {
        self.format = format;
        self
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Output paths in record order. Nothing was written if `dry_run` is set.
    pub files: Vec<PathBuf>,
    /// Whether the run was a dry run.
    pub dry_run: bool,
}

impl MergeReport {
    /// Number of records processed.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the table had no body rows.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Renders a template once per table record.
///
/// # Example
///
/// ```rust,no_run
/// use mailmerge::{MailMerge, MergeOptions};
///
/// let report = MailMerge::new(MergeOptions::new())
///     .run_path("contacts.org", "letter.tex")
///     .unwrap();
/// println!("wrote {} files", report.len());
/// ```
#[derive(Debug)]
pub struct MailMerge {
    options: MergeOptions,
    context: ContextRegistry,
}

impl MailMerge {
    /// Creates a merge with the built-in `now` and `listdir` helpers.
    pub fn new(options: MergeOptions) -> Self {
        Self {
            options,
            context: ContextRegistry::with_builtins(),
        }
    }

    /// The run's settings.
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Adds a static helper value visible to every record.
    pub fn context(mut self, name: impl Into<String>, value: Value) -> Self {
        self.context.add_static(name, value);
        self
    }

    /// Adds a helper computed per record.
    pub fn context_fn<P: ContextProvider + 'static>(
        mut self,
        name: impl Into<String>,
        provider: P,
    ) -> Self {
        self.context.add_provider(name, provider);
        self
    }

    /// Loads the table file, then the template file, and merges them.
    pub fn run_path(
        &self,
        table: impl AsRef<Path>,
        template: impl AsRef<Path>,
    ) -> Result<MergeReport> {
        let table = table.as_ref();
        info!(table = %table.display(), "loading table");
        let records = self.options.format.load(table)?;
        self.run_records(&records, template.as_ref())
    }

    /// Merges table lines supplied by the caller with a template file.
    pub fn run_lines<I, S>(&self, lines: I, template: impl AsRef<Path>) -> Result<MergeReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = self.options.format.extract(lines)?;
        self.run_records(&records, template.as_ref())
    }

    fn run_records(&self, records: &[Record], template: &Path) -> Result<MergeReport> {
        info!(template = %template.display(), "loading template");
        let template = MergeTemplate::from_path(template)?;
        self.merge(records, &template)
    }

    /// Renders and writes every record with an already compiled template.
    ///
    /// Without an extension override, the extension is taken from the
    /// template's name.
    pub fn merge(&self, records: &[Record], template: &MergeTemplate) -> Result<MergeReport> {
        let extension = self
            .options
            .extension
            .clone()
            .or_else(|| template_extension(template.name()));
        let namer = FileNamer::new(self.options.selector.clone())
            .with_transliteration(self.options.transliteration)
            .with_extension(extension);

        let started_at = Utc::now();
        let mut report = MergeReport {
            files: Vec::with_capacity(records.len()),
            dry_run: self.options.dry_run,
        };

        for (index, record) in records.iter().enumerate() {
            let file_name = namer.file_name(record)?;
            let path = self.options.output_dir.join(&file_name);

            let ctx = RenderContext::new(index, record, started_at);
            let helpers = self.context.resolve(&ctx);
            let root = RecordContext::new(record.clone(), helpers).into_value();
            let rendered = template.render(root)?;

            if self.options.dry_run {
                debug!(path = %path.display(), bytes = rendered.len(), "dry run, not writing");
            } else {
                fs::write(&path, rendered.as_bytes()).map_err(|source| MergeError::Write {
                    path: path.clone(),
                    source,
                })?;
                info!(path = %path.display(), "wrote");
            }
            report.files.push(path);
        }

        info!(
            records = records.len(),
            dry_run = self.options.dry_run,
            "merge complete"
        );
        Ok(report)
    }
}
