//! Command-line interface.
//!
//! ```text
//! mailmerge [OPTIONS] <TABLE> <TEMPLATE>
//! ```
//!
//! Input paths and the output directory are validated while arguments are
//! parsed, before any file is read or written.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::filename::{FieldSelector, Transliteration};
use crate::merge::MergeOptions;

/// Render a template once per row of a plain-text table.
///
/// The table is the first block of lines starting with `|` in TABLE; its
/// first row names the fields. Each body row is rendered through TEMPLATE
/// (Jinja syntax) into its own file.
#[derive(Debug, Parser)]
#[command(name = "mailmerge", version, about, long_about)]
pub struct Cli {
    /// File containing the table
    #[arg(value_parser = existing_file)]
    pub table: PathBuf,

    /// Template rendered once per table row
    #[arg(value_parser = existing_file)]
    pub template: PathBuf,

    /// Field naming each output file: a column name or zero-based index
    #[arg(short = 'f', long, value_name = "FIELD", default_value = "0")]
    pub filename_field: FieldSelector,

    /// Output file extension [default: the template's extension]
    #[arg(short, long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Transliterate file names to ASCII
    #[arg(short, long)]
    pub transliterate: bool,

    /// Spell umlauts the German way (ü -> ue) when transliterating; implies --transliterate
    #[arg(long)]
    pub german: bool,

    /// Directory the output files are written to
    #[arg(short, long, value_name = "DIR", default_value = ".", value_parser = existing_dir)]
    pub output_dir: PathBuf,

    /// Print the file names that would be written, without writing them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Transliteration mode selected by the flags.
    pub fn transliteration(&self) -> Transliteration {
        if self.german {
            Transliteration::German
        } else if self.transliterate {
            Transliteration::Ascii
        } else {
            Transliteration::Off
        }
    }

    /// Default log filter for the verbosity level, used when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Converts the parsed arguments into merge settings.
    pub fn options(&self) -> MergeOptions {
        let mut options = MergeOptions::new()
            .with_selector(self.filename_field.clone())
            .with_transliteration(self.transliteration())
            .with_output_dir(&self.output_dir)
            .with_dry_run(self.dry_run);
        if let Some(ext) = &self.extension {
            options = options.with_extension(ext.as_str());
        }
        options
    }
}

fn existing_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if !path.exists() {
        return Err(format!("'{}' does not exist", s));
    }
    if !path.is_file() {
        return Err(format!("'{}' is not a file", s));
    }
    Ok(path)
}

fn existing_dir(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if !path.is_dir() {
        return Err(format!("'{}' is not a directory", s));
    }
    Ok(path)
}
