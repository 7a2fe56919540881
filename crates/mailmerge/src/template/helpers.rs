//! Functions and filters exposed to templates.

use std::fs;

use minijinja::{Environment, Error, ErrorKind, Value};

/// Lists the entry names of a directory, sorted by name.
///
/// With no argument the current directory is listed. Sorting keeps repeated
/// runs over an unchanged directory byte-identical.
pub fn listdir(path: Option<String>) -> Result<Vec<String>, Error> {
    let path = path.as_deref().unwrap_or(".");
    let read_error = |err: std::io::Error| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("listdir: cannot read directory '{}'", path),
        )
        .with_source(err)
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(path).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Registers mailmerge's filters on a MiniJinja environment.
pub fn register_filters(env: &mut Environment<'static>) {
    // Usage: {{ content | nl }} outputs content followed by \n
    env.add_filter("nl", |value: Value| -> String { format!("{}\n", value) });
}
