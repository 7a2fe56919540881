//! MiniJinja-backed merge template.

use std::fs;
use std::path::Path;

use minijinja::{path_loader, AutoEscape, Environment, UndefinedBehavior, Value};

use super::helpers;
use crate::error::{MergeError, Result};

/// Creates the environment every merge template is compiled in.
///
/// Undefined variables are errors and nothing is auto-escaped, whatever the
/// template's extension.
pub fn new_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    helpers::register_filters(&mut env);
    env
}

/// A template compiled once and rendered once per record.
///
/// # Example
///
/// ```rust
/// use mailmerge::template::MergeTemplate;
/// use minijinja::context;
///
/// let template = MergeTemplate::from_source("letter.txt", "Dear {{ name }},").unwrap();
/// assert_eq!(template.name(), "letter.txt");
/// assert_eq!(template.render(context! { name => "Anna" }).unwrap(), "Dear Anna,");
/// ```
#[derive(Debug)]
pub struct MergeTemplate {
    env: Environment<'static>,
    name: String,
}

impl MergeTemplate {
    /// Reads and compiles a template file.
    ///
    /// The file's directory becomes the loader root, so `{% include %}` and
    /// `{% extends %}` resolve relative to the template.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| MergeError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let root = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        };

        let mut env = new_environment();
        env.set_loader(path_loader(root));
        env.add_template_owned(name.clone(), source)?;
        Ok(Self { env, name })
    }

    /// Compiles an in-memory template. Includes are not available.
    pub fn from_source(name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let mut env = new_environment();
        env.add_template_owned(name.clone(), source.into())?;
        Ok(Self { env, name })
    }

    /// The template's name: its file name when loaded from disk.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mutable access to the environment, for registering extra filters or functions.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    /// Renders the template against a root context value.
    pub fn render(&self, ctx: Value) -> Result<String> {
        let tmpl = self.env.get_template(&self.name)?;
        Ok(tmpl.render(ctx)?)
    }
}
