//! Template loading and rendering.
//!
//! Templates use Jinja syntax, rendered by MiniJinja. A [`MergeTemplate`] is
//! compiled once and rendered once per record.
//!
//! ## Differences from a default MiniJinja environment
//!
//! | Setting | Value |
//! |---------|-------|
//! | Undefined variables | Error (strict) |
//! | Auto-escaping | Off for every extension |
//! | Loader | The template file's directory, for `{% include %}` |
//!
//! ## Helpers
//!
//! Besides record fields, templates can use:
//!
//! - `now`: start time of the run, e.g. `2024-03-01T09:30:00Z`
//! - `listdir(path=".")`: sorted entry names of a directory
//! - `| nl`: append a newline to a value
//!
//! ## See Also
//!
//! - [`crate::context`]: how record fields and helpers are combined

mod engine;
pub mod helpers;

pub use engine::{new_environment, MergeTemplate};
