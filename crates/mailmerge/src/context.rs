//! Render context for merge templates.
//!
//! A template sees two kinds of names:
//!
//! 1. The current record's fields, looked up with the record's last-write-wins
//!    rule.
//! 2. Helper values produced by a [`ContextRegistry`], such as `now` and
//!    `listdir`.
//!
//! Record fields shadow helpers of the same name, so a table column called
//! `now` takes precedence over the timestamp helper.
//!
//! # Providers
//!
//! Helpers are registered as [`ContextProvider`]s, resolved once per record
//! against a [`RenderContext`]:
//!
//! ```rust
//! use mailmerge::context::{ContextRegistry, RenderContext};
//! use minijinja::Value;
//!
//! let mut registry = ContextRegistry::new();
//! registry.add_static("company", Value::from("ACME"));
//! registry.add_provider("row", |ctx: &RenderContext| Value::from(ctx.index + 1));
//! ```

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use mailmerge_table::Record;
use minijinja::value::{Enumerator, Object, ObjectRepr};
use minijinja::Value;

use crate::template::helpers;

/// Information available to providers while a record is rendered.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Zero-based position of the record in the table body.
    pub index: usize,

    /// The record being rendered.
    pub record: &'a Record,

    /// When the merge run started. Shared by every record of one run.
    pub started_at: DateTime<Utc>,
}

impl<'a> RenderContext<'a> {
    /// Creates a new render context.
    pub fn new(index: usize, record: &'a Record, started_at: DateTime<Utc>) -> Self {
        Self {
            index,
            record,
            started_at,
        }
    }
}

/// Trait for types that can provide helper values to templates.
///
/// CLI runs are single-threaded, so providers don't require `Send + Sync`.
pub trait ContextProvider {
    /// Produce the value for the given render context.
    fn provide(&self, ctx: &RenderContext) -> Value;
}

/// Blanket implementation for closures that return minijinja values.
impl<F> ContextProvider for F
where
    F: Fn(&RenderContext) -> Value,
{
    fn provide(&self, ctx: &RenderContext) -> Value {
        (self)(ctx)
    }
}

/// A provider that always returns the same value.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    value: Value,
}

impl StaticProvider {
    /// Creates a new static provider with the given value.
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl ContextProvider for StaticProvider {
    fn provide(&self, _ctx: &RenderContext) -> Value {
        self.value.clone()
    }
}

/// Storage for helper values, supporting both static and dynamic providers.
///
/// `ContextRegistry` is cheap to clone since it stores providers as `Rc`.
#[derive(Default, Clone)]
pub struct ContextRegistry {
    providers: HashMap<String, Rc<dyn ContextProvider>>,
}

impl ContextRegistry {
    /// Creates a new empty context registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in helpers.
    ///
    /// - `now`: the run's start time in UTC, RFC 3339 with a `Z` suffix
    /// - `listdir(path)`: sorted entry names of a directory
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.add_provider("now", |ctx: &RenderContext| {
            Value::from(ctx.started_at.to_rfc3339_opts(SecondsFormat::Secs, true))
        });
        registry.add_static("listdir", Value::from_function(helpers::listdir));
        registry
    }

    /// Registers a static helper value.
    pub fn add_static(&mut self, name: impl Into<String>, value: Value) {
        self.providers
            .insert(name.into(), Rc::new(StaticProvider::new(value)));
    }

    /// Registers a dynamic provider, called once per record.
    pub fn add_provider<P: ContextProvider + 'static>(
        &mut self,
        name: impl Into<String>,
        provider: P,
    ) {
        self.providers.insert(name.into(), Rc::new(provider));
    }

    /// Returns true if the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Resolves every provider for the given render context.
    pub fn resolve(&self, ctx: &RenderContext) -> HashMap<String, Value> {
        self.providers
            .iter()
            .map(|(name, provider)| (name.clone(), provider.provide(ctx)))
            .collect()
    }

    /// Gets the names of all registered entries.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(|s| s.as_str())
    }
}

impl std::fmt::Debug for ContextRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Template root object: a record's fields layered over resolved helpers.
#[derive(Debug)]
pub struct RecordContext {
    record: Record,
    helpers: HashMap<String, Value>,
}

impl RecordContext {
    /// Layers `record` over `helpers`.
    pub fn new(record: Record, helpers: HashMap<String, Value>) -> Self {
        Self { record, helpers }
    }

    /// Wraps the context as a minijinja value for rendering.
    pub fn into_value(self) -> Value {
        Value::from_object(self)
    }
}

impl Object for RecordContext {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Map
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let key = key.as_str()?;
        match self.record.get(key) {
            Some(value) => Some(Value::from(value)),
            None => self.helpers.get(key).cloned(),
        }
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(self.record.keys().map(Value::from).collect())
    }
}
