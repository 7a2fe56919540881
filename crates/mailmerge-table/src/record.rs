//! Ordered field records.

use std::collections::HashMap;

/// One table body row, keyed by the header row's field names.
///
/// A record keeps every `(name, value)` pair in header order, including pairs
/// whose name repeats an earlier one. Reads treat the record like a map built
/// by inserting the pairs in order:
///
/// - [`get`](Record::get) returns the *last* value stored under a name;
/// - [`keys`](Record::keys) yields each distinct name once, at the position of
///   its first occurrence;
/// - [`value_at`](Record::value_at) indexes into that distinct-key order.
///
/// ```rust
/// use mailmerge_table::Record;
///
/// let record = Record::from_pairs([("name", "Anna"), ("file", "a"), ("name", "Bert")]);
///
/// assert_eq!(record.get("name"), Some("Bert"));
/// assert_eq!(record.keys().collect::<Vec<_>>(), vec!["name", "file"]);
/// assert_eq!(record.value_at(0), Some("Bert"));
/// assert_eq!(record.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
    /// Per distinct name, in first-occurrence order: index of its latest pair.
    slots: Vec<usize>,
    /// Name to position in `slots`.
    lookup: HashMap<String, usize>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from `(name, value)` pairs, preserving their order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (name, value) in pairs {
            record.push(name, value);
        }
        record
    }

    /// Appends a field. An existing field with the same name is shadowed, not removed.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let index = self.fields.len();
        match self.lookup.get(&name) {
            Some(&slot) => self.slots[slot] = index,
            None => {
                self.lookup.insert(name.clone(), self.slots.len());
                self.slots.push(index);
            }
        }
        self.fields.push((name, value.into()));
    }

    /// Looks up a field by exact name. Later duplicates win.
    pub fn get(&self, name: &str) -> Option<&str> {
        let slot = *self.lookup.get(name)?;
        Some(self.fields[self.slots[slot]].1.as_str())
    }

    /// Returns true if a field with this name exists.
    pub fn contains_key(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Distinct field names in first-occurrence order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries().map(|(k, _)| k)
    }

    /// Field values in distinct-key order, each resolved with [`get`](Record::get).
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries().map(|(_, v)| v)
    }

    /// Distinct `(name, value)` entries, as a map built from the pairs would hold them.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots.iter().map(move |&i| {
            let (k, v) = &self.fields[i];
            (k.as_str(), v.as_str())
        })
    }

    /// Value at a zero-based position in distinct-key order.
    pub fn value_at(&self, index: usize) -> Option<&str> {
        let &i = self.slots.get(index)?;
        Some(self.fields[i].1.as_str())
    }

    /// Every stored pair, duplicates included, in header order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
