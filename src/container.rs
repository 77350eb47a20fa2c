//! Result sets.
//!
//! A query yields one [`Record`] per matching entry. [`FileContainer`] keeps
//! them in discovery order, guarantees that paths are unique and offers the
//! lookups callers need on top of the raw sequence.

use crate::error::QueryError;
use crate::scan::Filters;
use crate::{Captures, Value};
use std::collections::HashSet;

/// One discovered entry: its path and the values parsed from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    path: String,
    captures: Captures,
}

impl Record {
    pub fn new(path: impl Into<String>, captures: Captures) -> Self {
        Record { path: path.into(), captures }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    pub fn into_parts(self) -> (String, Captures) {
        (self.path, self.captures)
    }
}

/// Ordered records with unique paths.
///
/// ```
/// use filefinder::{FileContainer, Record, captures};
///
/// let container = FileContainer::new(
///     vec!["model".to_string()],
///     vec![Record::new("a/a_1h", captures! { "model" => "a" }), Record::new("b/b_1h", captures! { "model" => "b" })],
/// )
/// .unwrap();
/// assert_eq!(container.len(), 2);
/// assert_eq!(container.captures_of("b/b_1h").unwrap().get("model").unwrap().to_string(), "b");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContainer {
    keys: Vec<String>,
    records: Vec<Record>,
}

impl FileContainer {
    /// Build a container, rejecting repeated paths.
    pub fn new(keys: Vec<String>, records: Vec<Record>) -> Result<Self, QueryError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.path.as_str()) {
                return Err(QueryError::DuplicatePath { path: record.path.clone() });
            }
        }
        Ok(FileContainer { keys, records })
    }

    /// Build from records already known to have unique paths.
    pub(crate) fn from_unique(keys: Vec<String>, records: Vec<Record>) -> Self {
        FileContainer { keys, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Capture names shared by every record, in pattern order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(Record::path)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn captures_of(&self, path: &str) -> Option<&Captures> {
        self.records.iter().find(|r| r.path == path).map(Record::captures)
    }

    /// Records whose captures take one of the given values for every filtered
    /// key. Values are compared by their text form.
    pub fn search(&self, filters: &Filters) -> Result<FileContainer, QueryError> {
        for name in filters.names() {
            self.check_key(name)?;
        }

        let records = self
            .records
            .iter()
            .filter(|record| {
                filters.iter().all(|(name, allowed)| {
                    record.captures.get(name).is_some_and(|value| allowed.iter().any(|a| a.same_text(value)))
                })
            })
            .cloned()
            .collect();
        Ok(FileContainer::from_unique(self.keys.clone(), records))
    }

    /// Records of `self` followed by those of `other`. Keys are the union,
    /// `self`'s first.
    pub fn concat(&self, other: &FileContainer) -> Result<FileContainer, QueryError> {
        let mut keys = self.keys.clone();
        for key in &other.keys {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        FileContainer::new(keys, self.records.iter().chain(&other.records).cloned().collect())
    }

    /// One string per record: the values of `keys` (all keys when `None`)
    /// joined by `sep`.
    ///
    /// ```
    /// use filefinder::{FileContainer, Record, captures};
    ///
    /// let container = FileContainer::new(
    ///     vec!["model".into(), "res".into()],
    ///     vec![Record::new("a_1h", captures! { "model" => "a", "res" => "1h" })],
    /// )
    /// .unwrap();
    /// assert_eq!(container.combine_by_key(None, ".").unwrap(), ["a.1h"]);
    /// ```
    pub fn combine_by_key(&self, keys: Option<&[&str]>, sep: &str) -> Result<Vec<String>, QueryError> {
        let keys: Vec<&str> = match keys {
            Some(keys) => {
                for key in keys {
                    self.check_key(key)?;
                }
                keys.to_vec()
            }
            None => self.keys.iter().map(String::as_str).collect(),
        };

        Ok(self
            .records
            .iter()
            .map(|record| {
                keys.iter()
                    .map(|key| record.captures.get(key).map(Value::to_string).unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join(sep)
            })
            .collect())
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    fn check_key(&self, name: &str) -> Result<(), QueryError> {
        if self.keys.iter().any(|k| k == name) {
            Ok(())
        } else {
            Err(QueryError::UnknownKey { name: name.to_string(), available: self.keys.clone() })
        }
    }
}

impl IntoIterator for FileContainer {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a FileContainer {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
