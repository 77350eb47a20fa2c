//! Per-placeholder filters.
//!
//! A filter maps a placeholder name to the set of values it may take. A
//! scalar is a one-element set. Values are coerced through the placeholder's
//! format spec before comparison, so `"01"`, `1` and `1.0` all select the
//! integer `1` for a `{n:d}` placeholder.

use crate::error::QueryError;
use crate::pattern::Pattern;
use crate::{Captures, Value};
use std::collections::HashSet;

/// Allowed values per placeholder name, in insertion order.
///
/// ```
/// use filefinder::Filters;
///
/// let filters = Filters::new().with("model", "a").with_any("year", [2000, 2001]);
/// assert_eq!(filters.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    entries: Vec<(String, Vec<Value>)>,
}

impl Filters {
    pub fn new() -> Self {
        Filters { entries: Vec::new() }
    }

    /// Allow a single value for `name`. Replaces an earlier filter on `name`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, vec![value.into()]);
        self
    }

    /// Allow any of `values` for `name`. Replaces an earlier filter on `name`.
    pub fn with_any<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.set(name, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, values: Vec<Value>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = values,
            None => self.entries.push((name, values)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every name against `pattern` and coerce the values through the
    /// placeholder specs. Values outside a placeholder's domain are dropped
    /// (they can never match).
    pub(crate) fn resolve(&self, pattern: &Pattern) -> Result<ResolvedFilters, QueryError> {
        let mut allowed = Vec::with_capacity(self.entries.len());
        for (name, values) in &self.entries {
            let placeholder = pattern.placeholder(name).ok_or_else(|| QueryError::UnknownPlaceholder {
                name: name.clone(),
                pattern: pattern.source().to_string(),
            })?;
            let spec = placeholder.spec();
            let set: HashSet<Value> = values.iter().filter_map(|v| spec.coerce(&v.to_string())).collect();
            allowed.push((name.clone(), set));
        }
        Ok(ResolvedFilters { allowed })
    }
}

/// Filters checked and coerced against one pattern.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolvedFilters {
    allowed: Vec<(String, HashSet<Value>)>,
}

impl ResolvedFilters {
    /// Whether every filtered name bound in `captures` has an allowed value.
    /// Names not bound yet are not judged.
    pub(crate) fn admits(&self, captures: &Captures) -> bool {
        self.allowed
            .iter()
            .all(|(name, set)| captures.get(name).is_none_or(|value| set.contains(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captures;

    #[test]
    fn later_filters_replace_earlier_ones() {
        let filters = Filters::new().with("a", 1).with_any("a", ["x", "y"]);
        assert_eq!(filters.get("a"), Some(&[Value::from("x"), Value::from("y")][..]));
        assert_eq!(filters.len(), 1);
    }

    #[test]
    fn resolve_rejects_unknown_names() {
        let pattern = Pattern::compile("{model}_{year:d}").unwrap();
        let err = Filters::new().with("nope", 1).resolve(&pattern).unwrap_err();
        assert_eq!(err.to_string(), "unknown placeholder 'nope' for pattern '{model}_{year:d}'");
    }

    #[test]
    fn values_are_coerced_to_the_placeholder_type() {
        let pattern = Pattern::compile("{model}_{year:d}").unwrap();
        let resolved = Filters::new().with("year", "02000").with("model", 7).resolve(&pattern).unwrap();
        assert!(resolved.admits(&captures! { "model" => "7", "year" => 2000 }));
        assert!(!resolved.admits(&captures! { "model" => "7", "year" => 2001 }));
    }

    #[test]
    fn unbound_names_are_not_judged() {
        let pattern = Pattern::compile("{model}_{year:d}").unwrap();
        let resolved = Filters::new().with("year", 2000).resolve(&pattern).unwrap();
        assert!(resolved.admits(&captures! { "model" => "a" }));
    }

    #[test]
    fn values_outside_the_domain_never_match() {
        let pattern = Pattern::compile("{year:d}").unwrap();
        let resolved = Filters::new().with("year", "abc").resolve(&pattern).unwrap();
        assert!(!resolved.admits(&captures! { "year" => 1 }));
    }
}
