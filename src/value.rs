//! Typed placeholder values and ordered capture mappings.
//!
//! A successful match coerces every captured substring through the
//! placeholder's format spec, so captures are not plain strings:
//!
//! ```text
//! "{letters:l}{num:d}"  +  "ab200"  ──▶  { letters: Str("ab"), num: Int(200) }
//! ```
//!
//! `Captures` keeps first-insertion order because the order of placeholders in
//! a pattern is the canonical order used for reporting and generation.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A single typed value bound to a placeholder.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Compare by text form, so that `Int(1)`, `Float(1.0)` and `Str("1")`
    /// are considered the same value.
    pub fn same_text(&self, other: &Value) -> bool {
        self == other || self.to_string() == other.to_string()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value as a float. Integers beyond 2^53 have no exact `f64`
    /// and give `None`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) if v.unsigned_abs() <= MAX_EXACT_FLOAT_INT => Some(*v as f64),
            Value::Int(_) => None,
            Value::Str(_) => None,
        }
    }
}

const MAX_EXACT_FLOAT_INT: u64 = 1 << 53;

// Floats compare by bit pattern so that values can be grouped and hashed.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Int(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

// --- Captures ----------------------------------------------------------------

/// Ordered `name -> Value` mapping.
///
/// Used both for the values extracted by a match and for the values supplied
/// when generating a name. Lookups are linear; patterns rarely carry more than
/// a handful of placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Captures {
    entries: Vec<(String, Value)>,
}

impl Captures {
    pub fn new() -> Self {
        Captures { entries: Vec::new() }
    }

    /// Insert or replace `name`. A replaced entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Copy of `self` with every entry of `overrides` applied on top.
    ///
    /// ```
    /// use filefinder::captures;
    ///
    /// let base = captures! { "category" => "foo", "number" => 1 };
    /// let merged = base.merged(&captures! { "category" => "bar" });
    /// assert_eq!(merged.get("category").unwrap().to_string(), "bar");
    /// ```
    pub fn merged(&self, overrides: &Captures) -> Captures {
        let mut out = self.clone();
        for (name, value) in overrides.iter() {
            out.insert(name, value.clone());
        }
        out
    }

    /// Add the entries of `other` that are not yet present. Returns the name of
    /// the first entry whose value disagrees with an existing one.
    pub(crate) fn absorb(&mut self, other: Captures) -> Result<(), String> {
        for (name, value) in other.entries {
            match self.get(&name) {
                Some(existing) if *existing != value => return Err(name),
                Some(_) => {}
                None => self.entries.push((name, value)),
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Captures {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut captures = Captures::new();
        for (name, value) in iter {
            captures.insert(name, value);
        }
        captures
    }
}

impl IntoIterator for Captures {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn float_values_hash_and_compare_by_bits() {
        let mut set = HashSet::new();
        set.insert(Value::Float(1.5));
        assert!(set.contains(&Value::Float(1.5)));
        assert_ne!(Value::Float(1.0), Value::Int(1));
    }

    #[test]
    fn same_text_bridges_types() {
        assert!(Value::Int(1).same_text(&Value::from("1")));
        assert!(Value::Float(2.0).same_text(&Value::Int(2)));
        assert!(!Value::Int(1).same_text(&Value::from("01")));
    }

    #[test]
    fn large_integers_have_no_exact_float() {
        assert_eq!(Value::Int(1 << 53).as_float(), Some(9007199254740992.0));
        assert_eq!(Value::Int(-(1 << 53)).as_float(), Some(-9007199254740992.0));
        assert_eq!(Value::Int((1 << 53) + 1).as_float(), None);
        assert_eq!(Value::Int(i64::MIN).as_float(), None);
        assert_eq!(Value::from("1").as_float(), None);
    }

    #[test]
    fn insert_keeps_first_position() {
        let mut caps = crate::captures! { "a" => 1, "b" => "x" };
        assert_eq!(caps.insert("a", 5), Some(Value::Int(1)));
        let keys: Vec<_> = caps.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(caps.get("a"), Some(&Value::Int(5)));
    }

    #[test]
    fn absorb_reports_conflicts() {
        let mut caps = crate::captures! { "model" => "a" };
        assert!(caps.absorb(crate::captures! { "model" => "a", "res" => "1h" }).is_ok());
        assert_eq!(caps.len(), 2);
        assert_eq!(caps.absorb(crate::captures! { "model" => "b" }), Err("model".to_string()));
    }
}
