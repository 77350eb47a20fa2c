//! Matching candidates against a pattern and generating names from values.

use super::compiler::{Pattern, Token};
use crate::error::{MatchFailure, QueryError};
use crate::{Captures, Value};

/// Outcome of matching one candidate string.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Success(Captures),
    Failure(MatchFailure),
}

impl MatchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, MatchResult::Success(_))
    }

    pub fn into_result(self) -> Result<Captures, MatchFailure> {
        match self {
            MatchResult::Success(captures) => Ok(captures),
            MatchResult::Failure(reason) => Err(reason),
        }
    }
}

impl Pattern {
    /// Decompose `candidate` into typed captures. The whole candidate must
    /// match. Repeats of a textual placeholder must repeat the same text;
    /// numeric repeats must agree after coercion.
    ///
    /// ```
    /// use filefinder::{MatchResult, Pattern, captures};
    ///
    /// let pattern = Pattern::compile("{letters:l}{num:d}_{beg:2}{end}").unwrap();
    /// assert_eq!(
    ///     pattern.match_str("ab200_abcdef"),
    ///     MatchResult::Success(captures! { "letters" => "ab", "num" => 200, "beg" => "ab", "end" => "cdef" })
    /// );
    ///
    /// let repeated = Pattern::compile("{x}_{y}_{x}").unwrap();
    /// assert_eq!(
    ///     repeated.match_str("foo_bar_baz_foo"),
    ///     MatchResult::Success(captures! { "x" => "foo", "y" => "bar_baz" })
    /// );
    /// ```
    pub fn match_str(&self, candidate: &str) -> MatchResult {
        if let Some(linked) = &self.linked {
            match linked.regex.captures(candidate) {
                Ok(Some(caps)) => {
                    return self.collect(caps.iter().skip(1).map(|m| m.map_or("", |m| m.as_str())), &linked.groups);
                }
                Ok(None) => {}
                Err(err) => tracing::debug!(candidate, %err, "backtracking matcher gave up"),
            }
        }

        // Without a linked match, the independent groups tell a plain
        // mismatch apart from a disagreeing repeat.
        let Some(caps) = self.regex.captures(candidate) else {
            return MatchResult::Failure(MatchFailure::NoMatch);
        };
        self.collect(caps.iter().skip(1).map(|m| m.map_or("", |m| m.as_str())), &self.groups)
    }

    /// Coerce group texts into captures. `groups[k]` names the placeholder of
    /// the `k`-th text.
    fn collect<'t>(&self, texts: impl Iterator<Item = &'t str>, groups: &[usize]) -> MatchResult {
        let mut slots: Vec<Option<Value>> = vec![None; self.placeholders.len()];
        for (&index, raw) in groups.iter().zip(texts) {
            let placeholder = &self.placeholders[index];
            let Some(value) = placeholder.spec().coerce(raw) else {
                return MatchResult::Failure(MatchFailure::NoMatch);
            };

            match &slots[index] {
                Some(previous) if *previous != value => {
                    return MatchResult::Failure(MatchFailure::AmbiguousRepeat {
                        name: placeholder.name().to_string(),
                    });
                }
                Some(_) => {}
                None => slots[index] = Some(value),
            }
        }

        let captures = self
            .placeholders
            .iter()
            .zip(slots)
            .filter_map(|(placeholder, slot)| slot.map(|value| (placeholder.name(), value)))
            .collect();
        MatchResult::Success(captures)
    }

    /// Build a concrete name from `values`. Every placeholder must be bound
    /// and no other names may be given.
    pub fn create(&self, values: &Captures) -> Result<String, QueryError> {
        if let Some(unknown) = values.keys().find(|name| self.placeholder(name).is_none()) {
            return Err(QueryError::UnknownPlaceholder {
                name: unknown.to_string(),
                pattern: self.source().to_string(),
            });
        }

        let missing: Vec<String> = self.names().filter(|name| !values.contains(name)).map(str::to_string).collect();
        if !missing.is_empty() {
            return Err(QueryError::MissingKey { missing, pattern: self.source().to_string() });
        }

        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Placeholder(index) => {
                    let placeholder = &self.placeholders[*index];
                    if let Some(value) = values.get(placeholder.name()) {
                        out.push_str(&placeholder.spec().render(value));
                    }
                }
            }
        }
        Ok(out)
    }
}
