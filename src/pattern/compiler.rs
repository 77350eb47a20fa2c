//! Pattern compilation.
//!
//! Compilation is a single left-to-right scan producing tokens, followed by
//! building two regexes from those tokens:
//!
//! ```text
//! "{a:l}_x/{b}"  ──tokenize──▶  [Ph(a), Lit("_x/"), Ph(b)]
//!                               │
//!                               ├─ strict: ^([A-Za-z]+)_x/([^/]+)$
//!                               └─ shape:  ^[^/]*_x/[^/]*$
//! ```
//!
//! The strict regex has one capture group per placeholder *occurrence*;
//! `groups` maps each group back to its placeholder so repeated names can be
//! compared after coercion.
//!
//! When a textual placeholder (any kind but `d`, `f`, `e`, `g`) repeats, a
//! third, linked regex is built with `fancy_regex`. Its later occurrences are
//! backreferences, so the engine backtracks until every copy holds the same
//! text:
//!
//! ```text
//! "{x}_{y}_{x}"  ──▶  linked: ^(?P<x>[^/]+)_([^/]+)_(?P=x)$
//!
//! "foo_bar_baz_foo"  ──▶  x = "foo", y = "bar_baz"
//! ```
//!
//! Numeric repeats keep separate groups, since `01` and `1` are the same
//! integer.
//!
//! ## Invariants
//!
//! - `placeholders` holds each name once, in first-occurrence order.
//! - `Token::Placeholder(i)` indexes into `placeholders`.
//! - `groups[k]` is the placeholder of capture group `k + 1`, and likewise
//!   for `Linked::groups`.

use super::format_spec::{FormatSpec, not_separator};
use crate::SEP;
use crate::error::PatternError;
use crate::value::Captures;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::borrow::Cow;

/// A named capture slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    name: String,
    spec_text: String,
    spec: FormatSpec,
}

impl Placeholder {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The spec exactly as written, empty when absent.
    pub fn spec_text(&self) -> &str {
        &self.spec_text
    }

    pub fn spec(&self) -> FormatSpec {
        self.spec
    }
}

/// A run of literal text between placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralRun {
    pub text: String,
    pub has_separator: bool,
    /// Number of distinct placeholders seen before this run. Because
    /// placeholders are kept in first-occurrence order, these are
    /// `placeholders()[..names_seen]`.
    pub names_seen: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(String),
    Placeholder(usize),
}

/// A compiled placeholder pattern. Immutable once built; cheap to share by
/// reference across threads.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    pub(crate) tokens: Vec<Token>,
    pub(crate) placeholders: Vec<Placeholder>,
    literals: Vec<LiteralRun>,
    pub(crate) groups: Vec<usize>,
    pub(crate) regex: Regex,
    pub(crate) linked: Option<Linked>,
    shape: Regex,
    levels: OnceCell<Vec<Pattern>>,
}

/// Strict regex with repeated textual placeholders written as
/// backreferences.
#[derive(Debug, Clone)]
pub(crate) struct Linked {
    pub(crate) regex: fancy_regex::Regex,
    pub(crate) groups: Vec<usize>,
}

impl Pattern {
    /// Compile `source`.
    ///
    /// # Example
    /// ```
    /// use filefinder::Pattern;
    ///
    /// let pattern = Pattern::compile("{category}_file_{number:d}").unwrap();
    /// assert_eq!(pattern.names().collect::<Vec<_>>(), ["category", "number"]);
    /// ```
    pub fn compile(source: &str) -> Result<Pattern, PatternError> {
        let mut tokens = Vec::new();
        let mut placeholders: Vec<Placeholder> = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(invalid(source, format!("nested '{{' in placeholder at position {pos}"))),
                            _ => body.push(c),
                        }
                    }
                    if !closed {
                        return Err(invalid(source, format!("unclosed '{{' at position {pos}")));
                    }

                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    let index = intern(source, &body, &mut placeholders)?;
                    tokens.push(Token::Placeholder(index));
                }
                '}' => return Err(invalid(source, format!("single '}}' encountered at position {pos}"))),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Pattern::from_parts(source.to_string(), tokens, placeholders)
    }

    fn from_parts(source: String, tokens: Vec<Token>, placeholders: Vec<Placeholder>) -> Result<Pattern, PatternError> {
        let mut occurrences = vec![0usize; placeholders.len()];
        for token in &tokens {
            if let Token::Placeholder(index) = token {
                occurrences[*index] += 1;
            }
        }
        let is_linked = |index: usize| occurrences[index] > 1 && placeholders[index].spec.is_textual();

        let mut strict = String::from("^");
        let mut linked = String::from("^");
        let mut shape = String::from("^");
        let mut groups = Vec::new();
        let mut linked_groups = Vec::new();
        let mut bound = vec![false; placeholders.len()];
        let mut literals = Vec::new();
        let mut seen = 0usize;

        for token in &tokens {
            match token {
                Token::Literal(text) => {
                    let escaped = regex::escape(text);
                    strict.push_str(&escaped);
                    linked.push_str(&escaped);
                    shape.push_str(&escaped);
                    literals.push(LiteralRun { text: text.clone(), has_separator: text.contains(SEP), names_seen: seen });
                }
                Token::Placeholder(index) => {
                    let placeholder = &placeholders[*index];
                    let fragment = placeholder.spec.fragment();
                    strict.push_str(&format!("({fragment})"));
                    groups.push(*index);

                    if !is_linked(*index) {
                        linked.push_str(&format!("({fragment})"));
                        linked_groups.push(*index);
                    } else if bound[*index] {
                        linked.push_str(&format!("(?P={})", placeholder.name));
                    } else {
                        linked.push_str(&format!("(?P<{}>{fragment})", placeholder.name));
                        linked_groups.push(*index);
                        bound[*index] = true;
                    }

                    shape.push_str(&not_separator());
                    shape.push('*');
                    seen = seen.max(index + 1);
                }
            }
        }
        strict.push('$');
        linked.push('$');
        shape.push('$');

        let linked = if (0..placeholders.len()).any(is_linked) {
            Some(Linked { regex: fancy_regex::Regex::new(&linked)?, groups: linked_groups })
        } else {
            None
        };

        Ok(Pattern {
            source,
            tokens,
            placeholders,
            literals,
            groups,
            regex: Regex::new(&strict)?,
            linked,
            shape: Regex::new(&shape)?,
            levels: OnceCell::new(),
        })
    }

    /// The pattern string this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names in first-occurrence order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(|p| p.name.as_str())
    }

    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    pub fn placeholder(&self, name: &str) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| p.name == name)
    }

    pub fn literals(&self) -> &[LiteralRun] {
        &self.literals
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains_separator(&self) -> bool {
        self.literals.iter().any(|l| l.has_separator)
    }

    /// The pattern with every `:spec` removed.
    pub fn without_format_specs(&self) -> String {
        render(&self.tokens, &self.placeholders, false)
    }

    /// Whether `candidate` has the pattern's shape: literals in place and
    /// every placeholder relaxed to any run of non-separator characters.
    pub fn matches_shape(&self, candidate: &str) -> bool {
        self.shape.is_match(candidate)
    }

    /// Concatenate two patterns as if their sources were written back to back.
    pub fn join(&self, other: &Pattern) -> Result<Pattern, PatternError> {
        Pattern::compile(&format!("{}{}", self.source, other.source))
    }

    /// The pattern with textual placeholders already bound in `values`
    /// replaced by their text. Numeric placeholders stay open and are
    /// compared after coercion by the caller.
    ///
    /// ```
    /// use filefinder::{Pattern, captures};
    ///
    /// let level = Pattern::compile("{model}_{res}").unwrap();
    /// let pinned = level.bind(&captures! { "model" => "a_b" }).unwrap();
    /// assert_eq!(pinned.source(), "a_b_{res}");
    /// ```
    pub fn bind(&self, values: &Captures) -> Result<Cow<'_, Pattern>, PatternError> {
        let pinned = |index: usize| {
            let placeholder = &self.placeholders[index];
            placeholder.spec.is_textual() && values.contains(&placeholder.name)
        };
        if !self.tokens.iter().any(|t| matches!(t, Token::Placeholder(i) if pinned(*i))) {
            return Ok(Cow::Borrowed(self));
        }

        let tokens: Vec<Token> = self
            .tokens
            .iter()
            .map(|token| match token {
                Token::Placeholder(index) if pinned(*index) => {
                    let placeholder = &self.placeholders[*index];
                    let text = values.get(&placeholder.name).map(|v| placeholder.spec.render(v));
                    Token::Literal(text.unwrap_or_default())
                }
                other => other.clone(),
            })
            .collect();
        Ok(Cow::Owned(Pattern::compile(&render(&tokens, &self.placeholders, true))?))
    }

    /// Split off the fixed directory prefix: everything up to the last
    /// separator of the leading literal. The prefix is returned without its
    /// trailing separator (except for the filesystem root itself).
    ///
    /// ```
    /// use filefinder::Pattern;
    ///
    /// let pattern = Pattern::compile("/data/run_{id}/{file}").unwrap();
    /// let (root, rest) = pattern.split_root().unwrap();
    /// assert_eq!(root, "/data");
    /// assert_eq!(rest.source(), "run_{id}/{file}");
    /// ```
    pub fn split_root(&self) -> Result<(String, Pattern), PatternError> {
        let Some(Token::Literal(first)) = self.tokens.first() else {
            return Ok((String::new(), self.clone()));
        };
        let Some(cut) = first.rfind(SEP) else {
            return Ok((String::new(), self.clone()));
        };

        let prefix = &first[..cut + SEP.len_utf8()];
        let trimmed = prefix.trim_end_matches(SEP);
        let root = if trimmed.is_empty() { SEP.to_string() } else { trimmed.to_string() };

        let mut rest = Vec::with_capacity(self.tokens.len());
        let remainder = &first[prefix.len()..];
        if !remainder.is_empty() {
            rest.push(Token::Literal(remainder.to_string()));
        }
        rest.extend(self.tokens.iter().skip(1).cloned());

        Ok((root, Pattern::compile(&render(&rest, &self.placeholders, true))?))
    }

    /// One sub-pattern per directory level, split at separators. Empty levels
    /// (doubled, leading or trailing separators) are dropped. Built on first
    /// use and cached on the pattern.
    pub fn levels(&self) -> Result<&[Pattern], PatternError> {
        self.levels
            .get_or_try_init(|| {
                let mut levels: Vec<Vec<Token>> = vec![Vec::new()];
                for token in &self.tokens {
                    match token {
                        Token::Literal(text) => {
                            let mut parts = text.split(SEP);
                            if let (Some(head), Some(level)) =
                                (parts.next().filter(|p| !p.is_empty()), levels.last_mut())
                            {
                                level.push(Token::Literal(head.to_string()));
                            }
                            for part in parts {
                                let mut level = Vec::new();
                                if !part.is_empty() {
                                    level.push(Token::Literal(part.to_string()));
                                }
                                levels.push(level);
                            }
                        }
                        Token::Placeholder(_) => {
                            if let Some(level) = levels.last_mut() {
                                level.push(token.clone());
                            }
                        }
                    }
                }

                levels
                    .iter()
                    .filter(|level| !level.is_empty())
                    .map(|level| Pattern::compile(&render(level, &self.placeholders, true)))
                    .collect()
            })
            .map(Vec::as_slice)
    }
}

/// Add the placeholder written as `body` (`name` or `name:spec`), returning
/// its index. Repeats must carry the same spec.
fn intern(source: &str, body: &str, placeholders: &mut Vec<Placeholder>) -> Result<usize, PatternError> {
    let (name, spec_text) = body.split_once(':').unwrap_or((body, ""));

    if name.is_empty() {
        return Err(invalid(source, "placeholder without a name".to_string()));
    }
    if !crate::regex!(r"^[A-Za-z_][A-Za-z0-9_]*$").is_match(name) {
        return Err(invalid(source, format!("'{name}' is not a valid identifier")));
    }

    let spec = FormatSpec::parse(spec_text).ok_or_else(|| PatternError::InvalidFormatSpec {
        pattern: source.to_string(),
        name: name.to_string(),
        spec: spec_text.to_string(),
    })?;

    if let Some(index) = placeholders.iter().position(|p| p.name == name) {
        let existing = &placeholders[index];
        if existing.spec != spec {
            return Err(invalid(
                source,
                format!(
                    "placeholder '{name}' repeated with differing format specs ('{}' and '{spec_text}')",
                    existing.spec_text
                ),
            ));
        }
        return Ok(index);
    }

    placeholders.push(Placeholder { name: name.to_string(), spec_text: spec_text.to_string(), spec });
    Ok(placeholders.len() - 1)
}

fn invalid(source: &str, reason: String) -> PatternError {
    PatternError::InvalidPlaceholder { pattern: source.to_string(), reason }
}

/// Write tokens back in pattern syntax, escaping literal braces.
fn render(tokens: &[Token], placeholders: &[Placeholder], with_specs: bool) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Literal(text) => out.push_str(&text.replace('{', "{{").replace('}', "}}")),
            Token::Placeholder(index) => {
                let placeholder = &placeholders[*index];
                out.push('{');
                out.push_str(&placeholder.name);
                if with_specs && !placeholder.spec_text.is_empty() {
                    out.push(':');
                    out.push_str(&placeholder.spec_text);
                }
                out.push('}');
            }
        }
    }
    out
}
