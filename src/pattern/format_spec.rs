//! Per-placeholder format specs.
//!
//! The grammar is intentionally tiny. It covers what is needed to *match*
//! names, not general output formatting:
//!
//! ```text
//! spec   kind            matches                      value
//! ----   -------------   --------------------------   -----
//! d      Integer         [+-]?\d+                     Int
//! f e g  Float           sign, digits, frac, exponent Float
//! l      Letters         [A-Za-z]+                    Str
//! w      Word            [A-Za-z0-9_]+                Str
//! N      FixedWidth(N)   exactly N non-separator      Str
//! ""     Greedy          one or more non-separator    Str
//! ```
//!
//! Each kind pairs a regex fragment (without capture groups) with a coercion
//! from the captured text to a [`Value`].

use crate::{SEP, Value};

/// Parsed format spec of a single placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatSpec {
    Integer,
    /// Float, remembering which of `f`, `e`, `g` was written.
    Float(char),
    Letters,
    Word,
    FixedWidth(usize),
    Greedy,
}

const FLOAT_FRAGMENT: &str = r"[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?";

impl FormatSpec {
    /// Interpret `spec`. Returns `None` when the spec is not recognized; the
    /// caller attaches the pattern context to the error.
    pub fn parse(spec: &str) -> Option<FormatSpec> {
        match spec {
            "" => Some(FormatSpec::Greedy),
            "d" => Some(FormatSpec::Integer),
            "f" => Some(FormatSpec::Float('f')),
            "e" => Some(FormatSpec::Float('e')),
            "g" => Some(FormatSpec::Float('g')),
            "l" => Some(FormatSpec::Letters),
            "w" => Some(FormatSpec::Word),
            _ if spec.bytes().all(|b| b.is_ascii_digit()) => match spec.parse::<usize>() {
                Ok(0) | Err(_) => None,
                Ok(width) => Some(FormatSpec::FixedWidth(width)),
            },
            _ => None,
        }
    }

    /// Regex fragment matching one value of this kind. Contains no capture
    /// groups, so it can be wrapped freely.
    pub fn fragment(&self) -> String {
        match self {
            FormatSpec::Integer => r"[+-]?\d+".to_string(),
            FormatSpec::Float(_) => FLOAT_FRAGMENT.to_string(),
            FormatSpec::Letters => "[A-Za-z]+".to_string(),
            FormatSpec::Word => "[A-Za-z0-9_]+".to_string(),
            FormatSpec::FixedWidth(width) => format!("{}{{{width}}}", not_separator()),
            FormatSpec::Greedy => format!("{}+", not_separator()),
        }
    }

    /// Convert captured text into a typed value. `None` when the text fits the
    /// fragment but not the value domain (e.g. an integer overflow).
    pub fn coerce(&self, raw: &str) -> Option<Value> {
        match self {
            FormatSpec::Integer => raw.parse::<i64>().ok().map(Value::Int),
            FormatSpec::Float(_) => raw.parse::<f64>().ok().map(Value::Float),
            FormatSpec::Letters | FormatSpec::Word | FormatSpec::FixedWidth(_) | FormatSpec::Greedy => {
                Some(Value::Str(raw.to_string()))
            }
        }
    }

    /// Whether the value is the captured text itself. Repeats of such
    /// placeholders must repeat the same text.
    pub fn is_textual(&self) -> bool {
        !matches!(self, FormatSpec::Integer | FormatSpec::Float(_))
    }

    /// Text written for `value` when generating a name. Integers are
    /// zero-padded to the fixed width; everything else uses its display form.
    pub fn render(&self, value: &Value) -> String {
        match (self, value) {
            (FormatSpec::FixedWidth(width), Value::Int(v)) => format!("{v:0width$}"),
            _ => value.to_string(),
        }
    }
}

/// Character class matching anything but the path separator.
pub(crate) fn not_separator() -> String {
    format!("[^{}]", regex::escape(&SEP.to_string()))
}
