//! Placeholder patterns.
//!
//! A pattern is literal text interleaved with named placeholders:
//!
//! ```text
//! "/data/{model}/{model}_{year:d}_{member:w}.nc"
//!  ^^^^^^                                          literal
//!        ^^^^^^^                                   placeholder, greedy
//!                         ^^^^^^^^                 placeholder, integer
//! ```
//!
//! `{{` and `}}` stand for literal braces. A placeholder name must be an
//! identifier; it may repeat as long as every occurrence carries the same
//! format spec.
//!
//! ## How the parts work together
//!
//! ```text
//! pattern string ── Pattern::compile ──┬── placeholders (first-occurrence order)
//!                   (compiler.rs)      ├── literal runs (+ separator info)
//!                                      ├── strict regex  (typed captures)
//!                                      └── shape regex   (placeholders relaxed)
//!                                               │
//!                 Pattern::match_str ◀──────────┘   Pattern::create
//!                 (matcher.rs)                      (matcher.rs)
//!                 str ──▶ MatchResult               Captures ──▶ String
//! ```
//!
//! - `format_spec.rs`: interprets the optional `:spec` of a placeholder into a
//!   regex fragment and a value coercion.
//! - `compiler.rs`: tokenizes and validates pattern strings and builds the
//!   regexes once per pattern.
//! - `matcher.rs`: decomposes candidates into captures and generates names.
//!
//! Matching uses the `regex` crate. When two unconstrained placeholders sit
//! next to each other, its leftmost-first semantics decide the split: the
//! earlier placeholder takes the longest run that still lets the rest of the
//! pattern match.

#[path = "pattern/compiler.rs"]
mod compiler;
#[path = "pattern/format_spec.rs"]
mod format_spec;
#[path = "pattern/matcher.rs"]
mod matcher;


pub use compiler::{LiteralRun, Pattern, Placeholder};
pub use format_spec::FormatSpec;
pub use matcher::MatchResult;
