//! Find files and directories whose names follow a placeholder pattern.
//!
//! ```text
//! path pattern:  "/data/{model}/"
//! file pattern:  "{model}_{time_res}.nc"
//!
//! /data/a/a_1h.nc  ──▶  { model: "a", time_res: "1h" }
//! /data/a/a_6h.nc  ──▶  { model: "a", time_res: "6h" }
//! ```
//!
//! The same patterns generate names from values, which makes the crate a
//! two-way mapping between file names and their metadata.
//!
//! ## Example
//! ```
//! use filefinder::{FileFinder, Filters, captures};
//!
//! let finder = FileFinder::new("/root/{category}", "{category}_file_{number:d}")
//!     .unwrap()
//!     .with_test_paths(["/root/foo/foo_file_1", "/root/foo/foo_file_2", "/root/bar/bar_file_1"]);
//!
//! let found = finder.find_files(&Filters::new().with("number", 1)).unwrap();
//! assert_eq!(found.paths().collect::<Vec<_>>(), ["/root/bar/bar_file_1", "/root/foo/foo_file_1"]);
//!
//! let name = finder.create_full_name(&captures! { "category" => "foo", "number" => 3 }).unwrap();
//! assert_eq!(name, "/root/foo/foo_file_3");
//! ```
//!
//! ## Layout
//!
//! - [`pattern`]: format specs, pattern compilation, matching and generation.
//! - [`scan`]: directory listing, filters and the pruning tree scanner.
//! - [`FileContainer`]: result set of `(path, captures)` records.
//! - [`priority_filter`]: keep one record per group according to a priority order.
//! - [`FileFinder`]: the construction/query/generation entry point.

extern crate self as filefinder;

#[macro_use]
mod macros;
mod api;
mod container;
mod error;
pub mod pattern;
mod priority;
pub mod scan;
mod value;

#[cfg(test)]
mod test_log;

pub use api::FileFinder;
pub use container::{FileContainer, Record};
pub use error::{Error, MatchFailure, OptionError, PatternError, PriorityError, QueryError};
pub use pattern::{FormatSpec, MatchResult, Pattern};
pub use priority::{OnMissing, priority_filter, priority_filter_by};
pub use scan::{Filters, OnParseError, Options};
pub use value::{Captures, Value};

/// The path separator patterns are split on.
pub const SEP: char = std::path::MAIN_SEPARATOR;
