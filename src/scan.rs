//! Directory tree scanning.
//!
//! The scanner walks the directory hierarchy implied by a path pattern, one
//! separator-delimited level at a time:
//!
//! ```text
//! root "/data"   levels ["{model}", "{model}_{res}"]
//!
//! list /data            match each name against "{model}"
//!  ├─ a/   ✓ model=a    ── descend
//!  │   list /data/a     match each name against "{model}_{res}"
//!  │    ├─ a_1h  ✓      ── record
//!  │    └─ b_1h  ✗      ── model disagrees: parse error policy
//!  ├─ b/   ✗ filtered   ── pruned, never listed
//!  └─ README  ✗ shape   ── skipped silently
//! ```
//!
//! Matching only the current level is what allows pruning: a directory that
//! already violates a literal or a filtered value is never descended into.
//!
//! ## Responsibilities by module
//!
//! - `walker.rs`: the `DirLister` port, the filesystem adapter and the static
//!   in-memory tree used for test mode, plus natural ordering of names.
//! - `filter.rs`: the per-placeholder filter mapping and its coercion.
//! - `metrics.rs`: counters and timing for one scan.
//! - `scanner.rs`: the pruning walk, the unpruned reference walk and the
//!   parse-error policy.

#[path = "scan/filter.rs"]
mod filter;
#[path = "scan/metrics.rs"]
mod metrics;
#[path = "scan/scanner.rs"]
mod scanner;
#[path = "scan/walker.rs"]
mod walker;

#[cfg(test)]
#[path = "scan/tests.rs"]
mod tests;

pub use filter::Filters;
pub use metrics::{ScanMetrics, ScanResult};
pub use scanner::{OnParseError, Options, Scanner};
pub use walker::{DirEntry, DirLister, EntryKind, FsLister, NaturalChunk, StaticTree, natural_key};
