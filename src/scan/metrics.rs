//! Scan metrics.
//!
//! Counters collected while walking one directory tree. They are always
//! gathered (the cost is a handful of integer increments) and returned next to
//! the records by [`Scanner::scan`](super::Scanner::scan), so callers can
//! confirm that pruning took effect or find out why a query came back empty.
//!
//! ## Field semantics
//!
//! - `entries_seen` counts every name returned by a listing.
//! - `entries_pruned` counts entries that matched their level but were
//!   rejected by a filter. Shape misses are not counted as pruned.
//! - `unreadable_dirs` counts listings that failed and were skipped.

use crate::container::Record;
use std::time::Duration;

// --- Metrics -----------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanMetrics {
    /// Wall time of the whole scan.
    pub elapsed: Duration,
    /// Number of directories listed.
    pub dirs_listed: usize,
    pub entries_seen: usize,
    pub entries_pruned: usize,
    /// Entries that had the pattern's shape but failed to parse.
    pub parse_errors: usize,
    pub unreadable_dirs: usize,
}

/// Scanner output bundled with its metrics.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Matching records in natural traversal order.
    pub records: Vec<Record>,
    pub metrics: ScanMetrics,
}
