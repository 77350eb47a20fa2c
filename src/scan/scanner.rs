//! The tree scanner.
//!
//! A [`Scanner`] is built once per pattern and owns the split of that pattern
//! into a fixed root directory and one sub-pattern per directory level. A scan
//! is a depth-first walk driven by those levels:
//!
//! ```text
//! descend(dir, depth, captures)
//!   pin names bound above into the level pattern
//!   list dir (natural order)
//!   for entry:
//!     kind not accepted by level   → skip
//!     name not in level's shape    → skip
//!     strict match / repeat clash  → parse error policy
//!     filter rejects captures      → prune
//!     last level                   → record
//!     otherwise                    → descend(entry, depth + 1, captures')
//! ```
//!
//! Pinning turns `{model}_{res}` under `a_b/` into `a_b_{res}`, so a value
//! bound at one level is never split differently further down.
//!
//! With `Options::prune` disabled the walk lists every directory down to the
//! pattern depth and matches the whole relative path at once. Both walks
//! produce the same records.

use super::filter::{Filters, ResolvedFilters};
use super::metrics::{ScanMetrics, ScanResult};
use super::walker::{DirEntry, DirLister, EntryKind, join, natural_key};
use crate::container::Record;
use crate::error::{MatchFailure, OptionError, PatternError, QueryError};
use crate::pattern::{MatchResult, Pattern};
use crate::{Captures, SEP};
use std::borrow::Cow;
use std::io;
use std::str::FromStr;
use std::time::Instant;

// --- Options -----------------------------------------------------------------

/// What to do with an entry that has the pattern's shape but does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnParseError {
    /// Skip silently.
    Ignore,
    /// Skip and emit a `tracing` warning naming the entry.
    Warn,
    /// Abort the scan with [`QueryError::ParseError`].
    #[default]
    Raise,
}

impl FromStr for OnParseError {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(OnParseError::Ignore),
            "warn" => Ok(OnParseError::Warn),
            "raise" => Ok(OnParseError::Raise),
            _ => Err(OptionError {
                option: "on_parse_error",
                value: s.to_string(),
                accepted: ["ignore", "warn", "raise"].map(String::from).to_vec(),
            }),
        }
    }
}

/// Options that affect a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub on_parse_error: OnParseError,
    /// Match level by level and skip branches early. Disabling it gives the
    /// reference walk used to check pruning.
    pub prune: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { on_parse_error: OnParseError::default(), prune: true }
    }
}

// --- Scanner -----------------------------------------------------------------

#[derive(Debug, Clone)]
struct Level {
    pattern: Pattern,
    accept: EntryKind,
}

/// Walks the directory tree implied by one pattern.
#[derive(Debug, Clone)]
pub struct Scanner {
    pattern: Pattern,
    root: String,
    levels: Vec<Level>,
    /// The relative part of `pattern` with its levels joined by single
    /// separators; used when pruning is disabled.
    relative: Pattern,
    dir_records: bool,
}

impl Scanner {
    /// Scanner yielding directories. Every level must match a directory and
    /// record paths end with the separator.
    pub fn for_paths(pattern: &Pattern) -> Result<Scanner, PatternError> {
        Scanner::build(pattern, EntryKind::DIR, true)
    }

    /// Scanner yielding entries of any kind at the last level.
    pub fn for_files(pattern: &Pattern) -> Result<Scanner, PatternError> {
        Scanner::build(pattern, EntryKind::all(), false)
    }

    fn build(pattern: &Pattern, last: EntryKind, dir_records: bool) -> Result<Scanner, PatternError> {
        let (root, rest) = pattern.split_root()?;
        let sub_patterns = rest.levels()?;

        let levels = sub_patterns
            .iter()
            .enumerate()
            .map(|(i, p)| Level {
                pattern: p.clone(),
                accept: if i + 1 == sub_patterns.len() { last } else { EntryKind::DIR },
            })
            .collect();
        let relative =
            Pattern::compile(&sub_patterns.iter().map(Pattern::source).collect::<Vec<_>>().join(&SEP.to_string()))?;

        Ok(Scanner { pattern: pattern.clone(), root, levels, relative, dir_records })
    }

    /// The pattern this scanner was built from.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The fixed directory the walk starts from; empty for the current one.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Sources of the per-level sub-patterns.
    pub fn levels(&self) -> impl Iterator<Item = &str> {
        self.levels.iter().map(|l| l.pattern.source())
    }

    /// Walk the tree listed by `lister` and collect every matching entry.
    ///
    /// Filter names must be placeholders of the pattern. Missing directories
    /// contribute nothing; a directory that cannot be read for lack of
    /// permission is skipped with a warning; any other I/O failure aborts.
    pub fn scan(&self, lister: &dyn DirLister, filters: &Filters, options: &Options) -> Result<ScanResult, QueryError> {
        let start = Instant::now();
        let mut walk = Walk {
            lister,
            filters: filters.resolve(&self.pattern)?,
            options,
            records: Vec::new(),
            metrics: ScanMetrics::default(),
        };

        if self.levels.is_empty() {
            self.scan_root(&mut walk)?;
        } else if options.prune {
            self.descend(&mut walk, &self.root, 0, &Captures::new())?;
        } else {
            self.walk_all(&mut walk, &self.root, "", 0)?;
        }

        let mut metrics = walk.metrics;
        metrics.elapsed = start.elapsed();
        tracing::debug!(
            pattern = self.pattern.source(),
            root = %self.root,
            records = walk.records.len(),
            dirs_listed = metrics.dirs_listed,
            pruned = metrics.entries_pruned,
            parse_errors = metrics.parse_errors,
            elapsed = ?metrics.elapsed,
            "scan finished"
        );
        Ok(ScanResult { records: walk.records, metrics })
    }

    /// A pattern without placeholder levels names its root directory only.
    fn scan_root(&self, walk: &mut Walk<'_>) -> Result<(), QueryError> {
        if self.root.is_empty() {
            return Ok(());
        }
        if list(walk, &self.root)?.is_some() {
            walk.records.push(Record::new(with_trailing_separator(&self.root), Captures::new()));
        }
        Ok(())
    }

    fn descend(&self, walk: &mut Walk<'_>, dir: &str, depth: usize, bound: &Captures) -> Result<(), QueryError> {
        let Some(entries) = list(walk, dir)? else {
            return Ok(());
        };
        let level = &self.levels[depth];
        let last = depth + 1 == self.levels.len();
        let pinned = level.pattern.bind(bound)?;

        for entry in entries {
            walk.metrics.entries_seen += 1;
            if !level.accept.intersects(entry.kind) || !level.pattern.matches_shape(&entry.name) {
                continue;
            }

            let path = join(dir, &entry.name);
            let mut captures = bound.clone();
            let matched = match pinned.match_str(&entry.name) {
                MatchResult::Success(found) => captures.absorb(found).map_err(|name| MatchFailure::AmbiguousRepeat { name }),
                MatchResult::Failure(MatchFailure::NoMatch) if matches!(pinned, Cow::Owned(_)) => {
                    Err(clash(&level.pattern, bound, &entry.name))
                }
                MatchResult::Failure(reason) => Err(reason),
            };
            if let Err(reason) = matched {
                self.parse_error(walk, path, reason)?;
                continue;
            }

            if !walk.filters.admits(&captures) {
                walk.metrics.entries_pruned += 1;
                tracing::trace!(path = %path, level = level.pattern.source(), "pruned by filter");
                continue;
            }

            if last {
                walk.records.push(self.record(path, captures));
            } else {
                self.descend(walk, &path, depth + 1, &captures)?;
            }
        }
        Ok(())
    }

    /// Unpruned walk: list every directory down to the pattern depth and
    /// match the full relative path of each entry at that depth.
    fn walk_all(&self, walk: &mut Walk<'_>, dir: &str, relative: &str, depth: usize) -> Result<(), QueryError> {
        let Some(entries) = list(walk, dir)? else {
            return Ok(());
        };
        let level = &self.levels[depth];
        let last = depth + 1 == self.levels.len();

        for DirEntry { name, kind } in entries {
            walk.metrics.entries_seen += 1;
            if !level.accept.intersects(kind) {
                continue;
            }
            let path = join(dir, &name);
            let relative = join(relative, &name);

            if !last {
                self.walk_all(walk, &path, &relative, depth + 1)?;
                continue;
            }
            if !self.relative.matches_shape(&relative) {
                continue;
            }
            match self.relative.match_str(&relative) {
                MatchResult::Success(captures) if walk.filters.admits(&captures) => {
                    walk.records.push(self.record(path, captures));
                }
                MatchResult::Success(_) => walk.metrics.entries_pruned += 1,
                MatchResult::Failure(reason) => self.parse_error(walk, path, reason)?,
            }
        }
        Ok(())
    }

    fn record(&self, path: String, captures: Captures) -> Record {
        let path = if self.dir_records { with_trailing_separator(&path) } else { path };
        Record::new(path, captures)
    }

    fn parse_error(&self, walk: &mut Walk<'_>, path: String, reason: MatchFailure) -> Result<(), QueryError> {
        walk.metrics.parse_errors += 1;
        match walk.options.on_parse_error {
            OnParseError::Ignore => Ok(()),
            OnParseError::Warn => {
                tracing::warn!(path = %path, pattern = self.pattern.source(), %reason, "skipping entry that does not parse");
                Ok(())
            }
            OnParseError::Raise => {
                Err(QueryError::ParseError { path, pattern: self.pattern.source().to_string(), reason })
            }
        }
    }
}

/// Why `name` fits `level` but not with the values bound above pinned in.
fn clash(level: &Pattern, bound: &Captures, name: &str) -> MatchFailure {
    match level.match_str(name) {
        MatchResult::Success(found) => match bound.clone().absorb(found) {
            Err(name) => MatchFailure::AmbiguousRepeat { name },
            Ok(()) => MatchFailure::NoMatch,
        },
        MatchResult::Failure(reason) => reason,
    }
}

/// State of one scan.
struct Walk<'a> {
    lister: &'a dyn DirLister,
    filters: ResolvedFilters,
    options: &'a Options,
    records: Vec<Record>,
    metrics: ScanMetrics,
}

/// List `dir` in natural order. `None` when the directory is missing or not
/// readable.
fn list(walk: &mut Walk<'_>, dir: &str) -> Result<Option<Vec<DirEntry>>, QueryError> {
    match walk.lister.list(dir) {
        Ok(mut entries) => {
            walk.metrics.dirs_listed += 1;
            entries.sort_by_cached_key(|e| (natural_key(&e.name), e.name.clone()));
            Ok(Some(entries))
        }
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            walk.metrics.unreadable_dirs += 1;
            tracing::trace!(dir, error = %e, "directory not listed");
            Ok(None)
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            walk.metrics.unreadable_dirs += 1;
            tracing::warn!(dir, error = %e, "skipping unreadable directory");
            Ok(None)
        }
        Err(source) => Err(QueryError::Io { path: dir.to_string(), source }),
    }
}

fn with_trailing_separator(path: &str) -> String {
    if path.ends_with(SEP) { path.to_string() } else { format!("{path}{SEP}") }
}
