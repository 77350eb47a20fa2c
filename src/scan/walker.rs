//! Directory listing.
//!
//! The scanner never touches `std::fs` directly; it asks a [`DirLister`] for
//! the entries of one directory at a time. Two adapters exist:
//!
//! - [`FsLister`]: the real filesystem.
//! - [`StaticTree`]: an in-memory tree built from a list of full paths, for
//!   deterministic tests and demonstrations.
//!
//! Directories are addressed by the same strings the scanner builds with
//! [`join`]; the empty string is the current directory.

use crate::SEP;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

bitflags::bitflags! {
    /// Kind of a directory entry; also used as an "accepted kinds" mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EntryKind: u8 {
        const DIR  = 1 << 0;
        const FILE = 1 << 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// Port for listing one directory.
pub trait DirLister {
    fn list(&self, dir: &str) -> io::Result<Vec<DirEntry>>;
}

/// Lists the real filesystem. Symlinks are classified by their target.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl DirLister for FsLister {
    fn list(&self, dir: &str) -> io::Result<Vec<DirEntry>> {
        let path = if dir.is_empty() { Path::new(".") } else { Path::new(dir) };

        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                tracing::trace!(dir, "skipping entry with a non UTF-8 name");
                continue;
            };

            let file_type = entry.file_type()?;
            let is_dir = if file_type.is_symlink() {
                fs::metadata(entry.path()).map(|m| m.is_dir()).unwrap_or(false)
            } else {
                file_type.is_dir()
            };

            entries.push(DirEntry { name, kind: if is_dir { EntryKind::DIR } else { EntryKind::FILE } });
        }
        Ok(entries)
    }
}

/// In-memory directory tree built from full paths.
///
/// Every path component but the last becomes a directory; the last is a file
/// unless the path ends with the separator.
///
/// ```
/// use filefinder::scan::{DirLister, EntryKind, StaticTree};
///
/// let tree = StaticTree::new(["a/a_1h", "a/a_6h", "b/"]);
/// let top = tree.list("").unwrap();
/// assert!(top.iter().all(|e| e.kind == EntryKind::DIR));
/// assert_eq!(tree.list("a").unwrap().len(), 2);
/// assert!(tree.list("b").unwrap().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticTree {
    dirs: HashMap<String, Vec<DirEntry>>,
}

impl StaticTree {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = StaticTree::default();
        for path in paths {
            tree.insert(path.as_ref());
        }
        tree
    }

    pub fn insert(&mut self, path: &str) {
        let (mut parent, rest) = match path.strip_prefix(SEP) {
            Some(rest) => (SEP.to_string(), rest),
            None => (String::new(), path),
        };
        let ends_with_dir = rest.ends_with(SEP);
        let parts: Vec<&str> = rest.split(SEP).filter(|p| !p.is_empty()).collect();

        for (i, part) in parts.iter().enumerate() {
            let is_leaf = i + 1 == parts.len() && !ends_with_dir;
            let kind = if is_leaf { EntryKind::FILE } else { EntryKind::DIR };

            let entries = self.dirs.entry(parent.clone()).or_default();
            match entries.iter_mut().find(|e| e.name == *part) {
                Some(existing) if kind == EntryKind::DIR => existing.kind = EntryKind::DIR,
                Some(_) => {}
                None => entries.push(DirEntry { name: part.to_string(), kind }),
            }

            parent = join(&parent, part);
            if kind == EntryKind::DIR {
                self.dirs.entry(parent.clone()).or_default();
            }
        }
    }
}

impl DirLister for StaticTree {
    fn list(&self, dir: &str) -> io::Result<Vec<DirEntry>> {
        self.dirs
            .get(dir)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no directory '{dir}' in test paths")))
    }
}

/// Append `name` to the directory `dir` (empty meaning the current one).
pub(crate) fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else if dir.ends_with(SEP) {
        format!("{dir}{name}")
    } else {
        format!("{dir}{SEP}{name}")
    }
}

/// Chunk of a name for natural ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum NaturalChunk {
    Text(String),
    /// Digit run without leading zeros, ordered by length first so that
    /// arbitrarily long runs compare numerically.
    Number(usize, String),
}

/// Sort key placing `a2` before `a10`.
pub fn natural_key(name: &str) -> Vec<NaturalChunk> {
    let mut chunks = Vec::new();
    let mut last = 0;
    for m in crate::regex!(r"\d+").find_iter(name) {
        chunks.push(NaturalChunk::Text(name[last..m.start()].to_string()));
        let digits = m.as_str().trim_start_matches('0');
        chunks.push(NaturalChunk::Number(digits.len(), digits.to_string()));
        last = m.end();
    }
    chunks.push(NaturalChunk::Text(name[last..].to_string()));
    chunks
}
