use crate::container::{FileContainer, Record};
use crate::error::{PatternError, QueryError};
use crate::pattern::Pattern;
use crate::scan::{Filters, FsLister, Options, ScanResult, Scanner, StaticTree};
use crate::{Captures, SEP};
use std::collections::HashMap;
use std::fmt;


/// Where directory listings come from.
#[derive(Debug, Clone)]
enum Source {
    FileSystem,
    Static(StaticTree),
}

/// Find and create file names following a path pattern and a file pattern.
///
/// The path pattern describes the directories (it always ends with the path
/// separator), the file pattern the entries inside them. Their concatenation
/// is the full pattern.
///
/// # Example
/// ```
/// use filefinder::{FileFinder, Filters};
///
/// let finder = FileFinder::new("/data/{model}", "{model}_{time_res}.nc")
///     .unwrap()
///     .with_test_paths(["/data/a/a_1h.nc", "/data/a/a_6h.nc", "/data/b/b_1h.nc"]);
///
/// let paths = finder.find_paths(&Filters::new()).unwrap();
/// assert_eq!(paths.paths().collect::<Vec<_>>(), ["/data/a/", "/data/b/"]);
///
/// let single = finder.find_single_file(&Filters::new().with("model", "b")).unwrap();
/// assert_eq!(single.path(), "/data/b/b_1h.nc");
/// ```
#[derive(Debug, Clone)]
pub struct FileFinder {
    path: Pattern,
    file: Pattern,
    full: Pattern,
    path_scanner: Scanner,
    file_scanner: Scanner,
    source: Source,
}

impl FileFinder {
    /// Compile both patterns. Either may be empty; the file pattern may not
    /// contain the path separator.
    pub fn new(path_pattern: &str, file_pattern: &str) -> Result<FileFinder, PatternError> {
        if file_pattern.contains(SEP) {
            return Err(PatternError::SeparatorInFilePattern { pattern: file_pattern.to_string() });
        }

        let path_source = if path_pattern.is_empty() || path_pattern.ends_with(SEP) {
            path_pattern.to_string()
        } else {
            format!("{path_pattern}{SEP}")
        };

        let path = Pattern::compile(&path_source)?;
        let file = Pattern::compile(file_pattern)?;
        let full = path.join(&file)?;

        Ok(FileFinder {
            path_scanner: Scanner::for_paths(&path)?,
            file_scanner: Scanner::for_files(&full)?,
            path,
            file,
            full,
            source: Source::FileSystem,
        })
    }

    /// Serve listings from `paths` instead of the filesystem.
    pub fn with_test_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.source = Source::Static(StaticTree::new(paths));
        self
    }

    pub fn path_pattern(&self) -> &Pattern {
        &self.path
    }

    pub fn file_pattern(&self) -> &Pattern {
        &self.file
    }

    pub fn full_pattern(&self) -> &Pattern {
        &self.full
    }

    /// Placeholder names of the full pattern, in first-occurrence order.
    pub fn keys(&self) -> Vec<&str> {
        self.full.names().collect()
    }

    pub fn keys_path(&self) -> Vec<&str> {
        self.path.names().collect()
    }

    pub fn keys_file(&self) -> Vec<&str> {
        self.file.names().collect()
    }

    // --- Generation ---

    /// Directory name for `values`, ending with the separator.
    pub fn create_path_name(&self, values: &Captures) -> Result<String, QueryError> {
        self.path.create(values)
    }

    pub fn create_file_name(&self, values: &Captures) -> Result<String, QueryError> {
        self.file.create(values)
    }

    pub fn create_full_name(&self, values: &Captures) -> Result<String, QueryError> {
        self.full.create(values)
    }

    // --- Queries ---

    /// Directories matching the path pattern.
    pub fn find_paths(&self, filters: &Filters) -> Result<FileContainer, QueryError> {
        self.find_paths_with(filters, &Options::default())
    }

    pub fn find_paths_with(&self, filters: &Filters, options: &Options) -> Result<FileContainer, QueryError> {
        self.collect(&self.path_scanner, filters, options)
    }

    /// Entries matching the full pattern.
    pub fn find_files(&self, filters: &Filters) -> Result<FileContainer, QueryError> {
        self.find_files_with(filters, &Options::default())
    }

    pub fn find_files_with(&self, filters: &Filters, options: &Options) -> Result<FileContainer, QueryError> {
        self.collect(&self.file_scanner, filters, options)
    }

    /// The one directory matching the path pattern.
    pub fn find_single_path(&self, filters: &Filters) -> Result<Record, QueryError> {
        self.find_single_path_with(filters, &Options::default())
    }

    pub fn find_single_path_with(&self, filters: &Filters, options: &Options) -> Result<Record, QueryError> {
        single(self.find_paths_with(filters, options)?, &self.path)
    }

    /// The one entry matching the full pattern.
    pub fn find_single_file(&self, filters: &Filters) -> Result<Record, QueryError> {
        self.find_single_file_with(filters, &Options::default())
    }

    pub fn find_single_file_with(&self, filters: &Filters, options: &Options) -> Result<Record, QueryError> {
        single(self.find_files_with(filters, options)?, &self.full)
    }

    /// Raw directory scan with metrics.
    pub fn scan_paths(&self, filters: &Filters, options: &Options) -> Result<ScanResult, QueryError> {
        self.scan(&self.path_scanner, filters, options)
    }

    /// Raw entry scan with metrics.
    pub fn scan_files(&self, filters: &Filters, options: &Options) -> Result<ScanResult, QueryError> {
        self.scan(&self.file_scanner, filters, options)
    }

    fn scan(&self, scanner: &Scanner, filters: &Filters, options: &Options) -> Result<ScanResult, QueryError> {
        match &self.source {
            Source::FileSystem => scanner.scan(&FsLister, filters, options),
            Source::Static(tree) => scanner.scan(tree, filters, options),
        }
    }

    fn collect(&self, scanner: &Scanner, filters: &Filters, options: &Options) -> Result<FileContainer, QueryError> {
        let ScanResult { records, .. } = self.scan(scanner, filters, options)?;
        ensure_unique_metadata(&records)?;

        let keys = scanner.pattern().names().map(str::to_string).collect();
        Ok(FileContainer::from_unique(keys, records))
    }
}

fn single(found: FileContainer, pattern: &Pattern) -> Result<Record, QueryError> {
    let count = found.len();
    let mut records = found.into_records();
    match (records.pop(), count) {
        (Some(record), 1) => Ok(record),
        (None, _) => Err(QueryError::NotFound { pattern: pattern.source().to_string() }),
        _ => Err(QueryError::AmbiguousResult { count, pattern: pattern.source().to_string() }),
    }
}

/// Two different paths may not parse to the same values.
fn ensure_unique_metadata(records: &[Record]) -> Result<(), QueryError> {
    let mut seen: HashMap<&Captures, &str> = HashMap::with_capacity(records.len());
    for record in records {
        if let Some(first) = seen.insert(record.captures(), record.path()) {
            return Err(QueryError::NonUniqueMetadata { first: first.to_string(), second: record.path().to_string() });
        }
    }
    Ok(())
}

impl fmt::Display for FileFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.keys();
        keys.sort_unstable();
        let keys = keys.iter().map(|k| format!("'{k}'")).collect::<Vec<_>>().join(", ");

        writeln!(f, "<FileFinder>")?;
        writeln!(f, "path_pattern: '{}'", self.path.source())?;
        writeln!(f, "file_pattern: '{}'", self.file.source())?;
        writeln!(f)?;
        writeln!(f, "keys: {keys}")
    }
}
