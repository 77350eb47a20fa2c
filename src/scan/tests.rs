use super::*;
use crate::error::QueryError;
use crate::pattern::Pattern;
use crate::{SEP, captures};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::io;

fn p(path: &str) -> String {
    path.replace('/', &SEP.to_string())
}

fn files(pattern: &str) -> Scanner {
    Scanner::for_files(&Pattern::compile(&p(pattern)).unwrap()).unwrap()
}

fn tree(paths: &[&str]) -> StaticTree {
    StaticTree::new(paths.iter().map(|t| p(t)))
}

fn scan_paths(scanner: &Scanner, lister: &dyn DirLister) -> Vec<String> {
    let result = scanner.scan(lister, &Filters::new(), &Options::default()).unwrap();
    result.records.into_iter().map(|r| r.into_parts().0).collect()
}

/// Fails every listing with the given error kind.
struct Failing(io::ErrorKind);

impl DirLister for Failing {
    fn list(&self, dir: &str) -> io::Result<Vec<DirEntry>> {
        Err(io::Error::new(self.0, format!("cannot list '{dir}'")))
    }
}

#[test]
fn scanner_splits_root_and_levels() {
    let scanner = files("/data/run_{id:d}/{model}_{res}.nc");
    assert_eq!(scanner.root(), p("/data"));
    assert_eq!(scanner.levels().collect::<Vec<_>>(), ["run_{id:d}", "{model}_{res}.nc"]);

    let scanner = Scanner::for_paths(&Pattern::compile(&p("{a}/{b}/")).unwrap()).unwrap();
    assert_eq!(scanner.root(), "");
    assert_eq!(scanner.levels().collect::<Vec<_>>(), ["{a}", "{b}"]);
}

#[test]
fn listings_are_naturally_ordered() {
    let scanner = files("run_{id:d}");
    let found = scan_paths(&scanner, &tree(&["run_10", "run_9", "run_100", "run_1"]));
    assert_eq!(found, ["run_1", "run_9", "run_10", "run_100"]);
}

#[test]
fn captures_accumulate_across_levels() {
    let scanner = files("{year:d}/{model}/{model}_{year:d}.nc");
    let result = scanner
        .scan(&tree(&["2000/a/a_2000.nc", "2000/b/b_2000.nc"]), &Filters::new().with("model", "b"), &Options::default())
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].path(), p("2000/b/b_2000.nc"));
    assert_eq!(result.records[0].captures(), &captures! { "year" => 2000, "model" => "b" });
    assert_eq!(result.metrics.entries_pruned, 1);
}

#[test]
fn intermediate_levels_only_match_directories() {
    let scanner = files("{a}/{b}");
    let found = scan_paths(&scanner, &tree(&["x/y", "file", "dir/"]));
    assert_eq!(found, [p("x/y")]);
}

#[test]
fn directory_records_end_with_separator() {
    let scanner = Scanner::for_paths(&Pattern::compile(&p("{a}/")).unwrap()).unwrap();
    let found = scan_paths(&scanner, &tree(&["x/y", "z/", "file"]));
    assert_eq!(found, [p("x/"), p("z/")]);
}

#[test]
fn empty_pattern_finds_nothing() {
    let scanner = files("");
    assert!(scan_paths(&scanner, &tree(&["a"])).is_empty());
}

#[rstest]
#[case(io::ErrorKind::NotFound)]
#[case(io::ErrorKind::PermissionDenied)]
fn unlistable_directories_are_skipped(#[case] kind: io::ErrorKind) {
    let scanner = files("/data/{a}");
    let result = scanner.scan(&Failing(kind), &Filters::new(), &Options::default()).unwrap();
    assert!(result.records.is_empty());
    assert_eq!(result.metrics.unreadable_dirs, 1);
}

#[test]
fn other_io_errors_abort_the_scan() {
    let scanner = files("/data/{a}");
    let err = scanner.scan(&Failing(io::ErrorKind::Other), &Filters::new(), &Options::default()).unwrap_err();
    assert!(matches!(err, QueryError::Io { ref path, .. } if *path == p("/data")), "{err}");
}

#[test]
fn filters_are_checked_against_the_pattern() {
    let scanner = files("{a}");
    let err = scanner.scan(&tree(&["x"]), &Filters::new().with("b", 1), &Options::default()).unwrap_err();
    assert!(matches!(err, QueryError::UnknownPlaceholder { .. }), "{err}");
}

#[test]
fn unpruned_walk_matches_whole_relative_path() {
    let scanner = files("{a}/lit/{b:d}");
    let lister = tree(&["x/lit/1", "x/other/2", "y/lit/3", "y/lit/z"]);
    let options = Options { prune: false, on_parse_error: OnParseError::Ignore };

    let full = scanner.scan(&lister, &Filters::new(), &options).unwrap();
    let pruned = scanner.scan(&lister, &Filters::new(), &Options { prune: true, ..options }).unwrap();

    let full_paths: Vec<&str> = full.records.iter().map(|r| r.path()).collect();
    assert_eq!(full_paths, [p("x/lit/1"), p("y/lit/3")]);
    assert_eq!(full.records, pruned.records);
    assert_eq!((full.metrics.parse_errors, pruned.metrics.parse_errors), (1, 1));
}

#[test]
fn warn_policy_logs_the_skipped_path() {
    let scanner = files("{model}/run_{id:d}");
    let lister = tree(&["a/run_1", "a/run_x"]);
    let options = Options { on_parse_error: OnParseError::Warn, ..Options::default() };

    let (result, log) = crate::test_log::warnings(|| scanner.scan(&lister, &Filters::new(), &options));
    assert_eq!(result.unwrap().records.len(), 1);
    assert!(log.contains("WARN"), "{log}");
    assert!(log.contains(&p("a/run_x")), "{log}");
    assert!(log.contains("skipping entry that does not parse"), "{log}");

    let options = Options { on_parse_error: OnParseError::Ignore, ..options };
    let (result, log) = crate::test_log::warnings(|| scanner.scan(&lister, &Filters::new(), &options));
    assert_eq!(result.unwrap().metrics.parse_errors, 1);
    assert_eq!(log, "");
}

#[test]
fn bound_names_are_pinned_below() {
    let scanner = files("{model}/{model}_{res}");
    let options = Options { on_parse_error: OnParseError::Ignore, ..Options::default() };
    let result = scanner.scan(&tree(&["a/a_1h_v2", "a/b_1h"]), &Filters::new(), &options).unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].captures(), &captures! { "model" => "a", "res" => "1h_v2" });
    assert_eq!(result.metrics.parse_errors, 1);
}

#[rstest]
#[case("ignore", OnParseError::Ignore)]
#[case("warn", OnParseError::Warn)]
#[case("raise", OnParseError::Raise)]
fn parse_error_policy_from_name(#[case] name: &str, #[case] expected: OnParseError) {
    assert_eq!(name.parse::<OnParseError>().unwrap(), expected);
}

#[test]
fn unknown_policy_name_lists_choices() {
    let err = "loud".parse::<OnParseError>().unwrap_err();
    assert_eq!(err.to_string(), "unknown value for 'on_parse_error': 'loud'. Must be one of 'ignore', 'warn', 'raise'");
}

#[test]
fn default_options() {
    assert_eq!(Options::default(), Options { on_parse_error: OnParseError::Raise, prune: true });
}
