//! Priority filtering of result sets.
//!
//! Records are grouped by every key except the priority key (or by an explicit
//! `groupby` subset). Each group keeps the single record whose priority value
//! comes first in the caller's order:
//!
//! ```text
//! order = ["1d", "6h", "1h"]
//!
//! model=a: a_1h a_6h a_1d   ──▶  a_1d
//! model=b: b_1h b_6h        ──▶  b_6h
//! model=c: c_1h             ──▶  c_1h
//! ```
//!
//! Groups are emitted in order of first appearance.

use crate::container::{FileContainer, Record};
use crate::error::{OptionError, PriorityError};
use crate::value::Value;
use std::collections::HashMap;
use std::str::FromStr;

/// What to do with a priority value that is not in the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnMissing {
    /// Fail with [`PriorityError::UnknownPriorityValue`].
    #[default]
    Raise,
    /// Rank the record last and emit a `tracing` warning.
    Warn,
    /// Rank the record last.
    Ignore,
}

impl FromStr for OnMissing {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raise" => Ok(OnMissing::Raise),
            "warn" => Ok(OnMissing::Warn),
            "ignore" => Ok(OnMissing::Ignore),
            _ => Err(OptionError {
                option: "on_missing",
                value: s.to_string(),
                accepted: ["raise", "warn", "ignore"].map(String::from).to_vec(),
            }),
        }
    }
}

/// Keep one record per group of otherwise identical records, choosing the
/// one whose `key` value appears first in `order`.
///
/// # Example
/// ```
/// use filefinder::{FileFinder, Filters, OnMissing, priority_filter};
///
/// let finder = FileFinder::new("{model}", "{model}_{res}")
///     .unwrap()
///     .with_test_paths(["a/a_1h", "a/a_1d", "b/b_1h"]);
/// let files = finder.find_files(&Filters::new()).unwrap();
///
/// let best = priority_filter(&files, "res", ["1d", "1h"], OnMissing::Raise).unwrap();
/// assert_eq!(best.len(), 2);
/// ```
pub fn priority_filter<I>(
    files: &FileContainer,
    key: &str,
    order: I,
    on_missing: OnMissing,
) -> Result<FileContainer, PriorityError>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    priority_filter_by(files, key, order, None, on_missing)
}

/// [`priority_filter`] grouping by `groupby` instead of all other keys.
pub fn priority_filter_by<I>(
    files: &FileContainer,
    key: &str,
    order: I,
    groupby: Option<&[&str]>,
    on_missing: OnMissing,
) -> Result<FileContainer, PriorityError>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    let keys = files.keys();
    let known = |name: &str| keys.iter().any(|k| k == name);
    if !known(key) {
        return Err(PriorityError::UnknownKey { key: key.to_string() });
    }

    let groupby: Vec<&str> = match groupby {
        Some(names) => {
            if let Some(missing) = names.iter().copied().find(|n| !known(*n)) {
                return Err(PriorityError::UnknownKey { key: missing.to_string() });
            }
            if names.contains(&key) {
                return Err(PriorityError::KeyInGroupBy { key: key.to_string() });
            }
            names.to_vec()
        }
        None => keys.iter().map(String::as_str).filter(|k| *k != key).collect(),
    };
    let order: Vec<Value> = order.into_iter().map(Into::into).collect();

    // --- Grouping ---

    let mut index: HashMap<Vec<Option<&Value>>, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Record>> = Vec::new();
    for record in files.iter() {
        let group_key: Vec<Option<&Value>> = groupby.iter().map(|name| record.captures().get(name)).collect();
        let slot = *index.entry(group_key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(record);
    }

    // --- Selection ---

    let mut kept = Vec::with_capacity(groups.len());
    for group in groups {
        let ranks = group
            .iter()
            .map(|record| rank_of(record, key, &order, on_missing))
            .collect::<Result<Vec<usize>, _>>()?;
        let Some(&best) = ranks.iter().min() else { continue };

        // Ties only matter at the winning rank; unknown values fall back to
        // the first one seen.
        let mut winners = group.iter().zip(&ranks).filter(|(_, rank)| **rank == best).map(|(record, _)| *record);
        let Some(winner) = winners.next() else { continue };
        if best != usize::MAX && winners.next().is_some() {
            return Err(PriorityError::DuplicatePriorityValue { key: key.to_string(), value: value_text(winner, key) });
        }
        kept.push(winner.clone());
    }

    Ok(FileContainer::from_unique(keys.to_vec(), kept))
}

/// Position of the record's `key` value in `order`, or `usize::MAX` when it is
/// absent and `on_missing` allows it.
fn rank_of(record: &Record, key: &str, order: &[Value], on_missing: OnMissing) -> Result<usize, PriorityError> {
    let value = record.captures().get(key);
    if let Some(rank) = value.and_then(|v| order.iter().position(|o| o.same_text(v))) {
        return Ok(rank);
    }

    match on_missing {
        OnMissing::Raise => {
            Err(PriorityError::UnknownPriorityValue { key: key.to_string(), value: value_text(record, key) })
        }
        OnMissing::Warn => {
            tracing::warn!(
                path = record.path(),
                key,
                value = %value_text(record, key),
                "value is not in the priority order, ranking it last"
            );
            Ok(usize::MAX)
        }
        OnMissing::Ignore => Ok(usize::MAX),
    }
}

fn value_text(record: &Record, key: &str) -> String {
    record.captures().get(key).map(Value::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captures;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn container(rows: &[(&str, &str, i64, &str)]) -> FileContainer {
        let records = rows
            .iter()
            .map(|(path, model, number, res)| {
                Record::new(*path, captures! { "model" => *model, "number" => *number, "res" => *res })
            })
            .collect();
        FileContainer::new(vec!["model".into(), "number".into(), "res".into()], records).unwrap()
    }

    fn paths(files: &FileContainer) -> Vec<&str> {
        files.paths().collect()
    }

    #[test]
    fn keeps_first_in_order_per_group() {
        let files = container(&[
            ("f1", "a", 1, "d"),
            ("f2", "a", 1, "h"),
            ("f3", "b", 1, "h"),
            ("f4", "b", 1, "d"),
            ("f5", "c", 1, "d"),
        ]);
        let kept = priority_filter(&files, "res", ["h", "d"], OnMissing::Raise).unwrap();
        assert_eq!(paths(&kept), ["f2", "f3", "f5"]);
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let files = container(&[("f1", "a", 1, "d"), ("f2", "a", 2, "d"), ("f3", "a", 1, "h"), ("f4", "b", 1, "h")]);
        let kept = priority_filter(&files, "res", ["h", "d"], OnMissing::Raise).unwrap();
        assert_eq!(paths(&kept), ["f3", "f2", "f4"]);
    }

    #[test]
    fn explicit_groupby() {
        let files = container(&[("f1", "a", 1, "d"), ("f2", "a", 2, "h"), ("f3", "b", 1, "h"), ("f4", "b", 2, "d")]);
        let all = priority_filter(&files, "res", ["h", "d"], OnMissing::Raise).unwrap();
        assert_eq!(all.len(), 4);

        let by_model = priority_filter_by(&files, "res", ["h", "d"], Some(&["model"][..]), OnMissing::Raise).unwrap();
        assert_eq!(paths(&by_model), ["f2", "f3"]);
    }

    #[test]
    fn unknown_values_follow_policy() {
        let files = container(&[("f1", "a", 1, "d"), ("f2", "a", 1, "h"), ("f3", "c", 1, "z")]);

        let err = priority_filter(&files, "res", ["h", "d"], OnMissing::Raise).unwrap_err();
        assert!(matches!(err, PriorityError::UnknownPriorityValue { ref value, .. } if value == "z"), "{err}");

        for policy in [OnMissing::Warn, OnMissing::Ignore] {
            let kept = priority_filter(&files, "res", ["h", "d"], policy).unwrap();
            assert_eq!(paths(&kept), ["f2", "f3"]);
        }
    }

    #[test]
    fn warn_policy_logs_the_record() {
        let files = container(&[("f1", "a", 1, "d"), ("f2", "a", 1, "z")]);

        let (kept, log) = crate::test_log::warnings(|| priority_filter(&files, "res", ["h", "d"], OnMissing::Warn));
        assert_eq!(paths(&kept.unwrap()), ["f1"]);
        assert!(log.contains("WARN"), "{log}");
        assert!(log.contains("f2"), "{log}");
        assert!(log.contains("value is not in the priority order"), "{log}");

        let (_, log) = crate::test_log::warnings(|| priority_filter(&files, "res", ["h", "d"], OnMissing::Ignore));
        assert_eq!(log, "");
    }

    #[test]
    fn duplicate_winners_fail() {
        let files = container(&[("f1", "a", 1, "d"), ("f2", "a", 1, "d")]);
        let err = priority_filter(&files, "res", ["h", "d"], OnMissing::Raise).unwrap_err();
        assert!(matches!(err, PriorityError::DuplicatePriorityValue { .. }), "{err}");
    }

    #[test]
    fn ties_below_the_winner_are_allowed() {
        let files = container(&[("f1", "a", 1, "d"), ("f2", "a", 2, "d"), ("f3", "a", 3, "h")]);
        let kept = priority_filter_by(&files, "res", ["h", "d"], Some(&["model"][..]), OnMissing::Raise).unwrap();
        assert_eq!(paths(&kept), ["f3"]);

        let files = container(&[("f1", "a", 1, "h"), ("f2", "a", 2, "d"), ("f3", "a", 3, "d")]);
        let kept = priority_filter_by(&files, "res", ["h", "d"], Some(&["model"][..]), OnMissing::Raise).unwrap();
        assert_eq!(paths(&kept), ["f1"]);
    }

    #[test]
    fn values_compare_by_text() {
        let files = container(&[("f1", "a", 1, "d"), ("f2", "a", 2, "d")]);
        let kept = priority_filter_by(&files, "number", ["2", "1"], Some(&["model"][..]), OnMissing::Raise).unwrap();
        assert_eq!(paths(&kept), ["f2"]);
    }

    #[rstest]
    #[case("nope", None)]
    #[case("res", Some(&["model", "res"][..]))]
    #[case("res", Some(&["nope"][..]))]
    fn invalid_keys(#[case] key: &str, #[case] groupby: Option<&[&str]>) {
        let files = container(&[("f1", "a", 1, "d")]);
        let err = priority_filter_by(&files, key, ["d"], groupby, OnMissing::Raise).unwrap_err();
        assert!(matches!(err, PriorityError::UnknownKey { .. } | PriorityError::KeyInGroupBy { .. }), "{err}");
    }

    #[test]
    fn options_parse_from_names() {
        assert_eq!("warn".parse::<OnMissing>().unwrap(), OnMissing::Warn);
        let err = "error".parse::<OnMissing>().unwrap_err();
        assert_eq!(err.to_string(), "unknown value for 'on_missing': 'error'. Must be one of 'raise', 'warn', 'ignore'");
    }
}
