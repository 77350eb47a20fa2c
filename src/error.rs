use crate::SEP;

/// Malformed pattern. Raised when a pattern is compiled and never recovered.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid placeholder in pattern '{pattern}': {reason}")]
    InvalidPlaceholder { pattern: String, reason: String },
    #[error("invalid format spec '{spec}' for placeholder '{name}' in pattern '{pattern}'")]
    InvalidFormatSpec { pattern: String, name: String, spec: String },
    #[error("file pattern '{pattern}' cannot contain the path separator ('{}')", SEP)]
    SeparatorInFilePattern { pattern: String },
    #[error("could not build matcher: {0}")]
    Regex(#[from] regex::Error),
    #[error("could not build backtracking matcher: {0}")]
    Backtracking(#[from] fancy_regex::Error),
}

/// Why a candidate string did not match a pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchFailure {
    #[error("does not conform to the pattern")]
    NoMatch,
    #[error("placeholder '{name}' captured disagreeing values")]
    AmbiguousRepeat { name: String },
}

/// Failure of a single query or generation call.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("unknown placeholder '{name}' for pattern '{pattern}'")]
    UnknownPlaceholder { name: String, pattern: String },
    #[error("missing value(s) for {} to create a name from pattern '{pattern}'", quote_all(.missing))]
    MissingKey { missing: Vec<String>, pattern: String },
    #[error("could not parse '{path}' with the pattern '{pattern}': {reason}")]
    ParseError { path: String, pattern: String, reason: MatchFailure },
    #[error("found no entries matching pattern '{pattern}'")]
    NotFound { pattern: String },
    #[error("expected exactly one entry matching pattern '{pattern}', found {count}")]
    AmbiguousResult { count: usize, pattern: String },
    #[error("query leads to non-unique metadata: '{first}' and '{second}' have the same placeholder values")]
    NonUniqueMetadata { first: String, second: String },
    #[error("unknown key '{name}', available keys are {}", quote_all(.available))]
    UnknownKey { name: String, available: Vec<String> },
    #[error("duplicate path '{path}'")]
    DuplicatePath { path: String },
    #[error("could not pin values into a pattern level: {0}")]
    Pattern(#[from] PatternError),
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of [`priority_filter`](crate::priority_filter).
#[derive(Debug, thiserror::Error)]
pub enum PriorityError {
    #[error("key '{key}' is not available")]
    UnknownKey { key: String },
    #[error("groupby may not contain the priority key '{key}'")]
    KeyInGroupBy { key: String },
    #[error("value '{value}' of '{key}' is not in the priority order")]
    UnknownPriorityValue { key: String, value: String },
    #[error("found more than one record with '{key}' == '{value}' in the same group")]
    DuplicatePriorityValue { key: String, value: String },
}

/// Umbrella error for callers that mix construction, queries and filtering.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),
    #[error("query error: {0}")]
    Query(#[from] QueryError),
    #[error("priority filter error: {0}")]
    Priority(#[from] PriorityError),
    #[error("option error: {0}")]
    InvalidOption(#[from] OptionError),
}

/// An option given by name was not one of the accepted spellings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value for '{option}': '{value}'. Must be one of {}", quote_all(.accepted))]
pub struct OptionError {
    pub option: &'static str,
    pub value: String,
    pub accepted: Vec<String>,
}

fn quote_all(names: &[String]) -> String {
    names.iter().map(|n| format!("'{n}'")).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        PatternError::InvalidPlaceholder { pattern: "{}".into(), reason: "empty name".into() },
        "invalid placeholder in pattern '{}': empty name"
    )]
    #[case(
        PatternError::InvalidFormatSpec { pattern: "{a:q}".into(), name: "a".into(), spec: "q".into() },
        "invalid format spec 'q' for placeholder 'a' in pattern '{a:q}'"
    )]
    fn pattern_error_display(#[case] error: PatternError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case(
        QueryError::MissingKey { missing: vec!["a".into(), "b".into()], pattern: "{a}_{b}".into() },
        "missing value(s) for 'a', 'b' to create a name from pattern '{a}_{b}'"
    )]
    #[case(
        QueryError::UnknownPlaceholder { name: "x".into(), pattern: "{a}".into() },
        "unknown placeholder 'x' for pattern '{a}'"
    )]
    #[case(
        QueryError::AmbiguousResult { count: 2, pattern: "{a}".into() },
        "expected exactly one entry matching pattern '{a}', found 2"
    )]
    #[case(
        QueryError::ParseError {
            path: "a/b_1h".into(),
            pattern: "{model}/{model}_{res}".into(),
            reason: MatchFailure::AmbiguousRepeat { name: "model".into() },
        },
        "could not parse 'a/b_1h' with the pattern '{model}/{model}_{res}': placeholder 'model' captured disagreeing values"
    )]
    fn query_error_display(#[case] error: QueryError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn umbrella_error_keeps_source() {
        let error: Error = PriorityError::UnknownKey { key: "res".into() }.into();
        assert_eq!(error.to_string(), "priority filter error: key 'res' is not available");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn io_error_has_source() {
        let error = QueryError::Io {
            path: "/nope".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(std::error::Error::source(&error).is_some());
    }
}
