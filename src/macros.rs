/// Lazily compiled static regex. The literal is checked the first time the
/// expression is evaluated.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a [`Captures`](crate::Captures) mapping from `name => value` pairs.
///
/// ```
/// use filefinder::{Value, captures};
///
/// let values = captures! { "category" => "foo", "number" => 1 };
/// assert_eq!(values.get("number"), Some(&Value::Int(1)));
/// ```
#[macro_export]
macro_rules! captures {
    () => {
        $crate::Captures::new()
    };
    ( $($name:expr => $value:expr),+ $(,)? ) => {{
        let mut captures = $crate::Captures::new();
        $( captures.insert($name, $crate::Value::from($value)); )+
        captures
    }};
}
