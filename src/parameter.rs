//! Query/form parameters.
//!
//! A [`Parameter`] is a single `name=value` pair. Parameters whose name ends
//! in the array marker `[]` are *array-form*: their value is a comma joined
//! list which is expanded into one `name=element` pair per element when the
//! parameter is written into a query string.
//!
//! ```rust
//! use minimal_http::Parameter;
//!
//! let p: Parameter = "ids:1:2:3".parse().unwrap();
//! assert_eq!(p.name(), "ids[]");
//! assert_eq!(p.to_query_string(), "ids[]=1&ids[]=2&ids[]=3");
//! ```

use crate::errors::{HttpError, Result};
use std::fmt;
use std::str::FromStr;

const ARRAY_MARKER: &str = "[]";
const VALUE_SEPARATOR: char = ',';

/// Delimiters tried, in order, when parsing raw parameter text.
const SUPPORTED_DELIMITERS: [char; 5] = ['=', ':', '|', ',', ' '];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    name: String,
    value: String,
}

impl Parameter {
    /// Creates a parameter from an explicit name and a single value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(HttpError::MissingArgument("name"));
        }

        Ok(Self {
            name,
            value: value.into(),
        })
    }

    /// Creates an array-form parameter. The array marker is appended to the
    /// name unless it is already there.
    pub fn array<I, S>(name: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut name = name.into();
        if name.is_empty() {
            return Err(HttpError::MissingArgument("name"));
        }

        let values: Vec<S> = values.into_iter().collect();
        if values.is_empty() {
            return Err(HttpError::MissingArgument("values"));
        }

        if !name.ends_with(ARRAY_MARKER) {
            name.push_str(ARRAY_MARKER);
        }

        Ok(Self {
            name,
            value: join_values(values.iter().map(|v| v.as_ref())),
        })
    }

    /// Parses raw `name<delim>value` text.
    ///
    /// The first delimiter out of `=`, `:`, `|`, `,` and space that occurs in
    /// the text is used to split it. When the split yields more than two
    /// pieces the result is an array-form parameter holding every piece after
    /// the first.
    pub fn parse(data: &str) -> Result<Self> {
        if data.is_empty() {
            return Err(HttpError::MissingArgument("data"));
        }

        let delimiter = SUPPORTED_DELIMITERS
            .iter()
            .copied()
            .find(|d| data.contains(*d))
            .ok_or_else(|| {
                HttpError::InvalidFormat(format!("'{data}' does not contain any supported delimiter"))
            })?;

        let mut pieces = data.split(delimiter);
        let name = pieces.next().unwrap_or_default();
        if name.is_empty() {
            return Err(HttpError::InvalidFormat(format!("'{data}' has an empty parameter name")));
        }

        let rest: Vec<&str> = pieces.collect();
        match rest.as_slice() {
            [] => Self::new(name, ""),
            [value] => Self::new(name, *value),
            values => Ok(Self {
                name: format!("{name}{ARRAY_MARKER}"),
                value: join_values(values.iter().copied()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn has_value(&self) -> bool {
        !self.value.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.name.ends_with(ARRAY_MARKER)
    }

    /// Individual elements of the value. Plain parameters yield their value once.
    pub fn values(&self) -> Vec<&str> {
        if self.is_array() {
            self.value.split(VALUE_SEPARATOR).collect()
        } else {
            vec![self.value.as_str()]
        }
    }

    /// Query string form: array-form parameters repeat `name=element`.
    pub fn to_query_string(&self) -> String {
        self.values()
            .into_iter()
            .map(|v| format!("{}={}", self.name, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl FromStr for Parameter {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self> {
        Parameter::parse(s)
    }
}

impl TryFrom<&str> for Parameter {
    type Error = HttpError;

    fn try_from(s: &str) -> Result<Self> {
        Parameter::parse(s)
    }
}

fn join_values<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_pair_round_trips() {
        let p = Parameter::parse("a=1").unwrap();
        assert_eq!(p.name(), "a");
        assert_eq!(p.value(), "1");
        assert!(!p.is_array());
        assert_eq!(p.to_string(), "a=1");
        assert_eq!(p.to_query_string(), "a=1");
    }

    #[test]
    fn first_supported_delimiter_wins() {
        // '=' is preferred over ':' even though ':' comes first in the text
        let p = Parameter::parse("time:12=30").unwrap();
        assert_eq!(p.name(), "time:12");
        assert_eq!(p.value(), "30");

        let p = Parameter::parse("user|bob").unwrap();
        assert_eq!((p.name(), p.value()), ("user", "bob"));

        let p = Parameter::parse("q hello").unwrap();
        assert_eq!((p.name(), p.value()), ("q", "hello"));
    }

    #[test]
    fn many_pieces_become_an_array() {
        let p = Parameter::parse("a:1:2:3").unwrap();
        assert!(p.is_array());
        assert_eq!(p.name(), "a[]");
        assert_eq!(p.value(), "1,2,3");
        assert_eq!(p.values(), vec!["1", "2", "3"]);
        assert_eq!(p.to_query_string(), "a[]=1&a[]=2&a[]=3");
    }

    #[test]
    fn trailing_delimiter_gives_empty_value() {
        let p = Parameter::parse("flag=").unwrap();
        assert_eq!(p.name(), "flag");
        assert!(!p.has_value());
        assert_eq!(p.to_string(), "flag=");
    }

    #[test]
    fn text_without_delimiter_is_rejected() {
        assert!(matches!(Parameter::parse("nodelimiter"), Err(HttpError::InvalidFormat(_))));
        assert!(matches!(Parameter::parse(""), Err(HttpError::MissingArgument("data"))));
        assert!(matches!(Parameter::parse("=value"), Err(HttpError::InvalidFormat(_))));
    }

    #[test]
    fn variadic_constructor_builds_array_form() {
        let p = Parameter::array("key", ["v1", "v2"]).unwrap();
        assert_eq!(p.name(), "key[]");
        assert_eq!(p.value(), "v1,v2");

        // marker is not doubled
        let p = Parameter::array("key[]", vec!["x".to_string()]).unwrap();
        assert_eq!(p.name(), "key[]");
    }

    #[test]
    fn missing_arguments_are_rejected() {
        assert!(matches!(Parameter::new("", "v"), Err(HttpError::MissingArgument("name"))));
        let none: [&str; 0] = [];
        assert!(matches!(Parameter::array("k", none), Err(HttpError::MissingArgument("values"))));
    }
}
