//! Field matchers

use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value;

use crate::domain::error::PulpError;

/// A condition applied to a single field value
///
/// When the field holds an array, the matcher succeeds if any element
/// matches, mirroring how the remote service queries list fields.
#[derive(Debug, Clone)]
pub enum Matcher {
    Equals(Value),
    In(Vec<Value>),
    Exists,
    Regex(Regex),
    LessThan(Value),
}

impl Matcher {
    pub fn equals(value: impl Into<Value>) -> Self {
        Self::Equals(value.into())
    }

    pub fn is_in<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::In(values.into_iter().map(Into::into).collect())
    }

    pub fn exists() -> Self {
        Self::Exists
    }

    pub fn regex(pattern: &str) -> Result<Self, PulpError> {
        Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| PulpError::invalid_data(format!("invalid regex '{}': {}", pattern, e)))
    }

    pub fn less_than(value: impl Into<Value>) -> Self {
        Self::LessThan(value.into())
    }

    /// Evaluate against a field value; `None` means the field is absent
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let value = match value {
            None | Some(Value::Null) => return false,
            Some(v) => v,
        };

        if let Self::Exists = self {
            return true;
        }

        if self.matches_scalar(value) {
            return true;
        }

        match value {
            Value::Array(items) => items.iter().any(|item| self.matches_scalar(item)),
            _ => false,
        }
    }

    fn matches_scalar(&self, value: &Value) -> bool {
        match self {
            Self::Equals(expected) => value == expected,
            Self::In(candidates) => candidates.iter().any(|c| c == value),
            Self::Exists => true,
            Self::Regex(re) => value.as_str().is_some_and(|s| re.is_match(s)),
            Self::LessThan(bound) => compare(value, bound) == Some(Ordering::Less),
        }
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

impl From<Value> for Matcher {
    fn from(value: Value) -> Self {
        Self::Equals(value)
    }
}

impl From<&str> for Matcher {
    fn from(value: &str) -> Self {
        Self::equals(value)
    }
}

impl From<String> for Matcher {
    fn from(value: String) -> Self {
        Self::equals(value)
    }
}

impl From<i64> for Matcher {
    fn from(value: i64) -> Self {
        Self::equals(value)
    }
}

impl From<bool> for Matcher {
    fn from(value: bool) -> Self {
        Self::equals(value)
    }
}
