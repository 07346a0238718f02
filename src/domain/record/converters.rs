//! Field converters applied while decoding remote data

use chrono::{DateTime, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

use super::FrozenList;

/// Timestamp layout used by the remote service
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a remote timestamp into a naive (UTC) datetime
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Serde adapter for `Option<NaiveDateTime>` stored as remote timestamps
pub mod timestamp_opt {
    use serde::de::Error as _;

    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&format_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw))),
        }
    }
}

/// Accepts an integer or a string holding an integer
pub fn int_or_numeric_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, got {}", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected a numeric string, got '{}'", s))),
        Some(other) => Err(D::Error::custom(format!(
            "expected an integer, got {}",
            other
        ))),
    }
}

/// Accepts a comma separated string (or an array of strings)
pub fn comma_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<FrozenList<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(FrozenList::empty()),
        Some(Value::String(s)) => Ok(split_comma_list(&s)),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(D::Error::custom(format!("expected a string, got {}", other))),
            })
            .collect(),
        Some(other) => Err(D::Error::custom(format!(
            "expected a comma separated string, got {}",
            other
        ))),
    }
}

/// Serialize a list back into the comma separated remote form
pub fn serialize_comma_list<S: Serializer>(
    value: &FrozenList<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.join(","))
}

pub fn split_comma_list(value: &str) -> FrozenList<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
