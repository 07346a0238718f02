//! Record layer - immutable typed records decoded from remote data
//!
//! Every record declares its remote field names through serde attributes and
//! is decoded with [`PulpRecord::from_data`]. Decoding failures (missing or
//! mistyped fields, failed validators) surface as [`PulpError::InvalidData`].

pub mod converters;
mod frozen;
pub mod validators;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::domain::error::PulpError;

pub use frozen::{frozen_list_or_none, FrozenList};

/// A record exchanged with the remote service
pub trait PulpRecord: Sized {
    /// Decode and validate a record from remote data
    fn from_data(data: &Value) -> Result<Self, PulpError>;

    /// Encode this record using remote field names
    fn to_data(&self) -> Value;
}

/// Deserialize `data` into `T`, mapping failures to `InvalidData`
pub(crate) fn decode<T: DeserializeOwned>(kind: &str, data: &Value) -> Result<T, PulpError> {
    if !data.is_object() {
        return Err(PulpError::invalid_data(format!(
            "{} data must be an object, got {}",
            kind, data
        )));
    }

    T::deserialize(data)
        .map_err(|e| PulpError::invalid_data(format!("{}: {}", kind, e)))
}

/// Serialize a raw remote representation
pub(crate) fn encode<T: Serialize>(raw: &T) -> Value {
    serde_json::to_value(raw).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        id: String,
    }

    #[test]
    fn test_decode_valid() {
        let sample: Sample = decode("Sample", &json!({"id": "x"})).unwrap();
        assert_eq!(sample.id, "x");
    }

    #[test]
    fn test_decode_missing_field() {
        let err = decode::<Sample>("Sample", &json!({"other": 1})).unwrap_err();
        assert!(err.is_invalid_data());
        assert!(err.to_string().contains("Sample"));
    }

    #[test]
    fn test_decode_non_object() {
        let err = decode::<Sample>("Sample", &json!(["x"])).unwrap_err();
        assert!(err.is_invalid_data());
    }
}
