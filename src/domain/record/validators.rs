//! Field validators

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::error::PulpError;

static HEX_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-f]+$").unwrap());

/// Supported checksum algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    Md5,
    Sha1,
    Sha256,
}

impl ChecksumKind {
    /// Expected length of the hex digest
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Sha256 => 64,
        }
    }
}

/// Validate an optional checksum; absent values are accepted
pub fn validate_checksum(
    field: &str,
    value: Option<&str>,
    kind: ChecksumKind,
) -> Result<(), PulpError> {
    let Some(value) = value else {
        return Ok(());
    };

    if value.len() != kind.hex_len() || !HEX_PATTERN.is_match(value) {
        return Err(PulpError::invalid_data(format!(
            "{} must be a lowercase hex string of {} characters, got '{}'",
            field,
            kind.hex_len(),
            value
        )));
    }

    Ok(())
}
