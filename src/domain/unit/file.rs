//! File (ISO) unit

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::PulpError;
use crate::domain::record::validators::{validate_checksum, ChecksumKind};
use crate::domain::record::{decode, encode, frozen_list_or_none, FrozenList, PulpRecord};

pub const FILE_CONTENT_TYPE: &str = "iso";

fn default_content_type() -> String {
    FILE_CONTENT_TYPE.to_string()
}

/// A unit representing a plain file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUnit {
    /// Relative path of the file within its repository
    #[serde(rename = "name")]
    path: String,

    size: u64,

    #[serde(rename = "checksum")]
    sha256sum: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(rename = "_content_type_id", default = "default_content_type")]
    content_type_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    repository_memberships: Option<FrozenList<String>>,
}

impl FileUnit {
    pub fn new(path: impl Into<String>, size: u64, sha256sum: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size,
            sha256sum: sha256sum.into(),
            description: None,
            content_type_id: default_content_type(),
            repository_memberships: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_repository_memberships<I>(mut self, repos: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.repository_memberships = frozen_list_or_none(Some(repos));
        self
    }

    pub fn without_repository_memberships(mut self) -> Self {
        self.repository_memberships = None;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn sha256sum(&self) -> &str {
        &self.sha256sum
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn content_type_id(&self) -> &str {
        &self.content_type_id
    }

    pub fn repository_memberships(&self) -> Option<&FrozenList<String>> {
        self.repository_memberships.as_ref()
    }

    fn validate(&self) -> Result<(), PulpError> {
        if self.path.is_empty() {
            return Err(PulpError::invalid_data("FileUnit: path cannot be empty"));
        }
        validate_checksum("sha256sum", Some(&self.sha256sum), ChecksumKind::Sha256)
    }
}

impl PulpRecord for FileUnit {
    fn from_data(data: &Value) -> Result<Self, PulpError> {
        let unit: Self = decode("FileUnit", data)?;
        unit.validate()?;
        Ok(unit)
    }

    fn to_data(&self) -> Value {
        encode(self)
    }
}
