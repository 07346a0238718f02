//! Distributor record

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::PulpError;
use crate::domain::record::{decode, encode, PulpRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct DistributorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relative_url: Option<String>,
}

impl DistributorConfig {
    fn is_empty(&self) -> bool {
        self.relative_url.is_none()
    }
}

/// Publishing configuration attached to a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distributor {
    id: String,

    #[serde(rename = "distributor_type_id")]
    type_id: String,

    /// ID of the repository owning this distributor, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repo_id: Option<String>,

    #[serde(default, skip_serializing_if = "DistributorConfig::is_empty")]
    config: DistributorConfig,
}

impl Distributor {
    pub fn new(id: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_id: type_id.into(),
            repo_id: None,
            config: DistributorConfig::default(),
        }
    }

    pub fn with_repo_id(mut self, repo_id: impl Into<String>) -> Self {
        self.repo_id = Some(repo_id.into());
        self
    }

    pub fn with_relative_url(mut self, relative_url: impl Into<String>) -> Self {
        self.config.relative_url = Some(relative_url.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn repo_id(&self) -> Option<&str> {
        self.repo_id.as_deref()
    }

    pub fn relative_url(&self) -> Option<&str> {
        self.config.relative_url.as_deref()
    }
}

impl PulpRecord for Distributor {
    fn from_data(data: &Value) -> Result<Self, PulpError> {
        decode("Distributor", data)
    }

    fn to_data(&self) -> Value {
        encode(self)
    }
}
