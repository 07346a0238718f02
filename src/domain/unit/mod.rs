//! Content units managed by the remote service

mod file;
mod modulemd;
mod rpm;

use serde::Serialize;
use serde_json::Value;

use crate::domain::error::PulpError;
use crate::domain::record::{FrozenList, PulpRecord};

pub use file::{FileUnit, FILE_CONTENT_TYPE};
pub use modulemd::{ModulemdUnit, MODULEMD_CONTENT_TYPE};
pub use rpm::{RpmDependency, RpmUnit, RPM_CONTENT_TYPE, SRPM_CONTENT_TYPE};

/// Remote field carrying a unit's type
pub const CONTENT_TYPE_FIELD: &str = "_content_type_id";

/// True for content types decoded into a [`Unit`] variant
pub fn is_supported_type(content_type_id: &str) -> bool {
    matches!(
        content_type_id,
        RPM_CONTENT_TYPE | SRPM_CONTENT_TYPE | MODULEMD_CONTENT_TYPE | FILE_CONTENT_TYPE
    )
}

/// Identity of a unit; two units with the same key are the same content
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitKey {
    content_type_id: String,
    fields: Vec<String>,
}

impl UnitKey {
    fn new(content_type_id: &str, fields: &[&str]) -> Self {
        Self {
            content_type_id: content_type_id.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Any supported content unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Unit {
    Rpm(RpmUnit),
    Modulemd(ModulemdUnit),
    File(FileUnit),
}

impl Unit {
    pub fn content_type_id(&self) -> &str {
        match self {
            Self::Rpm(u) => u.content_type_id(),
            Self::Modulemd(u) => u.content_type_id(),
            Self::File(u) => u.content_type_id(),
        }
    }

    pub fn repository_memberships(&self) -> Option<&FrozenList<String>> {
        match self {
            Self::Rpm(u) => u.repository_memberships(),
            Self::Modulemd(u) => u.repository_memberships(),
            Self::File(u) => u.repository_memberships(),
        }
    }

    /// True if the unit is known to be in `repo_id`
    pub fn in_repository(&self, repo_id: &str) -> bool {
        self.repository_memberships()
            .is_some_and(|repos| repos.iter().any(|r| r == repo_id))
    }

    /// Returns a copy of this unit with the given memberships
    pub fn with_repository_memberships(self, repos: FrozenList<String>) -> Self {
        match self {
            Self::Rpm(u) => Self::Rpm(u.with_repository_memberships(repos.iter().cloned())),
            Self::Modulemd(u) => {
                Self::Modulemd(u.with_repository_memberships(repos.iter().cloned()))
            }
            Self::File(u) => Self::File(u.with_repository_memberships(repos.iter().cloned())),
        }
    }

    /// Returns a copy of this unit with membership information cleared
    pub fn without_repository_memberships(self) -> Self {
        match self {
            Self::Rpm(u) => Self::Rpm(u.without_repository_memberships()),
            Self::Modulemd(u) => Self::Modulemd(u.without_repository_memberships()),
            Self::File(u) => Self::File(u.without_repository_memberships()),
        }
    }

    pub fn unit_key(&self) -> UnitKey {
        match self {
            Self::Rpm(u) => UnitKey::new(
                u.content_type_id(),
                &[
                    u.name(),
                    u.epoch().unwrap_or("0"),
                    u.version(),
                    u.release(),
                    u.arch(),
                    u.sha256sum().unwrap_or_default(),
                ],
            ),
            Self::Modulemd(u) => {
                let version = u.version().to_string();
                UnitKey::new(
                    u.content_type_id(),
                    &[u.name(), u.stream(), &version, u.context(), u.arch()],
                )
            }
            Self::File(u) => {
                let size = u.size().to_string();
                UnitKey::new(u.content_type_id(), &[u.path(), &size, u.sha256sum()])
            }
        }
    }

    pub fn as_rpm(&self) -> Option<&RpmUnit> {
        match self {
            Self::Rpm(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_modulemd(&self) -> Option<&ModulemdUnit> {
        match self {
            Self::Modulemd(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileUnit> {
        match self {
            Self::File(u) => Some(u),
            _ => None,
        }
    }
}

impl PulpRecord for Unit {
    /// Decode a unit, selecting the variant from `_content_type_id`
    fn from_data(data: &Value) -> Result<Self, PulpError> {
        let type_id = data
            .get(CONTENT_TYPE_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                PulpError::invalid_data(format!("Unit: missing or invalid {}", CONTENT_TYPE_FIELD))
            })?;

        match type_id {
            RPM_CONTENT_TYPE | SRPM_CONTENT_TYPE => RpmUnit::from_data(data).map(Self::Rpm),
            MODULEMD_CONTENT_TYPE => ModulemdUnit::from_data(data).map(Self::Modulemd),
            FILE_CONTENT_TYPE => FileUnit::from_data(data).map(Self::File),
            other => Err(PulpError::invalid_data(format!(
                "Unit: unsupported content type '{}'",
                other
            ))),
        }
    }

    fn to_data(&self) -> Value {
        match self {
            Self::Rpm(u) => u.to_data(),
            Self::Modulemd(u) => u.to_data(),
            Self::File(u) => u.to_data(),
        }
    }
}

impl From<RpmUnit> for Unit {
    fn from(unit: RpmUnit) -> Self {
        Self::Rpm(unit)
    }
}

impl From<ModulemdUnit> for Unit {
    fn from(unit: ModulemdUnit) -> Self {
        Self::Modulemd(unit)
    }
}

impl From<FileUnit> for Unit {
    fn from(unit: FileUnit) -> Self {
        Self::File(unit)
    }
}
