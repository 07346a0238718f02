//! RPM unit and dependency records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::PulpError;
use crate::domain::record::validators::{validate_checksum, ChecksumKind};
use crate::domain::record::{decode, encode, frozen_list_or_none, FrozenList, PulpRecord};

pub const RPM_CONTENT_TYPE: &str = "rpm";
pub const SRPM_CONTENT_TYPE: &str = "srpm";

fn default_content_type() -> String {
    RPM_CONTENT_TYPE.to_string()
}

/// A dependency (requires/provides entry) of an RPM
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RpmDependency {
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    release: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    epoch: Option<String>,

    /// Comparison flag: one of LT, GT, EQ, LE, GE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flags: Option<String>,
}

impl RpmDependency {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            release: None,
            epoch: None,
            flags: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    pub fn with_epoch(mut self, epoch: impl Into<String>) -> Self {
        self.epoch = Some(epoch.into());
        self
    }

    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = Some(flags.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn release(&self) -> Option<&str> {
        self.release.as_deref()
    }

    pub fn epoch(&self) -> Option<&str> {
        self.epoch.as_deref()
    }

    pub fn flags(&self) -> Option<&str> {
        self.flags.as_deref()
    }
}

/// Checksums of an RPM, nested under `checksums` remotely
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct RpmChecksums {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    md5: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    sha1: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
}

impl RpmChecksums {
    fn is_empty(&self) -> bool {
        self.md5.is_none() && self.sha1.is_none() && self.sha256.is_none()
    }
}

/// A unit representing a binary or source RPM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpmUnit {
    name: String,
    version: String,
    release: String,
    arch: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    epoch: Option<String>,

    /// Short ID of the key which signed the package, if signed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signing_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    sourcerpm: Option<String>,

    #[serde(default, skip_serializing_if = "RpmChecksums::is_empty")]
    checksums: RpmChecksums,

    #[serde(rename = "_content_type_id", default = "default_content_type")]
    content_type_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    repository_memberships: Option<FrozenList<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    requires: Option<FrozenList<RpmDependency>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    provides: Option<FrozenList<RpmDependency>>,
}

impl RpmUnit {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        release: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            release: release.into(),
            arch: arch.into(),
            epoch: None,
            signing_key: None,
            filename: None,
            sourcerpm: None,
            checksums: RpmChecksums::default(),
            content_type_id: default_content_type(),
            repository_memberships: None,
            requires: None,
            provides: None,
        }
    }

    pub fn with_epoch(mut self, epoch: impl Into<String>) -> Self {
        self.epoch = Some(epoch.into());
        self
    }

    pub fn with_signing_key(mut self, key: impl Into<String>) -> Self {
        self.signing_key = Some(key.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_sourcerpm(mut self, sourcerpm: impl Into<String>) -> Self {
        self.sourcerpm = Some(sourcerpm.into());
        self
    }

    pub fn with_md5sum(mut self, sum: impl Into<String>) -> Self {
        self.checksums.md5 = Some(sum.into());
        self
    }

    pub fn with_sha1sum(mut self, sum: impl Into<String>) -> Self {
        self.checksums.sha1 = Some(sum.into());
        self
    }

    pub fn with_sha256sum(mut self, sum: impl Into<String>) -> Self {
        self.checksums.sha256 = Some(sum.into());
        self
    }

    pub fn with_content_type_id(mut self, content_type_id: impl Into<String>) -> Self {
        self.content_type_id = content_type_id.into();
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

    pub fn with_requires(mut self, deps: impl IntoIterator<Item = RpmDependency>) -> Self {
        self.requires = Some(deps.into_iter().collect());
        self
    }

    pub fn with_provides(mut self, deps: impl IntoIterator<Item = RpmDependency>) -> Self {
        self.provides = Some(deps.into_iter().collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn epoch(&self) -> Option<&str> {
        self.epoch.as_deref()
    }

    pub fn signing_key(&self) -> Option<&str> {
        self.signing_key.as_deref()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn sourcerpm(&self) -> Option<&str> {
        self.sourcerpm.as_deref()
    }

    pub fn md5sum(&self) -> Option<&str> {
        self.checksums.md5.as_deref()
    }

    pub fn sha1sum(&self) -> Option<&str> {
        self.checksums.sha1.as_deref()
    }

    pub fn sha256sum(&self) -> Option<&str> {
        self.checksums.sha256.as_deref()
    }

    pub fn content_type_id(&self) -> &str {
        &self.content_type_id
    }

    pub fn repository_memberships(&self) -> Option<&FrozenList<String>> {
        self.repository_memberships.as_ref()
    }

    pub fn requires(&self) -> Option<&FrozenList<RpmDependency>> {
        self.requires.as_ref()
    }

    pub fn provides(&self) -> Option<&FrozenList<RpmDependency>> {
        self.provides.as_ref()
    }

    /// True for source packages
    pub fn is_source(&self) -> bool {
        self.content_type_id == SRPM_CONTENT_TYPE
    }

    /// `name-[epoch:]version-release.arch`, epoch omitted when zero or unset
    pub fn nevra(&self) -> String {
        match self.epoch.as_deref() {
            Some(epoch) if epoch != "0" => format!(
                "{}-{}:{}-{}.{}",
                self.name, epoch, self.version, self.release, self.arch
            ),
            _ => format!(
                "{}-{}-{}.{}",
                self.name, self.version, self.release, self.arch
            ),
        }
    }

    fn validate(&self) -> Result<(), PulpError> {
        if self.content_type_id != RPM_CONTENT_TYPE && self.content_type_id != SRPM_CONTENT_TYPE {
            return Err(PulpError::invalid_data(format!(
                "RpmUnit: unexpected content type '{}'",
                self.content_type_id
            )));
        }

        validate_checksum("md5sum", self.md5sum(), ChecksumKind::Md5)?;
        validate_checksum("sha1sum", self.sha1sum(), ChecksumKind::Sha1)?;
        validate_checksum("sha256sum", self.sha256sum(), ChecksumKind::Sha256)?;
        Ok(())
    }
}

impl PulpRecord for RpmUnit {
    fn from_data(data: &Value) -> Result<Self, PulpError> {
        let unit: Self = decode("RpmUnit", data)?;
        unit.validate()?;
        Ok(unit)
    }

    fn to_data(&self) -> Value {
        encode(self)
    }
}
