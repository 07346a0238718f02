//! Modulemd unit

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::PulpError;
use crate::domain::record::{decode, encode, frozen_list_or_none, FrozenList, PulpRecord};

pub const MODULEMD_CONTENT_TYPE: &str = "modulemd";

/// Leading epoch of a NEVRA, e.g. the `7:` in `perl-version-7:0.99.24-441.src`
static EPOCH_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+:").unwrap());

fn default_content_type() -> String {
    MODULEMD_CONTENT_TYPE.to_string()
}

/// A unit representing a modulemd document
///
/// Identified by name, stream, version, context and arch, e.g.
/// `javapackages-tools:201801:20180813043155:dca7b4a4:aarch64`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulemdUnit {
    /// Module name, e.g. "javapackages-tools"
    name: String,

    /// Module stream, e.g. "201801"
    stream: String,

    /// Module version, e.g. 20180813043155
    version: i64,

    /// Module context, e.g. "dca7b4a4"
    context: String,

    /// Module architecture, e.g. "aarch64"
    arch: String,

    #[serde(rename = "_content_type_id", default = "default_content_type")]
    content_type_id: String,

    /// IDs of repositories containing the unit, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repository_memberships: Option<FrozenList<String>>,

    /// RPM NEVRAs (without `.rpm`) belonging to the module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    artifacts: Option<FrozenList<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    profiles: Option<BTreeMap<String, FrozenList<String>>>,
}

impl ModulemdUnit {
    pub fn new(
        name: impl Into<String>,
        stream: impl Into<String>,
        version: i64,
        context: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            stream: stream.into(),
            version,
            context: context.into(),
            arch: arch.into(),
            content_type_id: default_content_type(),
            repository_memberships: None,
            artifacts: None,
            profiles: None,
        }
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

    pub fn with_artifacts<I>(mut self, artifacts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.artifacts = frozen_list_or_none(Some(artifacts));
        self
    }

    pub fn with_profile<I>(mut self, profile: impl Into<String>, packages: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let packages = packages.into_iter().map(Into::into).collect();
        self.profiles
            .get_or_insert_with(BTreeMap::new)
            .insert(profile.into(), packages);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn content_type_id(&self) -> &str {
        &self.content_type_id
    }

    pub fn repository_memberships(&self) -> Option<&FrozenList<String>> {
        self.repository_memberships.as_ref()
    }

    pub fn artifacts(&self) -> Option<&FrozenList<String>> {
        self.artifacts.as_ref()
    }

    pub fn profiles(&self) -> Option<&BTreeMap<String, FrozenList<String>>> {
        self.profiles.as_ref()
    }

    /// `name:stream:version:context:arch`
    pub fn nsvca(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.name, self.stream, self.version, self.context, self.arch
        )
    }

    /// RPM filenames of the module's artifacts
    ///
    /// Artifacts are NEVRAs without the `.rpm` extension; the epoch is
    /// dropped and the extension appended.
    pub fn artifacts_filenames(&self) -> BTreeSet<String> {
        self.artifacts
            .iter()
            .flat_map(|artifacts| artifacts.iter())
            .map(|nevra| format!("{}.rpm", EPOCH_PATTERN.replacen(nevra, 1, "")))
            .collect()
    }

    fn validate(&self) -> Result<(), PulpError> {
        if self.content_type_id != MODULEMD_CONTENT_TYPE {
            return Err(PulpError::invalid_data(format!(
                "ModulemdUnit: unexpected content type '{}'",
                self.content_type_id
            )));
        }
        Ok(())
    }
}

impl PulpRecord for ModulemdUnit {
    fn from_data(data: &Value) -> Result<Self, PulpError> {
        let unit: Self = decode("ModulemdUnit", data)?;
        unit.validate()?;
        Ok(unit)
    }

    fn to_data(&self) -> Value {
        encode(self)
    }
}
