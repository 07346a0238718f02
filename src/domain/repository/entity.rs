//! Repository record

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Distributor;
use crate::domain::error::PulpError;
use crate::domain::record::converters::{
    comma_list, int_or_numeric_string, serialize_comma_list, timestamp_opt,
};
use crate::domain::record::{decode, encode, FrozenList, PulpRecord};

/// Kind of content a repository holds, from the `_repo-type` note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RepositoryType {
    Yum,
    File,
    Container,
    #[default]
    Generic,
}

impl RepositoryType {
    fn from_note(note: Option<&str>) -> Self {
        match note {
            Some("rpm-repo") => Self::Yum,
            Some("iso-repo") => Self::File,
            Some("docker-repo") => Self::Container,
            _ => Self::Generic,
        }
    }

    fn as_note(&self) -> Option<&'static str> {
        match self {
            Self::Yum => Some("rpm-repo"),
            Self::File => Some("iso-repo"),
            Self::Container => Some("docker-repo"),
            Self::Generic => None,
        }
    }
}

impl fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yum => write!(f, "yum"),
            Self::File => write!(f, "file"),
            Self::Container => write!(f, "container"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawNotes {
    #[serde(default, with = "timestamp_opt", skip_serializing_if = "Option::is_none")]
    created: Option<NaiveDateTime>,

    #[serde(rename = "_repo-type", default, skip_serializing_if = "Option::is_none")]
    repo_type: Option<String>,

    #[serde(
        default,
        deserialize_with = "int_or_numeric_string",
        skip_serializing_if = "Option::is_none"
    )]
    eng_product: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    relative_url: Option<String>,

    #[serde(
        default,
        deserialize_with = "comma_list",
        serialize_with = "serialize_comma_list",
        skip_serializing_if = "<[String]>::is_empty"
    )]
    signatures: FrozenList<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub_temp_repo: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawRepository {
    id: String,

    #[serde(default)]
    notes: Option<RawNotes>,

    #[serde(default)]
    distributors: Option<FrozenList<Distributor>>,
}

/// A repository on the remote service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    id: String,
    created: Option<NaiveDateTime>,
    distributors: FrozenList<Distributor>,
    repo_type: RepositoryType,
    eng_product_id: Option<i64>,
    relative_url: Option<String>,
    signing_keys: FrozenList<String>,
    is_temporary: bool,
}

impl Repository {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created: None,
            distributors: FrozenList::empty(),
            repo_type: RepositoryType::Generic,
            eng_product_id: None,
            relative_url: None,
            signing_keys: FrozenList::empty(),
            is_temporary: false,
        }
    }

    /// A repository holding RPM content
    pub fn yum(id: impl Into<String>) -> Self {
        Self::new(id).with_type(RepositoryType::Yum)
    }

    /// A repository holding plain files
    pub fn file(id: impl Into<String>) -> Self {
        Self::new(id).with_type(RepositoryType::File)
    }

    pub fn with_type(mut self, repo_type: RepositoryType) -> Self {
        self.repo_type = repo_type;
        self
    }

    pub fn with_created(mut self, created: NaiveDateTime) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_distributors(mut self, distributors: impl IntoIterator<Item = Distributor>) -> Self {
        self.distributors = distributors.into_iter().collect();
        self
    }

    pub fn with_eng_product_id(mut self, eng_product_id: i64) -> Self {
        self.eng_product_id = Some(eng_product_id);
        self
    }

    pub fn with_relative_url(mut self, relative_url: impl Into<String>) -> Self {
        self.relative_url = Some(relative_url.into());
        self
    }

    pub fn with_signing_keys<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.signing_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_is_temporary(mut self, is_temporary: bool) -> Self {
        self.is_temporary = is_temporary;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created(&self) -> Option<NaiveDateTime> {
        self.created
    }

    pub fn distributors(&self) -> &FrozenList<Distributor> {
        &self.distributors
    }

    pub fn repo_type(&self) -> RepositoryType {
        self.repo_type
    }

    pub fn eng_product_id(&self) -> Option<i64> {
        self.eng_product_id
    }

    pub fn relative_url(&self) -> Option<&str> {
        self.relative_url.as_deref()
    }

    pub fn signing_keys(&self) -> &FrozenList<String> {
        &self.signing_keys
    }

    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }

    pub fn distributor(&self, id: &str) -> Option<&Distributor> {
        self.distributors.iter().find(|d| d.id() == id)
    }
}

impl PulpRecord for Repository {
    fn from_data(data: &Value) -> Result<Self, PulpError> {
        let raw: RawRepository = decode("Repository", data)?;
        let notes = raw.notes.unwrap_or_default();

        Ok(Self {
            id: raw.id,
            created: notes.created,
            distributors: raw.distributors.unwrap_or_default(),
            repo_type: RepositoryType::from_note(notes.repo_type.as_deref()),
            eng_product_id: notes.eng_product,
            relative_url: notes.relative_url,
            signing_keys: notes.signatures,
            is_temporary: notes.pub_temp_repo,
        })
    }

    fn to_data(&self) -> Value {
        let raw = RawRepository {
            id: self.id.clone(),
            notes: Some(RawNotes {
                created: self.created,
                repo_type: self.repo_type.as_note().map(str::to_string),
                eng_product: self.eng_product_id,
                relative_url: self.relative_url.clone(),
                signatures: self.signing_keys.clone(),
                pub_temp_repo: self.is_temporary,
            }),
            distributors: Some(self.distributors.clone()),
        };
        encode(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_missing_props() {
        let err = Repository::from_data(&json!({"missing": "necessary props"})).unwrap_err();
        assert!(err.is_invalid_data());
    }

    #[test]
    fn test_bad_id() {
        let err = Repository::from_data(&json!({"id": ["foo", "bar", "baz"]})).unwrap_err();
        assert!(err.is_invalid_data());
    }

    #[test]
    fn test_attr_id() {
        let repo = Repository::from_data(&json!({"id": "some-repo"})).unwrap();
        assert_eq!(repo.id(), "some-repo");
    }

    #[test]
    fn test_default_created() {
        let repo = Repository::from_data(&json!({"id": "some-repo"})).unwrap();
        assert!(repo.created().is_none());
    }

    #[test]
    fn test_bad_created() {
        let err = Repository::from_data(&json!({"id": "some-repo", "notes": {"created": "whoops"}}))
            .unwrap_err();
        assert!(err.is_invalid_data());
    }

    #[test]
    fn test_attr_created() {
        let repo = Repository::from_data(&json!({
            "id": "some-repo",
            "notes": {"created": "2019-06-11T12:10:00Z"},
        }))
        .unwrap();

        let expected = NaiveDate::from_ymd_opt(2019, 6, 11)
            .unwrap()
            .and_hms_opt(12, 10, 0)
            .unwrap();
        assert_eq!(repo.created(), Some(expected));
    }

    #[test]
    fn test_distributors_created() {
        let repo = Repository::from_data(&json!({
            "id": "some-repo",
            "distributors": [
                {"id": "dist1", "distributor_type_id": "type1"},
                {"id": "dist2", "distributor_type_id": "type1"},
            ],
        }))
        .unwrap();

        assert_eq!(
            repo.distributors(),
            &vec![
                Distributor::new("dist1", "type1"),
                Distributor::new("dist2", "type1"),
            ]
        );
    }

    #[test]
    fn test_default_distributors_empty() {
        let repo = Repository::from_data(&json!({"id": "some-repo", "distributors": null})).unwrap();
        assert!(repo.distributors().is_empty());
    }

    #[test]
    fn test_notes_converters() {
        let repo = Repository::from_data(&json!({
            "id": "rhel-8-rpms",
            "notes": {
                "_repo-type": "rpm-repo",
                "eng_product": "123",
                "relative_url": "content/dist/rhel8",
                "signatures": "fd431d51, f21541eb",
                "pub_temp_repo": true,
            },
        }))
        .unwrap();

        assert_eq!(repo.repo_type(), RepositoryType::Yum);
        assert_eq!(repo.eng_product_id(), Some(123));
        assert_eq!(repo.relative_url(), Some("content/dist/rhel8"));
        assert_eq!(
            repo.signing_keys(),
            &vec!["fd431d51".to_string(), "f21541eb".to_string()]
        );
        assert!(repo.is_temporary());
    }

    #[test]
    fn test_bad_eng_product() {
        let err = Repository::from_data(&json!({
            "id": "some-repo",
            "notes": {"eng_product": "abc"},
        }))
        .unwrap_err();
        assert!(err.is_invalid_data());
    }

    #[test]
    fn test_to_data_round_trip() {
        let created = NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let repo = Repository::yum("repo1")
            .with_created(created)
            .with_distributors(vec![Distributor::new("yum_distributor", "yum_distributor")])
            .with_eng_product_id(42)
            .with_signing_keys(vec!["abc", "def"]);

        let data = repo.to_data();
        assert_eq!(data["notes"]["_repo-type"], "rpm-repo");
        assert_eq!(data["notes"]["created"], "2020-01-02T03:04:05Z");
        assert_eq!(data["notes"]["signatures"], "abc,def");
        assert!(data["notes"].get("pub_temp_repo").is_none());

        assert_eq!(Repository::from_data(&data).unwrap(), repo);
    }

    #[test]
    fn test_generic_type_writes_no_note() {
        let data = Repository::new("r").to_data();
        assert!(data["notes"].get("_repo-type").is_none());
    }
}
