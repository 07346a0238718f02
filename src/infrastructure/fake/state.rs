//! Shared state behind the fake controller and client

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::error::PulpError;
use crate::domain::record::FrozenList;
use crate::domain::repository::Repository;
use crate::domain::task::Task;
use crate::domain::unit::{Unit, UnitKey};

/// A publish performed through the fake client
#[derive(Debug, Clone, PartialEq)]
pub struct Publish {
    pub repository: Repository,
    pub tasks: Vec<Task>,
}

/// An upload performed through the fake client
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub repository: Repository,
    pub tasks: Vec<Task>,
    pub name: Option<String>,
    pub sha256: String,
}

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub repositories: BTreeMap<String, Repository>,
    pub units: BTreeMap<UnitKey, Unit>,
    pub tasks: Vec<Task>,
    pub publishes: Vec<Publish>,
    pub uploads: Vec<Upload>,
}

impl FakeState {
    pub fn repository(&self, repo_id: &str) -> Result<&Repository, PulpError> {
        self.repositories
            .get(repo_id)
            .ok_or_else(|| PulpError::not_found(format!("Repository '{}'", repo_id)))
    }

    /// Store a unit, merging repository memberships with any identical unit
    ///
    /// Memberships stay unknown (`None`) unless either side knows them.
    pub fn put_unit(&mut self, unit: Unit) -> Unit {
        let key = unit.unit_key();
        let stored = self
            .units
            .get(&key)
            .and_then(Unit::repository_memberships);

        let merged = if stored.is_none() && unit.repository_memberships().is_none() {
            unit
        } else {
            let repos: BTreeSet<String> = stored
                .into_iter()
                .chain(unit.repository_memberships())
                .flat_map(|repos| repos.iter().cloned())
                .collect();
            unit.with_repository_memberships(repos.into_iter().collect())
        };

        self.units.insert(key, merged.clone());
        merged
    }

    /// Add `repo_id` to the memberships of the unit stored under `key`
    pub fn add_membership(&mut self, key: &UnitKey, repo_id: &str) -> Option<Unit> {
        let unit = self.units.get(key)?.clone();
        let repos = match unit.repository_memberships() {
            Some(repos) if repos.iter().any(|r| r == repo_id) => repos.clone(),
            Some(repos) => repos.with(repo_id.to_string()),
            None => FrozenList::new([repo_id.to_string()]),
        };

        let updated = unit.with_repository_memberships(repos);
        self.units.insert(key.clone(), updated.clone());
        Some(updated)
    }

    /// Drop `repo_id` from the memberships of the unit stored under `key`
    pub fn remove_membership(&mut self, key: &UnitKey, repo_id: &str) -> Option<Unit> {
        let unit = self.units.get(key)?.clone();
        let repos: FrozenList<String> = unit
            .repository_memberships()
            .map(|repos| repos.iter().filter(|r| *r != repo_id).cloned().collect())
            .unwrap_or_default();

        let updated = unit.with_repository_memberships(repos);
        self.units.insert(key.clone(), updated.clone());
        Some(updated)
    }

    /// Keys of units which are members of `repo_id`
    pub fn keys_in(&self, repo_id: &str) -> Vec<UnitKey> {
        self.units
            .iter()
            .filter(|(_, unit)| unit.in_repository(repo_id))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::unit::{FileUnit, RpmUnit};

    const SHA: &str = "e837a635cc99f967a70f34b268baa52e0f412c1502e08e924ff5b09f1f9573f2";

    fn walrus(repos: &[&str]) -> Unit {
        RpmUnit::new("walrus", "5.21", "1", "noarch")
            .with_sha256sum(SHA)
            .with_repository_memberships(repos.to_vec())
            .into()
    }

    #[test]
    fn test_put_unit_merges_memberships() {
        let mut state = FakeState::default();
        state.put_unit(walrus(&["repo1"]));
        let merged = state.put_unit(walrus(&["repo2"]));

        assert_eq!(state.units.len(), 1);
        assert_eq!(
            merged.repository_memberships().unwrap(),
            &vec!["repo1".to_string(), "repo2".to_string()]
        );
    }

    #[test]
    fn test_put_unit_keeps_unknown_memberships() {
        let mut state = FakeState::default();
        let stored = state.put_unit(
            RpmUnit::new("walrus", "5.21", "1", "noarch")
                .with_sha256sum(SHA)
                .into(),
        );
        assert!(stored.repository_memberships().is_none());

        let merged = state.put_unit(walrus(&["repo1"]));
        assert_eq!(state.units.len(), 1);
        assert_eq!(merged.repository_memberships().unwrap(), &vec!["repo1".to_string()]);
    }

    #[test]
    fn test_membership_changes() {
        let mut state = FakeState::default();
        let unit = state.put_unit(FileUnit::new("a.txt", 1, SHA).into());
        let key = unit.unit_key();

        let added = state.add_membership(&key, "files").unwrap();
        assert!(added.in_repository("files"));
        assert_eq!(state.keys_in("files"), vec![key.clone()]);

        let removed = state.remove_membership(&key, "files").unwrap();
        assert!(!removed.in_repository("files"));
        assert!(state.keys_in("files").is_empty());
    }

    #[test]
    fn test_unknown_repository() {
        let state = FakeState::default();
        let err = state.repository("nope").unwrap_err();
        assert!(matches!(err, PulpError::NotFound { .. }));
    }
}
