//! Client implementation backed by in-memory state

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::state::{FakeState, Publish, Upload};
use crate::domain::client::{check_tasks, Client, UploadSource};
use crate::domain::criteria::Criteria;
use crate::domain::error::PulpError;
use crate::domain::record::{FrozenList, PulpRecord};
use crate::domain::repository::{Repository, RepositoryType};
use crate::domain::task::Task;
use crate::domain::unit::{FileUnit, Unit};
use crate::infrastructure::checksum::{sha256_hex, Checksums};
use crate::infrastructure::rpm::unit_from_bytes;

/// A [`Client`] operating on the state of a [`super::FakeController`]
#[derive(Debug, Clone)]
pub struct FakeClient {
    state: Arc<RwLock<FakeState>>,
    chunk_size: usize,
}

impl FakeClient {
    pub(crate) fn new(state: Arc<RwLock<FakeState>>, chunk_size: usize) -> Self {
        Self { state, chunk_size }
    }
}

/// Create a task for `action` on `repo_id` and drive it to completion
fn run_task<F>(state: &mut FakeState, repo_id: &str, action: &str, work: F) -> Result<Task, PulpError>
where
    F: FnOnce(&mut FakeState) -> Result<Vec<Unit>, PulpError>,
{
    let mut task = Task::generate().for_repository(repo_id, action);
    task.mark_running()?;

    match work(state) {
        Ok(units) => {
            debug!(task_id = %task.id(), units = units.len(), "Task finished");
            task.mark_finished(units)?;
        }
        Err(err) => {
            warn!(task_id = %task.id(), error = %err, "Task failed");
            task.mark_error(err.to_string(), None)?;
        }
    }

    state.tasks.push(task.clone());
    Ok(task)
}

fn require_type(repository: &Repository, expected: RepositoryType) -> Result<(), PulpError> {
    if repository.repo_type() != expected {
        return Err(PulpError::invalid_data(format!(
            "Repository '{}' is a {} repository, expected {}",
            repository.id(),
            repository.repo_type(),
            expected
        )));
    }
    Ok(())
}

impl FakeClient {
    /// Store an uploaded unit as a member of `repo_id`, recording the upload
    ///
    /// The repository type is checked again here since the repository may
    /// have been replaced while the source was read.
    async fn finish_upload(
        &self,
        repo_id: &str,
        expected: RepositoryType,
        name: Option<String>,
        sha256: String,
        unit: Result<Unit, PulpError>,
    ) -> Result<Vec<Task>, PulpError> {
        let mut state = self.state.write().await;
        let repository = state.repository(repo_id)?.clone();
        require_type(&repository, expected)?;

        let task = run_task(&mut state, repo_id, "import_upload", |state| {
            let unit = unit?.with_repository_memberships(FrozenList::new([repo_id.to_string()]));
            Ok(vec![state.put_unit(unit)])
        })?;

        state.uploads.push(Upload {
            repository,
            tasks: vec![task.clone()],
            name,
            sha256,
        });

        check_tasks(vec![task])
    }
}

#[async_trait]
impl Client for FakeClient {
    async fn get_repository(&self, repo_id: &str) -> Result<Repository, PulpError> {
        let state = self.state.read().await;
        state.repository(repo_id).cloned()
    }

    async fn search_repository(&self, criteria: &Criteria) -> Result<Vec<Repository>, PulpError> {
        let state = self.state.read().await;
        Ok(state
            .repositories
            .values()
            .filter(|repo| criteria.matches(&repo.to_data()))
            .cloned()
            .collect())
    }

    async fn search_content(&self, criteria: &Criteria) -> Result<Vec<Unit>, PulpError> {
        let state = self.state.read().await;
        Ok(state
            .units
            .values()
            .filter(|unit| criteria.matches(&unit.to_data()))
            .cloned()
            .collect())
    }

    async fn search_repository_content(
        &self,
        repo_id: &str,
        criteria: &Criteria,
    ) -> Result<Vec<Unit>, PulpError> {
        let state = self.state.read().await;
        state.repository(repo_id)?;

        Ok(state
            .units
            .values()
            .filter(|unit| unit.in_repository(repo_id) && criteria.matches(&unit.to_data()))
            .cloned()
            .collect())
    }

    #[instrument(skip(self, source))]
    async fn upload_rpm(
        &self,
        repo_id: &str,
        source: UploadSource,
    ) -> Result<Vec<Task>, PulpError> {
        {
            let state = self.state.read().await;
            require_type(state.repository(repo_id)?, RepositoryType::Yum)?;
        }

        let name = source.file_name();
        let content = source.read_all(self.chunk_size).await?;
        let sha256 = sha256_hex(&content);
        info!(bytes = content.len(), %sha256, "Uploading RPM");

        let unit = unit_from_bytes(&content).map(Unit::from);
        let name = name.or_else(|| {
            unit.as_ref()
                .ok()
                .and_then(Unit::as_rpm)
                .and_then(|rpm| rpm.filename().map(str::to_string))
        });

        self.finish_upload(repo_id, RepositoryType::Yum, name, sha256, unit)
            .await
    }

    #[instrument(skip(self, source))]
    async fn upload_file(
        &self,
        repo_id: &str,
        source: UploadSource,
        name: Option<String>,
    ) -> Result<Vec<Task>, PulpError> {
        {
            let state = self.state.read().await;
            require_type(state.repository(repo_id)?, RepositoryType::File)?;
        }

        let name = name.or_else(|| source.file_name()).ok_or_else(|| {
            PulpError::invalid_data("A name is required when uploading from a file object or bytes")
        })?;
        let content = source.read_all(self.chunk_size).await?;
        let sums = Checksums::compute(&content);
        info!(bytes = content.len(), sha256 = %sums.sha256, "Uploading file");

        let unit = Unit::from(FileUnit::new(name.clone(), content.len() as u64, sums.sha256.clone()));
        self.finish_upload(repo_id, RepositoryType::File, Some(name), sums.sha256, Ok(unit))
            .await
    }

    #[instrument(skip(self))]
    async fn publish_repository(&self, repo_id: &str) -> Result<Vec<Task>, PulpError> {
        let mut state = self.state.write().await;
        let repository = state.repository(repo_id)?.clone();

        let mut tasks = Vec::with_capacity(repository.distributors().len());
        for distributor in repository.distributors() {
            debug!(distributor = %distributor.id(), "Publishing");
            let action = format!("publish:{}", distributor.id());
            tasks.push(run_task(&mut state, repo_id, &action, |_| Ok(Vec::new()))?);
        }

        info!(tasks = tasks.len(), "Published repository");
        state.publishes.push(Publish {
            repository,
            tasks: tasks.clone(),
        });

        check_tasks(tasks)
    }

    #[instrument(skip(self, criteria))]
    async fn copy_content(
        &self,
        from_repo: &str,
        to_repo: &str,
        criteria: &Criteria,
    ) -> Result<Vec<Task>, PulpError> {
        let mut state = self.state.write().await;
        state.repository(from_repo)?;
        state.repository(to_repo)?;

        let keys: Vec<_> = state
            .keys_in(from_repo)
            .into_iter()
            .filter(|key| {
                state
                    .units
                    .get(key)
                    .is_some_and(|unit| criteria.matches(&unit.to_data()))
            })
            .collect();

        let task = run_task(&mut state, to_repo, "associate", |state| {
            Ok(keys
                .iter()
                .filter_map(|key| state.add_membership(key, to_repo))
                .collect())
        })?;

        info!(units = task.units().len(), "Copied content");
        check_tasks(vec![task])
    }

    #[instrument(skip(self, criteria))]
    async fn remove_content(
        &self,
        repo_id: &str,
        criteria: &Criteria,
    ) -> Result<Vec<Task>, PulpError> {
        let mut state = self.state.write().await;
        state.repository(repo_id)?;

        let keys: Vec<_> = state
            .keys_in(repo_id)
            .into_iter()
            .filter(|key| {
                state
                    .units
                    .get(key)
                    .is_some_and(|unit| criteria.matches(&unit.to_data()))
            })
            .collect();

        let task = run_task(&mut state, repo_id, "unassociate", |state| {
            Ok(keys
                .iter()
                .filter_map(|key| state.remove_membership(key, repo_id))
                .collect())
        })?;

        info!(units = task.units().len(), "Removed content");
        check_tasks(vec![task])
    }

    #[instrument(skip(self))]
    async fn delete_repository(&self, repo_id: &str) -> Result<Vec<Task>, PulpError> {
        let mut state = self.state.write().await;
        if !state.repositories.contains_key(repo_id) {
            debug!("Repository does not exist, nothing to delete");
            return Ok(Vec::new());
        }

        let task = run_task(&mut state, repo_id, "delete", |state| {
            state.repositories.remove(repo_id);
            for key in state.keys_in(repo_id) {
                state.remove_membership(&key, repo_id);
            }
            Ok(Vec::new())
        })?;

        info!("Deleted repository");
        check_tasks(vec![task])
    }
}
