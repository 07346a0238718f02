//! Client abstraction over the remote service
//!
//! All operations are asynchronous; awaiting them corresponds to waiting on
//! the remote tasks they spawn. Operations that spawn tasks resolve to the
//! completed tasks, or to [`PulpError::TaskFailed`] if any of them failed.

mod attached;
mod source;

use async_trait::async_trait;

use crate::domain::criteria::Criteria;
use crate::domain::error::PulpError;
use crate::domain::repository::Repository;
use crate::domain::task::Task;
use crate::domain::unit::Unit;

pub use attached::AttachedRepository;
pub use source::{UploadSource, DEFAULT_CHUNK_SIZE};

#[cfg(test)]
use mockall::automock;

/// Operations offered by the remote content service
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Client: Send + Sync {
    /// Get a repository by ID; unknown IDs fail with `NotFound`
    async fn get_repository(&self, repo_id: &str) -> Result<Repository, PulpError>;

    async fn search_repository(&self, criteria: &Criteria) -> Result<Vec<Repository>, PulpError>;

    /// Search units across all repositories
    async fn search_content(&self, criteria: &Criteria) -> Result<Vec<Unit>, PulpError>;

    /// Search units within one repository
    async fn search_repository_content(
        &self,
        repo_id: &str,
        criteria: &Criteria,
    ) -> Result<Vec<Unit>, PulpError>;

    /// Upload an RPM into a yum repository
    async fn upload_rpm(&self, repo_id: &str, source: UploadSource)
        -> Result<Vec<Task>, PulpError>;

    /// Upload a file into a file repository
    ///
    /// `name` defaults to the source's file name when the source is a path.
    async fn upload_file(
        &self,
        repo_id: &str,
        source: UploadSource,
        name: Option<String>,
    ) -> Result<Vec<Task>, PulpError>;

    /// Publish a repository through each of its distributors
    async fn publish_repository(&self, repo_id: &str) -> Result<Vec<Task>, PulpError>;

    /// Copy units matching `criteria` from one repository to another
    async fn copy_content(
        &self,
        from_repo: &str,
        to_repo: &str,
        criteria: &Criteria,
    ) -> Result<Vec<Task>, PulpError>;

    /// Remove units matching `criteria` from a repository
    async fn remove_content(&self, repo_id: &str, criteria: &Criteria)
        -> Result<Vec<Task>, PulpError>;

    /// Delete a repository; deleting an unknown repository spawns no tasks
    async fn delete_repository(&self, repo_id: &str) -> Result<Vec<Task>, PulpError>;
}

/// Fail with `TaskFailed` for the first unsuccessful task
pub fn check_tasks(tasks: Vec<Task>) -> Result<Vec<Task>, PulpError> {
    tasks.into_iter().map(Task::into_result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tasks_all_succeeded() {
        let mut task = Task::new("t1");
        task.mark_running().unwrap();
        task.mark_finished(Vec::new()).unwrap();

        let tasks = check_tasks(vec![task]).unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_check_tasks_reports_failure() {
        let mut ok = Task::new("t1");
        ok.mark_running().unwrap();
        ok.mark_finished(Vec::new()).unwrap();

        let mut failed = Task::new("t2");
        failed.mark_running().unwrap();
        failed.mark_error("publish failed", None).unwrap();

        let err = check_tasks(vec![ok, failed]).unwrap_err();
        assert_eq!(err.to_string(), "Task t2 failed: publish failed");
    }
}
