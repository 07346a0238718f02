//! Repository records bound to a client

use std::fmt;
use std::sync::Arc;

use super::{Client, UploadSource};
use crate::domain::criteria::Criteria;
use crate::domain::error::PulpError;
use crate::domain::repository::Repository;
use crate::domain::task::Task;
use crate::domain::unit::Unit;

/// A repository together with the client it was obtained from
#[derive(Clone)]
pub struct AttachedRepository {
    repository: Repository,
    client: Arc<dyn Client>,
}

impl AttachedRepository {
    pub fn new(repository: Repository, client: Arc<dyn Client>) -> Self {
        Self { repository, client }
    }

    /// Fetch a repository and bind it to `client`
    pub async fn fetch(client: Arc<dyn Client>, repo_id: &str) -> Result<Self, PulpError> {
        let repository = client.get_repository(repo_id).await?;
        Ok(Self::new(repository, client))
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn id(&self) -> &str {
        self.repository.id()
    }

    pub async fn upload_rpm(&self, source: impl Into<UploadSource>) -> Result<Vec<Task>, PulpError> {
        self.client.upload_rpm(self.id(), source.into()).await
    }

    pub async fn upload_file(
        &self,
        source: impl Into<UploadSource>,
        name: Option<&str>,
    ) -> Result<Vec<Task>, PulpError> {
        self.client
            .upload_file(self.id(), source.into(), name.map(str::to_string))
            .await
    }

    /// Search units in this repository
    pub async fn search_content(&self, criteria: &Criteria) -> Result<Vec<Unit>, PulpError> {
        self.client
            .search_repository_content(self.id(), criteria)
            .await
    }

    pub async fn publish(&self) -> Result<Vec<Task>, PulpError> {
        self.client.publish_repository(self.id()).await
    }

    pub async fn remove_content(&self, criteria: &Criteria) -> Result<Vec<Task>, PulpError> {
        self.client.remove_content(self.id(), criteria).await
    }

    /// Copy matching units from this repository into `to_repo`
    pub async fn copy_content_to(
        &self,
        to_repo: &str,
        criteria: &Criteria,
    ) -> Result<Vec<Task>, PulpError> {
        self.client.copy_content(self.id(), to_repo, criteria).await
    }

    pub async fn delete(&self) -> Result<Vec<Task>, PulpError> {
        self.client.delete_repository(self.id()).await
    }
}

impl fmt::Debug for AttachedRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachedRepository")
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}
