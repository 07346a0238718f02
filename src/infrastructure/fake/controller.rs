//! Controller owning the fake's in-memory state

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use super::client::FakeClient;
use super::state::{FakeState, Publish, Upload};
use crate::domain::client::DEFAULT_CHUNK_SIZE;
use crate::domain::record::FrozenList;
use crate::domain::repository::Repository;
use crate::domain::task::Task;
use crate::domain::unit::Unit;

/// In-memory stand-in for the remote service
///
/// The controller seeds and inspects state; [`FakeController::client`]
/// returns a [`FakeClient`] sharing the same state.
#[derive(Debug, Clone)]
pub struct FakeController {
    state: Arc<RwLock<FakeState>>,
    chunk_size: usize,
}

impl FakeController {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Controller whose clients read upload sources `chunk_size` bytes at a time
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(FakeState::default())),
            chunk_size,
        }
    }

    pub fn client(&self) -> Arc<FakeClient> {
        Arc::new(FakeClient::new(Arc::clone(&self.state), self.chunk_size))
    }

    /// Add a repository, replacing any existing repository with the same id
    pub async fn insert_repository(&self, repository: Repository) {
        debug!(repo_id = %repository.id(), "Inserting repository");
        let mut state = self.state.write().await;
        state
            .repositories
            .insert(repository.id().to_string(), repository);
    }

    /// Add units, as members of `repo_id` if given
    ///
    /// Units identical to stored ones have their memberships merged.
    pub async fn insert_units(&self, repo_id: Option<&str>, units: impl IntoIterator<Item = Unit>) {
        let mut state = self.state.write().await;
        for unit in units {
            let unit = match repo_id {
                Some(repo_id) => unit.with_repository_memberships(FrozenList::new([repo_id.to_string()])),
                None => unit,
            };
            state.put_unit(unit);
        }
    }

    /// All repositories, ordered by id
    pub async fn repositories(&self) -> Vec<Repository> {
        self.state.read().await.repositories.values().cloned().collect()
    }

    /// All units, across every repository
    pub async fn content_units(&self) -> Vec<Unit> {
        self.state.read().await.units.values().cloned().collect()
    }

    pub async fn publish_history(&self) -> Vec<Publish> {
        self.state.read().await.publishes.clone()
    }

    pub async fn upload_history(&self) -> Vec<Upload> {
        self.state.read().await.uploads.clone()
    }

    /// Every task created so far, oldest first
    pub async fn task_history(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }
}

impl Default for FakeController {
    fn default() -> Self {
        Self::new()
    }
}
