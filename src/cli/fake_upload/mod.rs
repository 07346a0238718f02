//! fake-upload command - uploads RPMs into an in-memory fake repository

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use futures::future::try_join_all;
use serde_json::Value;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::client::{AttachedRepository, Client};
use crate::domain::criteria::Criteria;
use crate::domain::record::PulpRecord;
use crate::domain::repository::{Distributor, Repository};
use crate::infrastructure::fake::FakeController;

#[derive(Args, Debug)]
pub struct FakeUploadArgs {
    /// ID of the yum repository to create and upload into
    #[arg(long)]
    pub repo: String,

    /// Publish the repository after uploading
    #[arg(long)]
    pub publish: bool,

    /// RPM files to upload
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub async fn run(args: FakeUploadArgs, config: &AppConfig) -> anyhow::Result<()> {
    let controller = FakeController::with_chunk_size(config.upload.chunk_size);
    controller
        .insert_repository(
            Repository::yum(&args.repo).with_distributors(vec![
                Distributor::new("yum_distributor", "yum_distributor").with_repo_id(&args.repo),
            ]),
        )
        .await;

    let client: Arc<dyn Client> = controller.client();
    let repo = AttachedRepository::fetch(client, &args.repo).await?;

    let uploads = args.paths.iter().map(|path| repo.upload_rpm(path.clone()));
    let tasks: Vec<_> = try_join_all(uploads).await?.into_iter().flatten().collect();
    info!(tasks = tasks.len(), "Uploads complete");

    if args.publish {
        let published = repo.publish().await?;
        info!(tasks = published.len(), "Publish complete");
    }

    let units: Vec<Value> = repo
        .search_content(&Criteria::True)
        .await?
        .iter()
        .map(PulpRecord::to_data)
        .collect();
    println!("{}", serde_json::to_string_pretty(&Value::Array(units))?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::rpm::testing::RpmBuilder;

    #[tokio::test]
    async fn test_run_uploads_all_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for name in ["walrus", "seal"] {
            let path = dir.path().join(format!("{}-1.0-1.noarch.rpm", name));
            std::fs::write(&path, RpmBuilder::new(name, "1.0", "1", "noarch").build()).unwrap();
            paths.push(path);
        }

        let args = FakeUploadArgs {
            repo: "repo1".to_string(),
            publish: true,
            paths,
        };
        run(args, &AppConfig::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_run_fails_on_bad_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.rpm");
        std::fs::write(&path, b"nope").unwrap();

        let args = FakeUploadArgs {
            repo: "repo1".to_string(),
            publish: false,
            paths: vec![path],
        };
        assert!(run(args, &AppConfig::default()).await.is_err());
    }
}
