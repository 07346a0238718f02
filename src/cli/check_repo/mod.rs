//! check-repo command - validates repository documents

use std::path::PathBuf;

use clap::Args;
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::record::converters::format_timestamp;
use crate::domain::record::PulpRecord;
use crate::domain::repository::Repository;

#[derive(Args, Debug)]
pub struct CheckRepoArgs {
    /// JSON file holding one repository document or an array of them
    pub path: PathBuf,
}

pub async fn run(args: CheckRepoArgs) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(&args.path).await?;
    let data: Value = serde_json::from_str(&content)?;

    let documents = match data {
        Value::Array(items) => items,
        other => vec![other],
    };

    let mut failures = 0;
    for (index, document) in documents.iter().enumerate() {
        match Repository::from_data(document) {
            Ok(repo) => println!("{}", summarize(&repo)),
            Err(err) => {
                warn!(index, error = %err, "Invalid repository document");
                println!("#{}: {}", index, err);
                failures += 1;
            }
        }
    }

    info!(checked = documents.len(), failures, "Checked repositories");
    if failures > 0 {
        anyhow::bail!("{} of {} documents are invalid", failures, documents.len());
    }
    Ok(())
}

fn summarize(repo: &Repository) -> String {
    let created = repo
        .created()
        .map(|c| format_timestamp(&c))
        .unwrap_or_else(|| "-".to_string());
    let distributors: Vec<&str> = repo.distributors().iter().map(|d| d.id()).collect();

    format!(
        "{}: type={} created={} distributors=[{}] signing_keys=[{}]",
        repo.id(),
        repo.repo_type(),
        created,
        distributors.join(", "),
        repo.signing_keys().join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::Distributor;

    #[test]
    fn test_summarize() {
        let repo = Repository::yum("repo1")
            .with_distributors(vec![Distributor::new("yum_distributor", "yum_distributor")])
            .with_signing_keys(vec!["f78fb195"]);
        assert_eq!(
            summarize(&repo),
            "repo1: type=yum created=- distributors=[yum_distributor] signing_keys=[f78fb195]"
        );
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos.json");
        std::fs::write(&path, r#"[{"id": "repo1"}, {"id": 42}]"#).unwrap();

        let err = run(CheckRepoArgs { path }).await.unwrap_err();
        assert!(err.to_string().contains("1 of 2"));
    }
}
