//! CLI module for pulplib
//!
//! Provides subcommands for working with content offline:
//! - `inspect-rpm`: print the unit built from RPM files
//! - `check-repo`: validate repository documents
//! - `fake-upload`: upload RPMs into an in-memory fake repository

pub mod check_repo;
pub mod fake_upload;
pub mod inspect_rpm;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// pulplib - typed records and an in-memory fake for a Pulp content service
#[derive(Parser)]
#[command(name = "pulplib")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the RPM unit built from each package file
    InspectRpm(inspect_rpm::InspectRpmArgs),

    /// Validate repository JSON documents
    CheckRepo(check_repo::CheckRepoArgs),

    /// Upload RPMs into an in-memory fake repository
    FakeUpload(fake_upload::FakeUploadArgs),
}

/// Load configuration and install logging
pub fn init() -> AppConfig {
    dotenvy::dotenv().ok();

    let (config, error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    logging::init_logging(&config.logging);

    if let Some(err) = error {
        tracing::warn!(error = %err, "Falling back to default configuration");
    }
    config
}
