use clap::Parser;
use pulplib::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::init();

    match cli.command {
        Command::InspectRpm(args) => cli::inspect_rpm::run(args).await,
        Command::CheckRepo(args) => cli::check_repo::run(args).await,
        Command::FakeUpload(args) => cli::fake_upload::run(args, &config).await,
    }
}
