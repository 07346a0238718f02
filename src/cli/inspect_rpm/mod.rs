//! inspect-rpm command - prints units built from package files

use std::path::PathBuf;

use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::domain::record::PulpRecord;
use crate::infrastructure::rpm::unit_from_path;

#[derive(Args, Debug)]
pub struct InspectRpmArgs {
    /// RPM files to read
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub async fn run(args: InspectRpmArgs) -> anyhow::Result<()> {
    let mut units = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        let unit = unit_from_path(path)
            .await
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        info!(path = %path.display(), nevra = %unit.nevra(), "Read package");
        units.push(unit.to_data());
    }

    println!("{}", serde_json::to_string_pretty(&Value::Array(units))?);
    Ok(())
}
