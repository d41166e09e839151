use std::path::{Path, PathBuf};

use anyhow::Context;
use reqgrid::{Config, CsvExporter, ReviewTable, storage::download_base_name};
use tracing::instrument;

use crate::cli::{Loaded, Session, terminal::Colorize};

/// Command arguments for `req-review export`.
#[derive(Debug, clap::Parser)]
pub struct Export {
    #[command(flatten)]
    session: Session,

    /// Directory to write the CSV file to (default: the configured output
    /// directory)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

impl Export {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let Loaded { table, project, .. } = self.session.open(config)?;
        let dir = self.out.as_deref().unwrap_or(&config.output_dir);
        write_csv(&table, &project, config.csv_bom, dir)?;
        Ok(())
    }
}

/// Writes the reviewed table as CSV into `dir`, returning the file path.
pub fn write_csv(
    table: &ReviewTable,
    project: &str,
    bom: bool,
    dir: &Path,
) -> anyhow::Result<PathBuf> {
    let records = table
        .extract(project)
        .context("failed to collect reviewed requirements")?;
    let export = CsvExporter::new(bom).export(&records, &download_base_name(Some(project)));

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(&export.filename);
    std::fs::write(&path, &export.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "{}",
        format!(
            "Exported {} requirements to {}",
            records.len(),
            path.display()
        )
        .success()
    );
    Ok(path)
}
