use std::path::{Path, PathBuf};

use anyhow::Context;
use reqgrid::{Config, FileSaveSink, ReviewTable, SaveSink};
use tracing::instrument;

use crate::cli::{Loaded, Session, terminal::Colorize};

/// Command arguments for `req-review save`.
#[derive(Debug, clap::Parser)]
pub struct Save {
    #[command(flatten)]
    session: Session,

    /// Directory to save into (default: the configured output directory)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

impl Save {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let Loaded {
            table,
            pdf_path,
            project,
        } = self.session.open(config)?;
        let dir = self.out.as_deref().unwrap_or(&config.output_dir);
        save_table(&table, &project, pdf_path.as_deref(), dir)
    }
}

/// Submits the reviewed table to the file save collaborator in `dir`.
pub fn save_table(
    table: &ReviewTable,
    project: &str,
    pdf_path: Option<&str>,
    dir: &Path,
) -> anyhow::Result<()> {
    let records = table
        .extract(project)
        .context("failed to collect reviewed requirements")?;
    let response = FileSaveSink::new(dir)
        .save(&records, pdf_path)
        .context("failed to save requirements")?;

    println!("{}", response.message.success());
    if let Some(reference) = response.highlighted_pdf_url {
        println!("Highlights: {reference}");
    }
    Ok(())
}
