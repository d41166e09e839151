use std::{
    num::{NonZeroU32, NonZeroUsize},
    path::{Path, PathBuf},
    time::Duration,
};

mod export;
mod review;
mod save;
mod show;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use export::Export;
use indicatif::ProgressBar;
use reqgrid::{
    Classification, ClassificationResponse, Config, RecordKey, ReviewTable, TableEvent,
    table::Column,
};
use review::Review;
use save::Save;
use show::Show;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file
    #[arg(short, long, default_value = "req-review.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = Config::load_or_default(&self.config);
        self.command.run(&config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Print the table after applying edits
    Show(Show),

    /// Export the reviewed requirements as CSV
    Export(Export),

    /// Save the reviewed requirements and their highlight manifest
    Save(Save),

    /// Review requirements interactively
    Review(Review),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Show(command) => command.run(config)?,
            Self::Export(command) => command.run(config)?,
            Self::Save(command) => command.run(config)?,
            Self::Review(command) => command.run(config)?,
        }
        Ok(())
    }
}

/// Columns that can be sorted from the command line.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
enum SortArg {
    AiClassification,
    Confidence,
}

impl SortArg {
    const fn column(self) -> Column {
        match self {
            Self::AiClassification => Column::AiClassification,
            Self::Confidence => Column::Confidence,
        }
    }
}

/// Edits applied to the table before any output, in the order: sorts,
/// deletions, selections.
#[derive(Debug, clap::Args)]
struct Edits {
    /// Click a column header; repeat to toggle the direction
    #[arg(long = "sort", value_enum, value_name = "COL")]
    sorts: Vec<SortArg>,

    /// Delete the requirement with this text on this page
    #[arg(long = "delete", value_parser = parse_key, value_name = "TEXT@PAGE")]
    deletes: Vec<RecordKey>,

    /// Set the user classification of a row (1-based, after sorts and
    /// deletions)
    #[arg(long = "select", value_parser = parse_selection, value_name = "ROW=LABEL")]
    selections: Vec<(NonZeroUsize, Classification)>,
}

impl Edits {
    fn apply(&self, table: &mut ReviewTable) -> anyhow::Result<()> {
        for sort in &self.sorts {
            table.handle(TableEvent::HeaderActivated(sort.column()))?;
        }

        for key in &self.deletes {
            if table.remove(&key.text, key.page).is_none() {
                tracing::warn!("No requirement {key} to delete");
            }
        }

        for (row, value) in &self.selections {
            table
                .handle(TableEvent::SelectionChanged {
                    row: row.get() - 1,
                    value: *value,
                })
                .with_context(|| format!("cannot classify row {row}"))?;
        }
        Ok(())
    }
}

fn parse_key(s: &str) -> Result<RecordKey, String> {
    let (text, page) = s
        .rsplit_once('@')
        .ok_or_else(|| format!("expected TEXT@PAGE, got '{s}'"))?;
    let page: NonZeroU32 = page
        .parse()
        .map_err(|e| format!("invalid page '{page}': {e}"))?;
    Ok(RecordKey::new(text.to_string(), page))
}

fn parse_selection(s: &str) -> Result<(NonZeroUsize, Classification), String> {
    let (row, label) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ROW=LABEL, got '{s}'"))?;
    let row: NonZeroUsize = row
        .trim()
        .parse()
        .map_err(|e| format!("invalid row '{row}': {e}"))?;
    let label = label.parse().map_err(|e| format!("{e}"))?;
    Ok((row, label))
}

/// The classification results to review and the edits to apply to them.
#[derive(Debug, clap::Args)]
struct Session {
    /// Classification results (JSON) to review
    input: PathBuf,

    /// Project recorded with each requirement (default: the uploaded file
    /// name)
    #[arg(long)]
    project: Option<String>,

    #[command(flatten)]
    edits: Edits,
}

/// A table ready for review.
struct Loaded {
    table: ReviewTable,
    pdf_path: Option<String>,
    project: String,
}

impl Session {
    #[instrument(level = "debug", skip_all, fields(input = %self.input.display()))]
    fn open(&self, config: &Config) -> anyhow::Result<Loaded> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_message("Analyzing...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        let response = ClassificationResponse::load(&self.input);
        spinner.finish_and_clear();

        let response = response
            .with_context(|| format!("failed to load {}", self.input.display()))?;

        let pdf_path = response.pdf_path.clone();
        let project = self
            .project
            .clone()
            .or_else(|| pdf_path.as_deref().and_then(file_name))
            .or_else(|| file_name(&self.input))
            .unwrap_or_default();

        let mut table = ReviewTable::new(response.into_records(), config.render_strategy)
            .with_context(|| format!("cannot review {}", self.input.display()))?;
        self.edits.apply(&mut table)?;

        Ok(Loaded {
            table,
            pdf_path,
            project,
        })
    }
}

fn file_name(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
