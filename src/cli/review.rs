use std::io::IsTerminal;

use anyhow::Context;
use dialoguer::Select;
use reqgrid::{Classification, Config, ReviewTable, TableEvent, table::Column};
use tracing::instrument;

use crate::cli::{
    Loaded, Session,
    export::write_csv,
    save::save_table,
    show::print_table,
    terminal::{self, Colorize},
};

/// Command arguments for `req-review review`.
#[derive(Debug, clap::Parser)]
pub struct Review {
    #[command(flatten)]
    session: Session,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Action {
    SortClassification,
    SortConfidence,
    Classify,
    Delete,
    Save,
    Export,
    Quit,
}

impl Action {
    const ALL: [Self; 7] = [
        Self::SortClassification,
        Self::SortConfidence,
        Self::Classify,
        Self::Delete,
        Self::Save,
        Self::Export,
        Self::Quit,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::SortClassification => "Sort by AI classification",
            Self::SortConfidence => "Sort by confidence",
            Self::Classify => "Classify a requirement",
            Self::Delete => "Delete a requirement",
            Self::Save => "Save",
            Self::Export => "Export CSV",
            Self::Quit => "Quit",
        }
    }
}

impl Review {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        if !std::io::stdin().is_terminal() {
            anyhow::bail!("review needs an interactive terminal; use `show` or `export` instead");
        }

        let Loaded {
            mut table,
            pdf_path,
            project,
        } = self.session.open(config)?;
        let labels: Vec<&str> = Action::ALL.into_iter().map(Action::label).collect();

        loop {
            print_table(&table);
            println!();

            let choice = Select::new()
                .with_prompt("Action")
                .items(labels.as_slice())
                .default(0)
                .interact()?;

            let result = match Action::ALL[choice] {
                Action::SortClassification => table
                    .handle(TableEvent::HeaderActivated(Column::AiClassification))
                    .map_err(anyhow::Error::from),
                Action::SortConfidence => table
                    .handle(TableEvent::HeaderActivated(Column::Confidence))
                    .map_err(anyhow::Error::from),
                Action::Classify => classify(&mut table),
                Action::Delete => delete(&mut table),
                Action::Save => {
                    save_table(&table, &project, pdf_path.as_deref(), &config.output_dir)
                }
                Action::Export => {
                    write_csv(&table, &project, config.csv_bom, &config.output_dir).map(|_| ())
                }
                Action::Quit => break,
            };

            // Failures are reported and leave the table as it was.
            if let Err(e) = result {
                tracing::debug!("{e:?}");
                println!("{}", format!("{e:#}").warning());
            }
            println!();
        }
        Ok(())
    }
}

fn pick_row(table: &ReviewTable, prompt: &str) -> anyhow::Result<Option<usize>> {
    let rows = table.container().rows();
    if rows.is_empty() {
        println!("{}", "No requirements left.".dim());
        return Ok(None);
    }

    let width = terminal::terminal_width().map_or(80, usize::from).saturating_sub(8);
    let items: Vec<String> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| format!("{:>3}. {}", idx + 1, terminal::truncate(row.text(), width)))
        .collect();

    let choice = Select::new()
        .with_prompt(prompt)
        .items(items.as_slice())
        .default(0)
        .interact_opt()
        .context("failed to read selection")?;
    Ok(choice)
}

fn classify(table: &mut ReviewTable) -> anyhow::Result<()> {
    let Some(row) = pick_row(table, "Requirement to classify")? else {
        return Ok(());
    };
    let current = table
        .container()
        .row(row)
        .map_or(Classification::PLACEHOLDER, |row| row.selection.value());

    let labels: Vec<&str> = Classification::ALL.into_iter().map(Classification::label).collect();
    let default = Classification::ALL
        .iter()
        .position(|c| *c == current)
        .unwrap_or(0);
    let choice = Select::new()
        .with_prompt("Classification")
        .items(labels.as_slice())
        .default(default)
        .interact()?;

    table.handle(TableEvent::SelectionChanged {
        row,
        value: Classification::ALL[choice],
    })?;
    Ok(())
}

fn delete(table: &mut ReviewTable) -> anyhow::Result<()> {
    if let Some(row) = pick_row(table, "Requirement to delete")? {
        table.handle(TableEvent::DeleteActivated(row))?;
    }
    Ok(())
}
