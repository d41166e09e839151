use std::fmt;

use anyhow::Context;
use clap::ValueEnum;
use reqgrid::{
    Config, ReviewTable,
    storage::csv::csv_escape,
    table::{Column, HeaderCell},
};
use tracing::instrument;

use crate::cli::{
    Loaded, Session,
    terminal::{self, Colorize},
};

/// Command arguments for `req-review show`.
#[derive(Debug, clap::Parser)]
pub struct Show {
    #[command(flatten)]
    session: Session,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
    Html,
}

impl Show {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let Loaded { table, project, .. } = self.session.open(config)?;

        match self.output {
            OutputFormat::Table => print_table(&table),
            OutputFormat::Json => {
                let records = table
                    .extract(&project)
                    .context("failed to collect reviewed requirements")?;
                serde_json::to_writer_pretty(std::io::stdout(), &records)
                    .context("failed to render json output")?;
                println!();
            }
            OutputFormat::Csv => print_csv(&table),
            OutputFormat::Html => print!("{}", table.container().to_html()),
        }
        Ok(())
    }
}

/// Visible columns: the delete control has no textual value.
fn visible_columns(table: &ReviewTable) -> Vec<Column> {
    table
        .container()
        .header()
        .iter()
        .copied()
        .map(HeaderCell::column)
        .filter(|column| *column != Column::Delete)
        .collect()
}

/// Prints the table with row numbers, aligned to the terminal.
pub fn print_table(table: &ReviewTable) {
    let container = table.container();
    if container.rows().is_empty() {
        println!("{}", "No requirements to review.".dim());
        return;
    }

    let columns = visible_columns(table);
    let mut headers = vec!["#".to_string()];
    headers.extend(columns.iter().map(|column| column.header().to_string()));

    let mut data: Vec<Vec<String>> = container
        .rows()
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut values = vec![(idx + 1).to_string()];
            values.extend(columns.iter().map(|column| row.cell(*column).to_string()));
            values
        })
        .collect();

    // Determine column widths for alignment.
    let mut widths = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect::<Vec<_>>();

    let text_idx = 1;
    let others: usize = widths
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != text_idx)
        .map(|(_, width)| width + 2)
        .sum();
    if let Some(budget) = terminal::text_budget(others + 2) {
        if widths[text_idx] > budget {
            widths[text_idx] = budget;
            for row in &mut data {
                row[text_idx] = terminal::truncate(&row[text_idx], budget);
            }
        }
    }

    for (header, width) in headers.iter().zip(&widths) {
        print!("{}  ", format!("{header:<width$}").dim());
    }
    println!();
    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for (row, values) in container.rows().iter().zip(data) {
        let confidence = table
            .dataset()
            .get(row.key())
            .map_or(0.0, |record| record.confidence);
        for (idx, value) in values.iter().enumerate() {
            let padded = format!("{value:<width$}", width = widths[idx]);
            let styled = match columns.get(idx.wrapping_sub(1)) {
                Some(Column::Confidence) => terminal::confidence(&padded, confidence),
                Some(Column::UserClassification) if row.selection.value().is_placeholder() => {
                    padded.dim()
                }
                _ => padded,
            };
            print!("{styled}  ");
        }
        println!();
    }
}

fn print_csv(table: &ReviewTable) {
    let columns = visible_columns(table);
    let header_line = columns
        .iter()
        .map(|column| csv_escape(column.header()))
        .collect::<Vec<_>>()
        .join(",");
    println!("{header_line}");

    for row in table.container().rows() {
        let values = columns
            .iter()
            .map(|column| csv_escape(row.cell(*column)))
            .collect::<Vec<_>>()
            .join(",");
        println!("{values}");
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Html => "html",
        })
    }
}
