use std::fmt::Write as _;

use chrono::{Local, NaiveDateTime};
use tracing::instrument;

use crate::table::ExportRecord;

/// The columns written to a CSV export, in order.
pub const CSV_FIELDS: [&str; 4] = [
    "text",
    "classification_ai",
    "confidence_ai",
    "classification_user",
];

const DEFAULT_BASE_NAME: &str = "requirements";
const BOM: &str = "\u{feff}";

/// The name a download is offered under: the uploaded file name without its
/// final extension.
///
/// Falls back to `requirements` when no file name is known.
#[must_use]
pub fn download_base_name(file_name: Option<&str>) -> String {
    file_name
        .filter(|name| !name.is_empty())
        .map_or_else(
            || DEFAULT_BASE_NAME.to_string(),
            |name| strip_extension(name).to_string(),
        )
}

/// Drops the text after the last `.`, unless it is empty or crosses a
/// directory separator.
fn strip_extension(name: &str) -> &str {
    name.rsplit_once('.')
        .filter(|(_, extension)| !extension.is_empty() && !extension.contains('/'))
        .map_or(name, |(stem, _)| stem)
}

/// A rendered CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// Suggested file name, e.g. `spec_20240102_030405.csv`.
    pub filename: String,
    /// The encoded file content.
    pub bytes: Vec<u8>,
}

/// Turns export records into a CSV file.
#[derive(Debug, Clone, Copy)]
pub struct CsvExporter {
    bom: bool,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self { bom: true }
    }
}

impl CsvExporter {
    /// Creates an exporter; `bom` prefixes the output with a UTF-8 byte order
    /// mark.
    #[must_use]
    pub const fn new(bom: bool) -> Self {
        Self { bom }
    }

    /// Renders `records`, naming the file after `filename` and the current
    /// local time.
    #[must_use]
    pub fn export(self, records: &[ExportRecord], filename: &str) -> CsvExport {
        self.export_at(records, filename, Local::now().naive_local())
    }

    /// Renders `records`, naming the file after `filename` and `timestamp`.
    #[instrument(level = "debug", skip(self, records), fields(count = records.len()))]
    #[must_use]
    pub fn export_at(
        self,
        records: &[ExportRecord],
        filename: &str,
        timestamp: NaiveDateTime,
    ) -> CsvExport {
        let base = match filename.replace('"', "") {
            base if base.is_empty() => DEFAULT_BASE_NAME.to_string(),
            base => base,
        };

        let mut content = String::new();
        if self.bom {
            content.push_str(BOM);
        }
        content.push_str(&CSV_FIELDS.join(","));
        content.push_str("\r\n");

        for record in records {
            let _ = write!(
                content,
                "{},{},{},{}\r\n",
                csv_escape(&record.text),
                csv_escape(&record.classification_ai),
                float_repr(record.confidence_ai),
                csv_escape(record.classification_user.label()),
            );
        }

        CsvExport {
            filename: format!("{base}_{}.csv", timestamp.format("%Y%m%d_%H%M%S")),
            bytes: content.into_bytes(),
        }
    }
}

/// Writes a float the way the persistence layer expects: whole numbers keep
/// a trailing `.0`.
fn float_repr(value: f64) -> String {
    format!("{value:?}")
}

/// Quotes a CSV field if it contains a delimiter, quote or line break.
#[must_use]
pub fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}
