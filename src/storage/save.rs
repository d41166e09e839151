use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufWriter, Write},
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{domain::Classification, table::ExportRecord};

/// Name of the file holding the saved requirements.
pub const REQUIREMENTS_FILE: &str = "requirements.json";

/// Name of the file describing which passages to highlight per page.
pub const HIGHLIGHTS_FILE: &str = "highlights.json";

const SAVED_MESSAGE: &str = "Requirements saved successfully";

/// The reply of a save collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    /// A message to show the reviewer.
    pub message: String,
    /// Reference to a downloadable file with the saved requirements
    /// highlighted, when one was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted_pdf_url: Option<String>,
}

/// Failed to save the reviewed requirements.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// No source document or no records were supplied.
    #[error("Missing PDF path or requirements")]
    MissingInput,
    /// The payload could not be written.
    #[error("failed to write saved requirements: {0}")]
    Io(#[from] io::Error),
    /// The payload could not be encoded.
    #[error("failed to encode saved requirements: {0}")]
    Json(#[from] serde_json::Error),
}

/// Receives the reviewed requirements for persistence.
pub trait SaveSink {
    /// Saves `requirements`, reviewed against the document at `pdf_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is incomplete or cannot be persisted.
    fn save(
        &self,
        requirements: &[ExportRecord],
        pdf_path: Option<&str>,
    ) -> Result<SaveResponse, SaveError>;
}

/// A requirement as the persistence layer stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRequirement {
    /// The requirement text.
    pub text: String,
    /// The model's label.
    pub classification_ai: String,
    /// The model's confidence.
    pub confidence_ai: f64,
    /// The reviewer's label; empty when none was chosen.
    pub classification_user: String,
    /// The project the requirement belongs to.
    pub project: String,
    /// The source fragment.
    pub original_text: String,
    /// Similarity between the text and its source fragment.
    pub match_score: f64,
    /// The source page.
    pub page: NonZeroU32,
}

impl From<&ExportRecord> for PersistedRequirement {
    fn from(record: &ExportRecord) -> Self {
        Self {
            text: record.text.clone(),
            classification_ai: record.classification_ai.clone(),
            confidence_ai: record.confidence_ai,
            classification_user: record.classification_user.persisted_label().to_string(),
            project: record.project.clone(),
            original_text: record.original_text.clone(),
            match_score: record.match_score,
            page: record.page,
        }
    }
}

/// Groups records by page for highlighting, skipping those the reviewer
/// marked out of scope.
#[must_use]
pub fn group_by_page(records: &[ExportRecord]) -> BTreeMap<NonZeroU32, Vec<&ExportRecord>> {
    let mut grouped: BTreeMap<NonZeroU32, Vec<&ExportRecord>> = BTreeMap::new();
    for record in records {
        if record.classification_user == Classification::OutOfScope {
            continue;
        }
        grouped.entry(record.page).or_default().push(record);
    }
    grouped
}

#[derive(Debug, Serialize)]
struct Highlight<'a> {
    text: &'a str,
    original_text: &'a str,
    classification_user: &'a str,
}

#[derive(Debug, Serialize)]
struct HighlightManifest<'a> {
    pdf_path: &'a str,
    pages: BTreeMap<NonZeroU32, Vec<Highlight<'a>>>,
}

/// Saves reviewed requirements as JSON files in a directory.
///
/// The requirements go to [`REQUIREMENTS_FILE`] and a page-grouped highlight
/// manifest to [`HIGHLIGHTS_FILE`]; the manifest path is returned as the
/// downloadable reference.
#[derive(Debug, Clone)]
pub struct FileSaveSink {
    dir: PathBuf,
}

impl FileSaveSink {
    /// Creates a sink writing into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, SaveError> {
        let path = self.dir.join(name);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        tracing::debug!("Wrote {}", path.display());
        Ok(path)
    }
}

impl SaveSink for FileSaveSink {
    #[instrument(level = "debug", skip(self, requirements), fields(count = requirements.len()))]
    fn save(
        &self,
        requirements: &[ExportRecord],
        pdf_path: Option<&str>,
    ) -> Result<SaveResponse, SaveError> {
        let pdf_path = pdf_path.filter(|path| !path.is_empty());
        let Some(pdf_path) = pdf_path.filter(|_| !requirements.is_empty()) else {
            return Err(SaveError::MissingInput);
        };

        std::fs::create_dir_all(&self.dir)?;

        let persisted: Vec<PersistedRequirement> =
            requirements.iter().map(PersistedRequirement::from).collect();
        self.write_json(REQUIREMENTS_FILE, &persisted)?;

        let pages = group_by_page(requirements)
            .into_iter()
            .map(|(page, records)| {
                let highlights = records
                    .into_iter()
                    .map(|record| Highlight {
                        text: &record.text,
                        original_text: &record.original_text,
                        classification_user: record.classification_user.label(),
                    })
                    .collect();
                (page, highlights)
            })
            .collect();
        let manifest = self.write_json(HIGHLIGHTS_FILE, &HighlightManifest { pdf_path, pages })?;

        tracing::info!("Saved {} requirements", requirements.len());
        Ok(SaveResponse {
            message: SAVED_MESSAGE.to_string(),
            highlighted_pdf_url: Some(manifest.display().to_string()),
        })
    }
}
