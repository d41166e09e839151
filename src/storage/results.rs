use std::{
    fs::File,
    io::{self, BufReader, Read},
    num::NonZeroU32,
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::RequirementRecord;

/// One classified sentence as returned by the classification backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The extracted requirement sentence.
    pub requirement: String,
    /// The model's label.
    #[serde(rename = "type")]
    pub kind: String,
    /// The model's confidence.
    pub confidence: f64,
    /// The source fragment the requirement was matched to.
    #[serde(default)]
    pub original_text: String,
    /// Similarity between the requirement and its source fragment.
    #[serde(default)]
    pub match_score: f64,
    /// The source page.
    pub page: NonZeroU32,
}

impl From<ClassificationResult> for RequirementRecord {
    fn from(result: ClassificationResult) -> Self {
        Self {
            text: result.requirement,
            ai_classification: result.kind,
            confidence: result.confidence,
            original_text: result.original_text,
            match_score: result.match_score,
            page: result.page,
        }
    }
}

/// The response of the classification backend for one uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    /// Classified sentences, in document order.
    pub results: Vec<ClassificationResult>,
    /// Where the backend stored the uploaded PDF.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<String>,
}

/// Failed to read a classification response.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read classification results: {0}")]
    Io(#[from] io::Error),
    /// The content is not a valid classification response.
    #[error("failed to parse classification results: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClassificationResponse {
    /// Reads a response from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Reads a response from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid JSON of the expected shape.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let response: Self = serde_json::from_reader(reader)?;
        tracing::info!("Loaded {} classification results", response.results.len());
        Ok(response)
    }

    /// Maps the results one-to-one onto requirement records, in order.
    #[must_use]
    pub fn into_records(self) -> Vec<RequirementRecord> {
        self.results
            .into_iter()
            .inspect(|result| {
                if !(0.0..=1.0).contains(&result.confidence) {
                    tracing::warn!(
                        requirement = %result.requirement,
                        confidence = result.confidence,
                        "confidence outside [0, 1]"
                    );
                }
            })
            .map(RequirementRecord::from)
            .collect()
    }
}
