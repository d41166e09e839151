use std::{fmt, num::NonZeroU32};

use serde::{Deserialize, Serialize};

/// One classified sentence extracted from an uploaded document.
///
/// Records are created in bulk when classification results are ingested and
/// are never edited afterwards; the only mutation the dataset allows is
/// removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementRecord {
    /// The extracted requirement sentence.
    pub text: String,
    /// Category label assigned by the classification model.
    pub ai_classification: String,
    /// Model confidence, nominally in `[0, 1]`.
    pub confidence: f64,
    /// Source sentence fragment the requirement was extracted from.
    pub original_text: String,
    /// Similarity between `text` and `original_text`.
    pub match_score: f64,
    /// Source document page number.
    pub page: NonZeroU32,
}

impl RequirementRecord {
    /// The identity of this record within a dataset.
    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.text.clone(), self.page)
    }

    /// Returns `true` if this record has the given identity.
    #[must_use]
    pub fn matches(&self, text: &str, page: NonZeroU32) -> bool {
        self.text == text && self.page == page
    }
}

/// The identity of a record: its text together with its page.
///
/// Array positions shift whenever the dataset is sorted, so rows are always
/// matched back to records through this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    /// The requirement text.
    pub text: String,
    /// The source page.
    pub page: NonZeroU32,
}

impl RecordKey {
    /// Creates a new key.
    #[must_use]
    pub const fn new(text: String, page: NonZeroU32) -> Self {
        Self { text, page }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (page {})", self.text, self.page)
    }
}
