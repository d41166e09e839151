use std::{cmp::Ordering, fmt};

use tracing::instrument;

use crate::domain::RequirementRecord;

/// Columns the table can be sorted by.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SortColumn {
    /// Case-sensitive lexicographic order of the model's label.
    AiClassification,
    /// Numeric order of the model's confidence.
    Confidence,
}

impl SortColumn {
    /// The key used to identify the column, e.g. in markup.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::AiClassification => "aiClassification",
            Self::Confidence => "confidence",
        }
    }

    fn compare(self, a: &RequirementRecord, b: &RequirementRecord) -> Ordering {
        match self {
            Self::AiClassification => a.ai_classification.cmp(&b.ai_classification),
            Self::Confidence => a.confidence.total_cmp(&b.confidence),
        }
    }
}

/// Direction of a sort.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        })
    }
}

/// The direction each sortable column will use on its next activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    ai_classification: SortDirection,
    confidence: SortDirection,
}

impl SortState {
    /// The direction the next sort on `column` will use.
    #[must_use]
    pub const fn direction(self, column: SortColumn) -> SortDirection {
        match column {
            SortColumn::AiClassification => self.ai_classification,
            SortColumn::Confidence => self.confidence,
        }
    }

    const fn slot(&mut self, column: SortColumn) -> &mut SortDirection {
        match column {
            SortColumn::AiClassification => &mut self.ai_classification,
            SortColumn::Confidence => &mut self.confidence,
        }
    }

    /// Reorders `records` in place by `column`, then flips the stored
    /// direction for that column.
    ///
    /// Returns the direction that was applied. Ties keep their relative order;
    /// there is no secondary key.
    #[instrument(level = "debug", skip(self, records), fields(count = records.len()))]
    pub fn sort_by(
        &mut self,
        column: SortColumn,
        records: &mut [RequirementRecord],
    ) -> SortDirection {
        let slot = self.slot(column);
        let direction = *slot;

        match direction {
            SortDirection::Ascending => records.sort_by(|a, b| column.compare(a, b)),
            SortDirection::Descending => records.sort_by(|a, b| column.compare(b, a)),
        }

        let next = direction.flipped();
        *slot = next;
        tracing::debug!(%direction, %next, "sorted");
        direction
    }
}
