use std::{collections::HashMap, num::NonZeroU32};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    domain::{Classification, Dataset, RecordKey, RequirementRecord},
    table::Container,
};

/// The normalized record sent to the save and CSV export collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// The requirement text.
    pub text: String,
    /// The model's label.
    pub classification_ai: String,
    /// The model's confidence.
    pub confidence_ai: f64,
    /// The reviewer's label, or the placeholder if none was chosen.
    #[serde(default)]
    pub classification_user: Classification,
    /// The project, i.e. the uploaded file name.
    pub project: String,
    /// The source fragment the requirement was extracted from.
    pub original_text: String,
    /// Similarity between `text` and `original_text`.
    pub match_score: f64,
    /// The source page.
    pub page: NonZeroU32,
}

/// The rendered table and the dataset have fallen out of step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The number of rows differs from the number of records.
    #[error("table shows {rows} rows but the dataset holds {records} records")]
    RowCountMismatch {
        /// Rendered rows.
        rows: usize,
        /// Records in the dataset.
        records: usize,
    },
    /// A rendered row refers to a record that is not in the dataset.
    #[error("row for {0} has no record in the dataset")]
    UnknownRow(RecordKey),
    /// More than one record shares the identity of a rendered row.
    #[error("row for {0} matches more than one record in the dataset")]
    AmbiguousRow(RecordKey),
}

/// Builds one export record per rendered row, in rendered order.
///
/// Each row is matched to its record by identity, so the result does not
/// depend on the dataset and the view sharing an order.
///
/// # Errors
///
/// Returns an error if the row count differs from the dataset length, or if
/// a row refers to a record the dataset does not hold exactly once.
#[instrument(level = "debug", skip(container, dataset))]
pub fn extract(
    container: &Container,
    dataset: &Dataset,
    project: &str,
) -> Result<Vec<ExportRecord>, ExtractError> {
    let rows = container.rows();
    if rows.len() != dataset.len() {
        return Err(ExtractError::RowCountMismatch {
            rows: rows.len(),
            records: dataset.len(),
        });
    }

    let mut by_key: HashMap<(&str, NonZeroU32), (&RequirementRecord, usize)> =
        HashMap::with_capacity(dataset.len());
    for record in dataset.current() {
        by_key
            .entry((record.text.as_str(), record.page))
            .and_modify(|(_, count)| *count += 1)
            .or_insert((record, 1));
    }

    rows.iter()
        .map(|row| {
            let key = row.key();
            let record = match by_key.get(&(key.text.as_str(), key.page)) {
                Some(&(record, 1)) => record,
                Some(_) => return Err(ExtractError::AmbiguousRow(key.clone())),
                None => return Err(ExtractError::UnknownRow(key.clone())),
            };
            Ok(ExportRecord {
                text: record.text.clone(),
                classification_ai: record.ai_classification.clone(),
                confidence_ai: record.confidence,
                classification_user: row.selection.value(),
                project: project.to_string(),
                original_text: record.original_text.clone(),
                match_score: record.match_score,
                page: record.page,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{
        domain::dataset::tests::{record, two_records},
        table::render,
    };

    #[test]
    fn untouched_table_exports_placeholders() {
        let dataset = Dataset::new(two_records());
        let mut container = Container::new();
        render(&mut container, dataset.current());

        let exported = extract(&container, &dataset, "spec.pdf").unwrap();

        assert_eq!(exported.len(), 2);
        assert!(
            exported
                .iter()
                .all(|r| r.classification_user == Classification::PLACEHOLDER)
        );
    }

    #[test]
    fn export_merges_record_fields_and_selection() {
        let dataset = Dataset::new(two_records());
        let mut container = Container::new();
        render(&mut container, dataset.current());
        container
            .row_mut(1)
            .unwrap()
            .selection
            .set(Classification::Security);

        let exported = extract(&container, &dataset, "spec.pdf").unwrap();

        let b = &exported[1];
        assert_eq!(b.text, "B");
        assert_eq!(b.classification_ai, "NF - Security");
        assert_eq!(b.confidence_ai, 0.9);
        assert_eq!(b.classification_user, Classification::Security);
        assert_eq!(b.project, "spec.pdf");
        assert_eq!(b.original_text, "B (source)");
        assert_eq!(b.page.get(), 2);
    }

    #[test]
    fn rows_are_matched_by_key_not_position() {
        let mut dataset = Dataset::new(two_records());
        let mut container = Container::new();
        render(&mut container, dataset.current());
        dataset.records_mut().reverse();

        let exported = extract(&container, &dataset, "p").unwrap();

        assert_eq!(exported[0].text, "A");
        assert_eq!(exported[0].confidence_ai, 0.5);
        assert_eq!(exported[1].text, "B");
    }

    #[test]
    fn row_count_mismatch_is_reported() {
        let dataset = Dataset::new(two_records());
        let container = Container::new();

        let error = extract(&container, &dataset, "p").unwrap_err();

        assert_eq!(
            error,
            ExtractError::RowCountMismatch {
                rows: 0,
                records: 2
            }
        );
    }

    #[test]
    fn unknown_row_is_reported() {
        let mut container = Container::new();
        render(&mut container, &two_records());
        let dataset = Dataset::new(vec![
            record("A", 1, "Functional", 0.5),
            record("C", 3, "Functional", 0.5),
        ]);

        let error = extract(&container, &dataset, "p").unwrap_err();

        assert!(matches!(error, ExtractError::UnknownRow(key) if key.text == "B"));
    }

    #[test]
    fn shared_identity_is_reported_instead_of_exporting_the_wrong_record() {
        let dataset = Dataset::new(vec![
            record("A", 1, "Functional", 0.2),
            record("A", 1, "NF - Legal", 0.8),
        ]);
        let mut container = Container::new();
        render(&mut container, dataset.current());

        let error = extract(&container, &dataset, "p").unwrap_err();

        assert!(matches!(
            error,
            ExtractError::AmbiguousRow(key) if key.text == "A" && key.page.get() == 1
        ));
    }
}
