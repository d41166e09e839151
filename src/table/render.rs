use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    domain::{RecordKey, RequirementRecord},
    table::{
        BodyRow, Column, Container, HeaderCell,
        selection::{capture, restore},
    },
};

/// How the view is refreshed after the dataset changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStrategy {
    /// Discard every row and build the table again.
    #[default]
    Rebuild,
    /// Keep rows whose record is still present and only build or drop the
    /// difference.
    Reconcile,
}

/// Counts of the row operations performed by [`reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Rows kept from the previous view.
    pub reused: usize,
    /// Rows built for records that had none.
    pub created: usize,
    /// Rows removed because their record is gone.
    pub dropped: usize,
}

/// Formats a confidence as a whole percentage, rounding half up.
///
/// ```
/// assert_eq!(reqgrid::table::format_confidence(0.873), "87%");
/// assert_eq!(reqgrid::table::format_confidence(1.0), "100%");
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_confidence(confidence: f64) -> String {
    let percentage = confidence.mul_add(100.0, 0.5).floor() as i64;
    format!("{percentage}%")
}

fn header() -> Vec<HeaderCell> {
    Column::ALL.into_iter().map(HeaderCell::new).collect()
}

/// Rebuilds the container from `records`.
///
/// The current selections are captured before the container is cleared and
/// restored onto the new rows by text. Selections for texts that no longer
/// appear are dropped.
#[instrument(level = "debug", skip_all, fields(records = records.len()))]
pub fn render(container: &mut Container, records: &[RequirementRecord]) {
    let snapshot = capture(container);
    rebuild_with(container, records, |row, record| {
        restore(row, &record.text, &snapshot);
    });
}

/// Brings the container in line with `records` by patching rows in place.
///
/// Rows are matched to records by identity and moved into dataset order,
/// keeping their selection. New records get fresh rows, restored by text from
/// the rows present before the patch.
#[instrument(level = "debug", skip_all, fields(records = records.len()))]
pub fn reconcile(container: &mut Container, records: &[RequirementRecord]) -> ReconcileStats {
    let snapshot = capture(container);
    reconcile_with(container, records, |row, record| {
        restore(row, &record.text, &snapshot);
    })
}

pub fn rebuild_with<F>(
    container: &mut Container,
    records: &[RequirementRecord],
    mut prepare: F,
) where
    F: FnMut(&mut BodyRow, &RequirementRecord),
{
    container.clear();
    container.set_header(header());

    for record in records {
        let mut row = BodyRow::from_record(record);
        prepare(&mut row, record);
        container.push_row(row);
    }
}

pub fn reconcile_with<F>(
    container: &mut Container,
    records: &[RequirementRecord],
    mut prepare: F,
) -> ReconcileStats
where
    F: FnMut(&mut BodyRow, &RequirementRecord),
{
    if container.header().is_empty() {
        container.set_header(header());
    }

    let mut existing: HashMap<RecordKey, VecDeque<BodyRow>> = HashMap::new();
    for row in container.take_rows() {
        existing.entry(row.key().clone()).or_default().push_back(row);
    }

    let mut stats = ReconcileStats::default();
    for record in records {
        let reused = existing
            .get_mut(&record.key())
            .and_then(VecDeque::pop_front);
        if let Some(row) = reused {
            stats.reused += 1;
            container.push_row(row);
            continue;
        }

        stats.created += 1;
        let mut row = BodyRow::from_record(record);
        prepare(&mut row, record);
        container.push_row(row);
    }

    stats.dropped = existing.values().map(VecDeque::len).sum();
    tracing::debug!(
        reused = stats.reused,
        created = stats.created,
        dropped = stats.dropped,
        "reconciled rows"
    );
    stats
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::{
        Classification,
        dataset::tests::{record, two_records},
    };

    #[test_case(0.873, "87%")]
    #[test_case(1.0, "100%")]
    #[test_case(0.0, "0%")]
    #[test_case(0.5, "50%")]
    #[test_case(0.125, "13%")]
    #[test_case(0.994, "99%")]
    fn confidence_is_a_rounded_percentage(confidence: f64, expected: &str) {
        assert_eq!(format_confidence(confidence), expected);
    }

    #[test]
    fn header_lists_every_column() {
        let mut container = Container::new();
        render(&mut container, &two_records());

        let labels: Vec<_> = container
            .header()
            .iter()
            .copied()
            .map(HeaderCell::label)
            .collect();
        assert_eq!(
            labels,
            [
                "Text",
                "AI Classification",
                "Confidence",
                "User Classification",
                "Delete"
            ]
        );
    }

    #[test]
    fn one_row_per_record_in_order() {
        let mut container = Container::new();
        render(&mut container, &two_records());

        let texts: Vec<_> = container.rows().iter().map(BodyRow::text).collect();
        assert_eq!(texts, ["A", "B"]);
        assert_eq!(container.rows()[1].confidence(), "90%");
        assert_eq!(container.rows()[1].ai_classification(), "NF - Security");
    }

    #[test]
    fn empty_dataset_renders_only_the_header() {
        let mut container = Container::new();
        render(&mut container, &two_records());
        render(&mut container, &[]);

        assert_eq!(container.header().len(), 5);
        assert!(container.rows().is_empty());
    }

    #[test]
    fn selections_survive_a_rebuild() {
        let mut container = Container::new();
        let mut records = two_records();
        render(&mut container, &records);
        container
            .row_mut(0)
            .unwrap()
            .selection
            .set(Classification::Functional);

        records.reverse();
        render(&mut container, &records);

        assert_eq!(container.rows()[1].text(), "A");
        assert_eq!(
            container.rows()[1].selection.value(),
            Classification::Functional
        );
        assert!(container.rows()[0].selection.value().is_placeholder());
    }

    #[test]
    fn selections_of_removed_rows_are_dropped() {
        let mut container = Container::new();
        render(&mut container, &two_records());
        container
            .row_mut(0)
            .unwrap()
            .selection
            .set(Classification::Legal);

        render(&mut container, &[record("B", 2, "NF - Security", 0.9)]);
        render(&mut container, &two_records());

        assert!(container.rows()[0].selection.value().is_placeholder());
    }

    #[test]
    fn reconcile_matches_rebuild() {
        let initial = vec![
            record("A", 1, "Functional", 0.5),
            record("B", 2, "NF - Security", 0.9),
            record("C", 3, "NF - Legal", 0.1),
        ];
        let next = vec![
            record("C", 3, "NF - Legal", 0.1),
            record("A", 1, "Functional", 0.5),
            record("D", 4, "Functional", 0.3),
        ];

        let mut rebuilt = Container::new();
        render(&mut rebuilt, &initial);
        rebuilt.row_mut(0).unwrap().selection.set(Classification::Portability);
        let mut patched = rebuilt.clone();

        render(&mut rebuilt, &next);
        let stats = reconcile(&mut patched, &next);

        assert_eq!(rebuilt, patched);
        assert_eq!(
            stats,
            ReconcileStats {
                reused: 2,
                created: 1,
                dropped: 1
            }
        );
    }

    #[test]
    fn reconcile_builds_header_on_first_use() {
        let mut container = Container::new();
        let stats = reconcile(&mut container, &two_records());

        assert_eq!(container.header().len(), 5);
        assert_eq!(stats.created, 2);
    }
}
