use std::{collections::HashMap, num::NonZeroU32};

use tracing::instrument;

use crate::{
    domain::{Classification, Dataset, RecordKey, RequirementRecord},
    table::{
        BodyRow, Column, Container, ExportRecord, ExtractError, RenderStrategy, SortColumn,
        SortDirection, SortState, extract,
        render::{rebuild_with, reconcile_with},
    },
};

/// A user interaction with the rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
    /// A header cell was clicked.
    HeaderActivated(Column),
    /// The delete control of the row at this position was clicked.
    DeleteActivated(usize),
    /// The selection control of a row changed.
    SelectionChanged {
        /// Position of the row.
        row: usize,
        /// The newly selected label.
        value: Classification,
    },
}

/// An event referred to a row that is not rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no row at position {0}")]
pub struct NoSuchRow(pub usize);

/// Two records share a text and page, so rows could not be told apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("more than one record for {0}")]
pub struct DuplicateRecord(pub RecordKey);

/// The review table: the dataset together with everything derived from it.
///
/// One instance is built per set of classification results and discarded
/// when new results arrive. Every operation finishes its mutation and the
/// following refresh before it returns.
#[derive(Debug, Clone, Default)]
pub struct ReviewTable {
    dataset: Dataset,
    sort: SortState,
    selections: HashMap<RecordKey, Classification>,
    container: Container,
    strategy: RenderStrategy,
}

impl ReviewTable {
    /// Builds and renders a table for the given records.
    ///
    /// # Errors
    ///
    /// Returns an error if two records share a text and page.
    pub fn new(
        records: Vec<RequirementRecord>,
        strategy: RenderStrategy,
    ) -> Result<Self, DuplicateRecord> {
        let mut table = Self {
            strategy,
            ..Self::default()
        };
        table.ingest(records)?;
        Ok(table)
    }

    /// Replaces the dataset, forgetting prior sort directions and selections.
    ///
    /// # Errors
    ///
    /// Returns an error if two records share a text and page. The table is
    /// left as it was.
    #[instrument(level = "debug", skip_all, fields(count = records.len()))]
    pub fn ingest(&mut self, records: Vec<RequirementRecord>) -> Result<(), DuplicateRecord> {
        if let Some(key) = Dataset::find_duplicate(&records) {
            tracing::warn!(%key, "rejecting records with a repeated identity");
            return Err(DuplicateRecord(key));
        }
        self.dataset.ingest(records);
        self.sort = SortState::default();
        self.selections.clear();
        self.container.clear();
        self.refresh();
        Ok(())
    }

    /// Sorts by `column` and refreshes the view.
    ///
    /// Returns the direction that was applied.
    #[instrument(level = "debug", skip(self))]
    pub fn sort_by(&mut self, column: SortColumn) -> SortDirection {
        let direction = self.sort.sort_by(column, self.dataset.records_mut());
        self.refresh();
        direction
    }

    /// Removes the first record with the given text and page, then
    /// refreshes the view.
    ///
    /// Removing a record that does not exist changes nothing.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, text: &str, page: NonZeroU32) -> Option<RequirementRecord> {
        let removed = self.dataset.remove(text, page)?;
        let dataset = &self.dataset;
        self.selections.retain(|key, _| dataset.contains(key));
        self.refresh();
        Some(removed)
    }

    /// Sets the reviewer's classification of the row at `row`.
    ///
    /// # Errors
    ///
    /// Returns an error if no row is rendered at that position.
    #[instrument(level = "debug", skip(self))]
    pub fn select(&mut self, row: usize, value: Classification) -> Result<(), NoSuchRow> {
        let rendered = self.container.row_mut(row).ok_or(NoSuchRow(row))?;
        rendered.selection.set(value);
        let key = rendered.key().clone();

        if value.is_placeholder() {
            self.selections.remove(&key);
        } else {
            self.selections.insert(key, value);
        }
        Ok(())
    }

    /// Dispatches a user interaction.
    ///
    /// Activating an inert header does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the event refers to a row that is not rendered.
    pub fn handle(&mut self, event: TableEvent) -> Result<(), NoSuchRow> {
        match event {
            TableEvent::HeaderActivated(column) => {
                if let Some(sort) = column.sort_column() {
                    self.sort_by(sort);
                }
            }
            TableEvent::DeleteActivated(row) => {
                let key = self.container.row(row).ok_or(NoSuchRow(row))?.key().clone();
                self.remove(&key.text, key.page);
            }
            TableEvent::SelectionChanged { row, value } => self.select(row, value)?,
        }
        Ok(())
    }

    /// Builds the export payload from the current view.
    ///
    /// # Errors
    ///
    /// Returns an error if the view and the dataset are out of step.
    pub fn extract(&self, project: &str) -> Result<Vec<ExportRecord>, ExtractError> {
        extract(&self.container, &self.dataset, project)
    }

    /// The canonical dataset.
    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The rendered view.
    #[must_use]
    pub const fn container(&self) -> &Container {
        &self.container
    }

    /// The direction each sortable column will use next.
    #[must_use]
    pub const fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// The reviewer's classification of a record.
    #[must_use]
    pub fn selection(&self, key: &RecordKey) -> Classification {
        self.selections.get(key).copied().unwrap_or_default()
    }

    fn refresh(&mut self) {
        tracing::trace!(strategy = ?self.strategy, "refreshing view");

        let selections = &self.selections;
        let prepare = |row: &mut BodyRow, record: &RequirementRecord| {
            if let Some(value) = selections.get(&record.key()) {
                row.selection.set(*value);
            }
        };
        match self.strategy {
            RenderStrategy::Rebuild => {
                rebuild_with(&mut self.container, self.dataset.current(), prepare);
            }
            RenderStrategy::Reconcile => {
                reconcile_with(&mut self.container, self.dataset.current(), prepare);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::dataset::tests::{record, two_records};

    fn texts(table: &ReviewTable) -> Vec<&str> {
        table.container().rows().iter().map(BodyRow::text).collect()
    }

    fn build(records: Vec<RequirementRecord>, strategy: RenderStrategy) -> ReviewTable {
        ReviewTable::new(records, strategy).unwrap()
    }

    const fn page(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test_case(RenderStrategy::Rebuild)]
    #[test_case(RenderStrategy::Reconcile)]
    fn header_click_sorts_and_toggles(strategy: RenderStrategy) {
        let mut table = build(two_records(), strategy);

        table
            .handle(TableEvent::HeaderActivated(Column::Confidence))
            .unwrap();
        assert_eq!(texts(&table), ["A", "B"]);

        table
            .handle(TableEvent::HeaderActivated(Column::Confidence))
            .unwrap();
        assert_eq!(texts(&table), ["B", "A"]);
    }

    #[test]
    fn text_header_is_inert() {
        let mut table = build(two_records(), RenderStrategy::Rebuild);
        let before = table.container().clone();

        table
            .handle(TableEvent::HeaderActivated(Column::Text))
            .unwrap();

        assert_eq!(table.container(), &before);
        assert_eq!(table.sort_state(), &SortState::default());
    }

    #[test_case(RenderStrategy::Rebuild, SortColumn::Confidence)]
    #[test_case(RenderStrategy::Reconcile, SortColumn::Confidence)]
    #[test_case(RenderStrategy::Rebuild, SortColumn::AiClassification)]
    #[test_case(RenderStrategy::Reconcile, SortColumn::AiClassification)]
    fn selection_survives_sorting(strategy: RenderStrategy, column: SortColumn) {
        let mut table = build(two_records(), strategy);
        table.select(0, Classification::Performance).unwrap();

        assert_eq!(table.sort_by(column), SortDirection::Ascending);
        assert_eq!(table.sort_by(column), SortDirection::Descending);

        let row = table.container().rows()[1].clone();
        assert_eq!(row.text(), "A");
        assert_eq!(row.selection.value(), Classification::Performance);
    }

    #[test_case(RenderStrategy::Rebuild)]
    #[test_case(RenderStrategy::Reconcile)]
    fn delete_click_removes_by_key(strategy: RenderStrategy) {
        let mut table = build(two_records(), strategy);
        table.sort_by(SortColumn::Confidence);
        table.sort_by(SortColumn::Confidence);

        // "A" is now rendered second.
        table.handle(TableEvent::DeleteActivated(1)).unwrap();

        assert_eq!(table.dataset().len(), 1);
        assert_eq!(table.dataset().current()[0].text, "B");
        assert_eq!(texts(&table), ["B"]);
    }

    #[test]
    fn removing_a_missing_record_changes_nothing() {
        let mut table = build(two_records(), RenderStrategy::Rebuild);
        let before = table.dataset().clone();

        assert!(table.remove("A", page(2)).is_none());

        assert_eq!(table.dataset(), &before);
    }

    #[test]
    fn removal_forgets_the_selection() {
        let mut table = build(two_records(), RenderStrategy::Rebuild);
        table.select(0, Classification::Legal).unwrap();
        let key = table.container().rows()[0].key().clone();

        table.remove("A", page(1));

        assert!(table.selection(&key).is_placeholder());
    }

    #[test]
    fn selection_is_keyed_by_page_as_well_as_text() {
        let mut table = build(
            vec![
                record("Same", 1, "Functional", 0.2),
                record("Same", 2, "Functional", 0.6),
            ],
            RenderStrategy::Rebuild,
        );
        table.select(1, Classification::Usability).unwrap();

        table.sort_by(SortColumn::Confidence);
        table.sort_by(SortColumn::Confidence);

        let rows = table.container().rows();
        assert_eq!(rows[0].key().page.get(), 2);
        assert_eq!(rows[0].selection.value(), Classification::Usability);
        assert!(rows[1].selection.value().is_placeholder());
    }

    #[test]
    fn events_on_missing_rows_fail() {
        let mut table = build(two_records(), RenderStrategy::Rebuild);

        assert_eq!(
            table.handle(TableEvent::DeleteActivated(5)),
            Err(NoSuchRow(5))
        );
        assert_eq!(
            table.handle(TableEvent::SelectionChanged {
                row: 2,
                value: Classification::Legal
            }),
            Err(NoSuchRow(2))
        );
    }

    #[test]
    fn ingest_resets_sort_and_selections() {
        let mut table = build(two_records(), RenderStrategy::Rebuild);
        table.select(0, Classification::Legal).unwrap();
        table.sort_by(SortColumn::AiClassification);

        table.ingest(two_records()).unwrap();

        assert_eq!(table.sort_state(), &SortState::default());
        assert!(
            table
                .container()
                .rows()
                .iter()
                .all(|row| row.selection.value().is_placeholder())
        );
    }

    #[test]
    fn extract_reflects_selections_in_view_order() {
        let mut table = build(two_records(), RenderStrategy::Reconcile);
        table
            .handle(TableEvent::SelectionChanged {
                row: 1,
                value: Classification::OutOfScope,
            })
            .unwrap();
        table.sort_by(SortColumn::Confidence);
        table.sort_by(SortColumn::Confidence);

        let exported = table.extract("spec.pdf").unwrap();

        assert_eq!(exported[0].text, "B");
        assert_eq!(exported[0].classification_user, Classification::OutOfScope);
        assert!(exported[1].classification_user.is_placeholder());
    }

    #[test]
    fn choosing_the_placeholder_clears_the_selection() {
        let mut table = build(two_records(), RenderStrategy::Rebuild);
        table.select(0, Classification::Legal).unwrap();
        table.select(0, Classification::PLACEHOLDER).unwrap();
        let key = table.container().rows()[0].key().clone();

        assert!(table.selection(&key).is_placeholder());
    }

    #[test_case(RenderStrategy::Rebuild)]
    #[test_case(RenderStrategy::Reconcile)]
    fn records_sharing_an_identity_are_rejected(strategy: RenderStrategy) {
        let duplicated = vec![
            record("A", 1, "Functional", 0.2),
            record("A", 1, "NF - Legal", 0.8),
        ];
        let key = RecordKey::new("A".to_string(), page(1));

        assert_eq!(
            ReviewTable::new(duplicated.clone(), strategy).unwrap_err(),
            DuplicateRecord(key.clone())
        );

        let mut table = build(two_records(), strategy);
        table.select(0, Classification::Legal).unwrap();
        let before = table.container().clone();

        assert_eq!(table.ingest(duplicated), Err(DuplicateRecord(key)));
        assert_eq!(table.dataset().current(), two_records().as_slice());
        assert_eq!(table.container(), &before);
    }
}
