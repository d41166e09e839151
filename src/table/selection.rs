//! Preservation of the reviewer's selections across a full re-render.
//!
//! Rebuilding the table discards every selection control. Before clearing,
//! the current choices are captured keyed by the text of each row, and
//! reapplied to the new rows afterwards.

use std::collections::HashMap;

use crate::{
    domain::Classification,
    table::{BodyRow, Container},
};

/// The selection values of a container, keyed by row text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot(HashMap<String, Classification>);

impl Snapshot {
    /// The captured value for the row with the given text.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Classification> {
        self.0.get(key).copied()
    }

    /// The number of captured keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reads every body row's text and current selection.
///
/// When several rows share a text the last one wins.
#[must_use]
pub fn capture(container: &Container) -> Snapshot {
    Snapshot(
        container
            .rows()
            .iter()
            .map(|row| (row.text().to_string(), row.selection.value()))
            .collect(),
    )
}

/// Applies the captured value for `key` to a freshly built row.
///
/// Rows with no captured value keep the placeholder.
pub fn restore(row: &mut BodyRow, key: &str, snapshot: &Snapshot) {
    if let Some(value) = snapshot.get(key) {
        row.selection.set(value);
    }
}
