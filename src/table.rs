//! The review table.
//!
//! The table renders the dataset into a [`Container`], keeps the reviewer's
//! selections alive across sorts and deletions, and turns the final state
//! into [`ExportRecord`]s for the save and CSV collaborators.

mod component;
pub use component::{DuplicateRecord, NoSuchRow, ReviewTable, TableEvent};

mod container;
pub use container::{BodyRow, Column, Container, DeleteControl, HeaderCell, SelectControl};

mod export;
pub use export::{ExportRecord, ExtractError, extract};

mod render;
pub use render::{ReconcileStats, RenderStrategy, format_confidence, reconcile, render};

/// Capture and restore of selections across a full re-render.
pub mod selection;

mod sort;
pub use sort::{SortColumn, SortDirection, SortState};
